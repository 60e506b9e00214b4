pub mod certifier;
pub mod dynamic;
pub mod quorum;
pub mod trust_root;

pub use certifier::*;
pub use dynamic::*;
pub use quorum::*;
pub use trust_root::*;
