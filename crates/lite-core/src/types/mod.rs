pub mod commit;
pub mod validator;
pub mod vote;

pub use commit::*;
pub use validator::*;
pub use vote::*;
