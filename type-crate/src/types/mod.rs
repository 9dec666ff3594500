pub mod address;
pub mod node;
pub mod pool;
pub mod validator;

pub use address::*;
pub use node::*;
pub use pool::*;
pub use validator::*;
