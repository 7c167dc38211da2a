pub mod issue;
pub mod task;

pub use issue::*;
pub use task::*;
