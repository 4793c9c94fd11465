pub mod common;
pub mod generation;
pub mod options;
pub mod state;

pub use generation::*;
pub use options::*;
pub use state::*;
