//! Form state module

mod debounce;
mod forms;

pub use debounce::*;
pub use forms::*;
