//! Request handlers.

pub mod gesture;
pub mod health;

pub use gesture::*;
pub use health::*;
