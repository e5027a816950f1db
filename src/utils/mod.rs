// Utility module for common functionality

mod config;
mod error;
mod logging;
mod validation;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use validation::*;
