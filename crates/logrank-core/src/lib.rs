pub mod analysis;
pub mod config;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod report;
pub mod source;

pub use error::{Error, Result};
