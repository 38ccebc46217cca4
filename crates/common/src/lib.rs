//! Common types shared by the cell-clip crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
