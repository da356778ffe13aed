pub mod error;
pub mod index;
pub mod models;
pub mod storage;
pub mod tree;

pub use error::{Error, Result};
