pub mod db;
pub mod digest;
pub mod entities;
pub mod error;
pub mod fingerprints;
pub mod monitor;
pub mod news;
pub mod publish;
pub mod stories;
pub mod tags;

pub use error::{Result, StoreError};
