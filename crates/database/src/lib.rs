pub mod db;
pub mod entities;
pub mod error;
pub mod repository;
pub mod services;

pub use error::{ConfigError, CoreError};
