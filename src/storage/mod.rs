//! Storage module for database, configuration, and change notification.

pub mod config;
pub mod database;
pub mod events;
pub mod schema;

pub use config::{load_config, save_config, AppConfig, ConfigError};
pub use database::{Database, DatabaseError};
pub use events::{ChangeBus, ChangeEvent, Operation, Table};
