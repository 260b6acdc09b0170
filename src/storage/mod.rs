//! Storage module
//!
//! Owns the on-disk config file the save endpoint overwrites.

mod config_file;

pub use config_file::ConfigStore;
