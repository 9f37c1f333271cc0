//! Core domain types and logic.

pub mod price;
pub mod window;
pub mod catalog;
pub mod resolver;
pub mod raw_table;
pub mod normalizer;
pub mod composer;
pub mod stats;
pub mod settings;
pub mod config_validation;
pub mod error;
