//! Concrete adapter implementations for ports.

pub mod csv_gateway;
pub mod file_config_adapter;
pub mod yahoo_gateway;
