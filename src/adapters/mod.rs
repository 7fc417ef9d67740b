//! Concrete adapter implementations for ports.

#[cfg(feature = "http")]
pub mod finviz_adapter;
#[cfg(feature = "http")]
pub mod yahoo_adapter;
pub mod csv_adapter;
pub mod ticker_file_adapter;
pub mod file_config_adapter;
pub mod csv_export;
pub mod xlsx_export;
pub mod output_files;
