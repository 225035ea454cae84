//! Adapter implementations of the port traits.

pub mod chart_svg;
pub mod csv_export;
pub mod file_config_adapter;
pub mod retry;
pub mod tcbs_adapter;
pub mod text_report;
