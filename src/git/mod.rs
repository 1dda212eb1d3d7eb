pub mod clone;
pub mod log_parser;
