//! Shared utilities

pub mod logger;
pub mod time;

pub use logger::init_logger;
pub use time::parse_date;
