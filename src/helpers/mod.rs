//! Helper functions for dates, reading time and URLs

mod date;
mod reading_time;
mod url;

pub use date::*;
pub use reading_time::*;
pub use url::*;
