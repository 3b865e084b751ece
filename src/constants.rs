use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Room left for multipart boundaries and headers around an uploaded file.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;
