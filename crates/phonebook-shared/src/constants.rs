//! Application-wide constants

pub const MAX_PHOTO_SIZE_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_IDENTITY_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_IDENTITY_RETRIES: u32 = 2;
pub const SERVICES_SCHEMA: &str = "public";
