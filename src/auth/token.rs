//! Bearer token models: redacted secrets, credential lifecycle, expiry claims, and the cache.

pub mod cache;
pub mod claims;
pub mod credential;
pub mod secret;
