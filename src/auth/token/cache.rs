//! Single-slot token cache with a refresh guard for single-flight logins.

// self
use crate::{
	_prelude::*,
	auth::token::{credential::CachedCredential, secret::Secret},
};

/// Holds at most one [`CachedCredential`] and serializes refreshes.
///
/// Reads go through a `parking_lot` lock and never wait on network I/O. Refreshing callers
/// take [`TokenCache::refresh_guard`] first and re-check validity once they hold it, so a
/// burst of expirations produces one login.
#[derive(Default)]
pub struct TokenCache {
	current: RwLock<Option<CachedCredential>>,
	refresh_guard: AsyncMutex<()>,
}
impl TokenCache {
	/// Returns a copy of the cached credential, if any.
	pub fn snapshot(&self) -> Option<CachedCredential> {
		self.current.read().clone()
	}

	/// Returns the cached token when it is still valid at `now` under `safety_buffer`.
	pub fn valid_token_at(&self, now: OffsetDateTime, safety_buffer: Duration) -> Option<Secret> {
		self.current
			.read()
			.as_ref()
			.filter(|credential| credential.is_valid_at(now, safety_buffer))
			.map(|credential| credential.token.clone())
	}

	/// Replaces the cached credential wholesale.
	pub fn replace(&self, credential: CachedCredential) {
		*self.current.write() = Some(credential);
	}

	/// Drops the cached credential, forcing the next caller to log in.
	pub fn clear(&self) -> Option<CachedCredential> {
		self.current.write().take()
	}

	pub(crate) fn refresh_guard(&self) -> &AsyncMutex<()> {
		&self.refresh_guard
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache").field("current", &*self.current.read()).finish()
	}
}
