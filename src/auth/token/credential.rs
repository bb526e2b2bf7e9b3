//! Cached login credential and its validity rules.

// self
use crate::{
	_prelude::*,
	auth::token::{claims, secret::Secret},
};

/// Lifecycle status for a cached credential under a safety buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// Token outlives the safety buffer and may be reused.
	Fresh,
	/// Token is still technically valid but inside the safety buffer.
	Expiring,
	/// Token exceeded its expiry instant.
	Expired,
}

/// Bearer token returned by the platform login, plus its expiry bookkeeping.
///
/// Instances are replaced wholesale on every successful login and never mutated in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCredential {
	/// Bearer token; callers must avoid logging it.
	pub token: Secret,
	/// Instant the login succeeded.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
}
impl CachedCredential {
	/// Creates a credential with an explicit expiry.
	pub fn new(
		token: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_at: OffsetDateTime,
	) -> Self {
		Self { token: Secret::new(token), issued_at, expires_at }
	}

	/// Creates a credential from a freshly issued token.
	///
	/// Expiry comes from the token's `exp` claim when one can be decoded; otherwise the
	/// credential lives for `fallback_ttl` from `issued_at`. A lifetime past the representable
	/// range yields a credential that is already stale.
	pub fn from_login(
		token: impl Into<String>,
		issued_at: OffsetDateTime,
		fallback_ttl: Duration,
	) -> Self {
		let token = token.into();
		let expires_at = claims::try_parse_expiry(&token)
			.unwrap_or_else(|| issued_at.checked_add(fallback_ttl).unwrap_or(issued_at));

		Self { token: Secret::new(token), issued_at, expires_at }
	}

	/// Computes the lifecycle status at `now` using `safety_buffer` as the early-refresh window.
	pub fn status_at(&self, now: OffsetDateTime, safety_buffer: Duration) -> CredentialStatus {
		if now >= self.expires_at {
			return CredentialStatus::Expired;
		}

		match self.expires_at.checked_sub(safety_buffer) {
			Some(refresh_at) if now < refresh_at => CredentialStatus::Fresh,
			_ => CredentialStatus::Expiring,
		}
	}

	/// Returns `true` iff `now < expires_at - safety_buffer`.
	pub fn is_valid_at(&self, now: OffsetDateTime, safety_buffer: Duration) -> bool {
		matches!(self.status_at(now, safety_buffer), CredentialStatus::Fresh)
	}

	/// Remaining lifetime at `now`, clamped at zero.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - now;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for CachedCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedCredential")
			.field("token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
