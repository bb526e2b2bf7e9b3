//! Best-effort expiry extraction from JWT-shaped bearer tokens.

// crates.io
use base64::{
	Engine,
	alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Number, Value};
// self
use crate::_prelude::*;

const JWT_SEGMENT: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reads the `exp` claim (seconds since the epoch) from the token's payload segment.
///
/// Returns `None` for opaque tokens, undecodable segments, non-object payloads, missing or
/// non-numeric `exp` values, and timestamps outside the supported range. Callers decide the
/// fallback expiry.
pub fn try_parse_expiry(token: &str) -> Option<OffsetDateTime> {
	let mut segments = token.split('.');
	let payload = segments.nth(1)?;

	segments.next()?;

	let bytes = JWT_SEGMENT.decode(payload).ok()?;
	let claims = serde_json::from_slice::<Value>(&bytes).ok()?;

	match claims.get("exp")? {
		Value::Number(exp) => from_epoch_seconds(exp),
		_ => None,
	}
}

fn from_epoch_seconds(exp: &Number) -> Option<OffsetDateTime> {
	if let Some(secs) = exp.as_i64() {
		return OffsetDateTime::from_unix_timestamp(secs).ok();
	}

	let secs = exp.as_f64().filter(|secs| secs.is_finite())?;
	let nanos = (secs * 1_000_000_000_f64) as i128;

	OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}
