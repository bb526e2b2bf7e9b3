//! Shared helpers for flow implementations (endpoint joins, status checks, body previews).

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::HttpReply,
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Appends `path` to the base URL, keeping any path prefix the base already carries.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
	let mut url = base.clone();

	{
		let mut segments = url
			.path_segments_mut()
			.map_err(|_| ConfigError::UnjoinableBaseUrl { url: base.to_string() })?;

		segments.pop_if_empty();
		segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
	}

	Ok(url)
}

/// Lossy UTF-8 rendering of the leading part of a body, for errors and logs.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	match trimmed.char_indices().nth(BODY_PREVIEW_LIMIT) {
		Some((cut, _)) => format!("{}...", &trimmed[..cut]),
		None => trimmed.to_owned(),
	}
}

/// Converts a non-2xx reply into [`TransportError::Status`].
pub(crate) fn ensure_success(reply: &HttpReply) -> Result<(), TransportError> {
	if reply.is_success() {
		return Ok(());
	}

	Err(TransportError::Status {
		status: reply.status,
		retry_after: reply.retry_after,
		body_preview: body_preview(&reply.body),
	})
}

/// Parses a reply body as JSON, tagging failures with the HTTP status.
pub(crate) fn parse_json(reply: &HttpReply) -> Result<serde_json::Value, TransportError> {
	serde_json::from_slice(&reply.body)
		.map_err(|source| TransportError::InvalidBody { status: reply.status, source })
}
