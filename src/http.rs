//! Transport primitives for platform calls.
//!
//! The module exposes [`GatewayHttpClient`] alongside [`JsonRequest`] and [`HttpReply`] so
//! downstream crates can plug in a custom HTTP stack (or a recording fake in tests) without
//! touching the login, secure-post, or registration flows. Implementations send exactly one
//! request per call (no retries) and honor the request's timeout as a hard deadline.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`GatewayHttpClient::post_json`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of posting JSON envelopes to the platform.
///
/// The trait is the gateway's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared by every flow behind an `Arc`.
pub trait GatewayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` as an HTTP POST and returns the raw reply.
	///
	/// Non-success statuses are returned as replies, not errors; the calling flow decides how
	/// to classify them. Timeouts must surface as [`TransportError::Timeout`].
	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, HttpReply>;
}

/// Outbound JSON POST.
#[derive(Clone, Debug)]
pub struct JsonRequest {
	/// Absolute endpoint URL.
	pub url: Url,
	/// Extra headers; `Content-Type: application/json` is always added by the transport.
	pub headers: Vec<(&'static str, String)>,
	/// Serialized JSON body.
	pub body: Vec<u8>,
	/// Hard deadline for the whole exchange.
	pub timeout: StdDuration,
}
impl JsonRequest {
	/// Creates a request without extra headers.
	pub fn new(url: Url, body: Vec<u8>, timeout: StdDuration) -> Self {
		Self { url, headers: Vec::new(), body, timeout }
	}

	/// Appends a header.
	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Looks up the first header with `name` (ASCII case-insensitive).
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw reply captured from the platform.
#[derive(Clone, Debug, Default)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayHttpClient for ReqwestHttpClient {
	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, HttpReply> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client
				.post(request.url)
				.timeout(request.timeout)
				.header(CONTENT_TYPE, "application/json");

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}

			let response = builder.body(request.body).send().await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok::<_, TransportError>(HttpReply { status, retry_after, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
