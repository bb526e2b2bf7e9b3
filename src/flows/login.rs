//! Platform login with a cached bearer token and single-flight refresh.
//!
//! [`Gateway::access_token`] serves the cached token while it is still valid under the
//! safety buffer. Once it is missing or near expiry, the first caller takes the cache's
//! refresh guard and logs in; callers queued behind it re-check the cache after acquiring the
//! guard and reuse the fresh token instead of logging in again.

mod metrics;

pub use metrics::LoginMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, Secret},
	error::TransportError,
	flows::{Gateway, common, secure_post::Envelope},
	http::{GatewayHttpClient, HttpReply, JsonRequest},
	obs::{self, FlowKind},
};

const LOGIN_PATH: &str = "/api/login";
const SUCCESS_STATUS: &str = "success";

#[derive(Serialize)]
struct LoginRequest<'a> {
	username: &'a str,
	password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	data: Option<LoginData>,
}

#[derive(Deserialize)]
struct LoginData {
	#[serde(default)]
	access_token: Option<String>,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Returns a bearer token, logging in only when the cached one is missing or near expiry.
	pub async fn access_token(&self) -> Result<Secret> {
		if let Some(token) = self.cached_token() {
			return Ok(token);
		}

		let _singleflight = self.token_cache.refresh_guard().lock().await;

		// Another caller may have finished a login while this one waited.
		if let Some(token) = self.cached_token() {
			return Ok(token);
		}

		self.login_locked().await
	}

	/// Logs in unconditionally and replaces the cached token on success.
	///
	/// A failed login leaves the previous cache entry untouched.
	pub async fn login(&self) -> Result<Secret> {
		let _singleflight = self.token_cache.refresh_guard().lock().await;

		self.login_locked().await
	}

	fn cached_token(&self) -> Option<Secret> {
		let token = self
			.token_cache
			.valid_token_at(OffsetDateTime::now_utc(), self.settings.token_safety_buffer)?;

		self.login_metrics.record_cache_hit();

		Some(token)
	}

	async fn login_locked(&self) -> Result<Secret> {
		self.login_metrics.record_attempt();

		let result = obs::observe(FlowKind::Login, "login", self.exchange_credentials()).await;

		match &result {
			Ok(_) => self.login_metrics.record_success(),
			Err(_) => self.login_metrics.record_failure(),
		}

		result
	}

	async fn exchange_credentials(&self) -> Result<Secret> {
		let settings = &self.settings;
		let url = common::endpoint(&settings.base_url, LOGIN_PATH)?;
		let credentials =
			LoginRequest { username: &settings.username, password: settings.password.expose() };
		let body =
			serde_json::to_vec(&Envelope { data: &credentials }).map_err(TransportError::Encode)?;
		let request = JsonRequest::new(url, body, settings.request_timeout);
		let reply = self.http_client.post_json(request).await?;
		let token = parse_login_reply(&reply)?;
		let issued_at = OffsetDateTime::now_utc();
		let credential =
			CachedCredential::from_login(token, issued_at, settings.token_fallback_ttl);
		let token = credential.token.clone();

		self.token_cache.replace(credential);

		Ok(token)
	}
}

fn parse_login_reply(reply: &HttpReply) -> Result<String> {
	if matches!(reply.status, 401 | 403) {
		return Err(Error::authentication(
			format!("credentials rejected with HTTP {}", reply.status),
			Some(raw_body(reply)),
		));
	}

	common::ensure_success(reply)?;

	let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);
	let response: LoginResponse =
		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
			Error::authentication(
				format!("malformed login response at `{}`: {}", e.path(), e.inner()),
				Some(raw_body(reply)),
			)
		})?;

	match response.status.as_deref() {
		Some(SUCCESS_STATUS) => {},
		Some(status) => {
			return Err(Error::authentication(
				format!("platform reported status `{status}`"),
				Some(raw_body(reply)),
			));
		},
		None => {
			return Err(Error::authentication(
				"login response carries no status",
				Some(raw_body(reply)),
			));
		},
	}

	response
		.data
		.and_then(|data| data.access_token)
		.filter(|token| !token.trim().is_empty())
		.ok_or_else(|| {
			Error::authentication("login response carries no access_token", Some(raw_body(reply)))
		})
}

fn raw_body(reply: &HttpReply) -> String {
	String::from_utf8_lossy(&reply.body).into_owned()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn reply(status: u16, body: &str) -> HttpReply {
		HttpReply { status, retry_after: None, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn success_reply_yields_token() {
		let token = parse_login_reply(&reply(
			200,
			r#"{"status":"success","data":{"access_token":"abc.def.ghi"}}"#,
		))
		.expect("Successful login reply should parse.");

		assert_eq!(token, "abc.def.ghi");
	}

	#[test]
	fn failure_status_keeps_raw_body() {
		let body = r#"{"status":"failed","message":"Invalid password"}"#;

		match parse_login_reply(&reply(200, body)) {
			Err(Error::Authentication { reason, body: Some(raw) }) => {
				assert!(reason.contains("failed"));
				assert_eq!(raw, body);
			},
			other => panic!("Unexpected result: {other:?}"),
		}
	}

	#[test]
	fn blank_or_missing_token_is_rejected() {
		for body in [
			r#"{"status":"success","data":{}}"#,
			r#"{"status":"success","data":{"access_token":"  "}}"#,
			r#"{"status":"success"}"#,
		] {
			assert!(
				matches!(parse_login_reply(&reply(200, body)), Err(Error::Authentication { .. })),
				"Body should be rejected: {body}"
			);
		}
	}

	#[test]
	fn malformed_reply_reports_parse_path() {
		let body = r#"{"status":"success","data":{"access_token":7}}"#;
		let err =
			parse_login_reply(&reply(200, body)).expect_err("Numeric token must be rejected.");

		match err {
			Error::Authentication { reason, .. } => assert!(reason.contains("data.access_token")),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn rejected_credentials_and_server_errors_are_distinguished() {
		assert!(matches!(
			parse_login_reply(&reply(401, "unauthorized")),
			Err(Error::Authentication { .. })
		));
		assert!(matches!(
			parse_login_reply(&reply(502, "bad gateway")),
			Err(Error::Transport(TransportError::Status { status: 502, .. }))
		));
	}
}
