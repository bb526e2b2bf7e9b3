//! Layered gateway configuration.
//!
//! [`GatewayConfig`] is the raw, serde-facing shape loaded through Figment: an optional TOML
//! file first, then `BSE_*` environment variables (e.g. `BSE_ORG_CODE`, `BSE_PASSWORD`).
//! [`GatewayConfig::settings`] validates it into [`GatewaySettings`], which is what the
//! gateway consumes.

// std
use std::{path::PathBuf, time::Duration as StdDuration};
// crates.io
use figment::{
	Figment, Provider,
	providers::{Env, Format, Toml},
};
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{MemberCode, OrgCode, Secret, UccIssuer},
	crypto::{KeyPaths, OaepDigest},
	error::ConfigError,
};

/// Prefix applied to every environment variable read by [`GatewayConfig::from_env`].
pub const ENV_PREFIX: &str = "BSE_";

/// Platform environment selected by the `env` setting.
///
/// Only the exact value `production` (case-insensitive) selects production; anything else
/// resolves to the sandbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
	#[default]
	/// Sandbox / UAT endpoints.
	Sandbox,
	/// Production endpoints.
	Production,
}
impl Environment {
	/// Returns a stable label suitable for config files and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Environment::Sandbox => "sandbox",
			Environment::Production => "production",
		}
	}
}
impl From<String> for Environment {
	fn from(value: String) -> Self {
		if value.trim().eq_ignore_ascii_case("production") {
			Environment::Production
		} else {
			Environment::Sandbox
		}
	}
}
impl From<Environment> for String {
	fn from(value: Environment) -> Self {
		value.as_str().to_owned()
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Raw configuration as read from files and the environment.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
	/// Platform environment.
	pub env: Environment,
	/// Member code assigned by the platform.
	#[serde(deserialize_with = "lenient_string")]
	pub member_code: Option<String>,
	/// Organization code sent in the identity header.
	#[serde(deserialize_with = "lenient_string")]
	pub org_code: Option<String>,
	/// Organization fingerprint sent in the identity header.
	#[serde(deserialize_with = "lenient_string")]
	pub org_fingerprint: Option<Secret>,
	/// Base URL used when `env` is production.
	#[serde(deserialize_with = "lenient_string")]
	pub production_url: Option<String>,
	/// Base URL used for every other `env` value.
	#[serde(deserialize_with = "lenient_string")]
	pub sandbox_url: Option<String>,
	/// Login username.
	#[serde(deserialize_with = "lenient_string")]
	pub username: Option<String>,
	/// Login password.
	#[serde(deserialize_with = "lenient_string")]
	pub password: Option<Secret>,
	/// PEM path of the member's own private key.
	pub rsa_private_key_path: Option<PathBuf>,
	/// PEM path of the member's own public key.
	pub rsa_public_key_path: Option<PathBuf>,
	/// PEM path of the platform's public key.
	pub bse_public_key_path: Option<PathBuf>,
	/// Seconds before expiry at which a cached token is treated as stale.
	pub token_safety_buffer_sec: u64,
	/// Token lifetime assumed when the token carries no readable expiry claim.
	pub token_fallback_ttl_sec: u64,
	/// Timeout applied to every outbound platform call.
	pub request_timeout_sec: u64,
	/// Issuer segment of allocated client codes.
	pub ucc_issuer: String,
	/// OAEP digest used for payload encryption.
	pub oaep_digest: OaepDigest,
}
impl GatewayConfig {
	const DEFAULT_SAFETY_BUFFER_SEC: u64 = 60;
	const DEFAULT_FALLBACK_TTL_SEC: u64 = 600;
	const DEFAULT_TIMEOUT_SEC: u64 = 20;
	const DEFAULT_ISSUER: &'static str = "PV";
	const MAX_TOKEN_WINDOW_SEC: u64 = 86_400;

	/// Loads configuration from `BSE_*` environment variables only.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_provider(Env::prefixed(ENV_PREFIX))
	}

	/// Loads configuration from a TOML file, with `BSE_*` environment variables on top.
	pub fn from_file_and_env(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
		Self::from_provider(Figment::new().merge(Toml::file(path)).merge(Env::prefixed(ENV_PREFIX)))
	}

	/// Extracts configuration from any Figment provider.
	pub fn from_provider(provider: impl Provider) -> Result<Self, ConfigError> {
		Ok(Figment::from(provider).extract()?)
	}

	/// Validates the raw values and resolves the base URL for the selected environment.
	pub fn settings(&self) -> Result<GatewaySettings, ConfigError> {
		let member_code = identifier("member_code", &self.member_code, |v| MemberCode::new(v))?;
		let org_code = identifier("org_code", &self.org_code, |v| OrgCode::new(v))?;
		let org_fingerprint = required_secret("org_fingerprint", &self.org_fingerprint)?;
		let username = required("username", &self.username)?.to_owned();
		let password = required_secret("password", &self.password)?;
		let base_url = self.resolve_base_url()?;
		let keys = KeyPaths {
			rsa_private_key: required_path("rsa_private_key_path", &self.rsa_private_key_path)?,
			rsa_public_key: required_path("rsa_public_key_path", &self.rsa_public_key_path)?,
			bse_public_key: required_path("bse_public_key_path", &self.bse_public_key_path)?,
		};
		let ucc_issuer = UccIssuer::new(&self.ucc_issuer).map_err(|e| ConfigError::Invalid {
			field: "ucc_issuer",
			reason: e.to_string(),
		})?;

		if self.request_timeout_sec == 0 {
			return Err(ConfigError::Invalid {
				field: "request_timeout_sec",
				reason: "timeout must be at least one second".into(),
			});
		}
		if self.token_fallback_ttl_sec == 0 {
			return Err(ConfigError::Invalid {
				field: "token_fallback_ttl_sec",
				reason: "fallback lifetime must be at least one second".into(),
			});
		}

		Ok(GatewaySettings {
			environment: self.env,
			base_url,
			member_code,
			org_code,
			org_fingerprint,
			username,
			password,
			keys,
			token_safety_buffer: seconds("token_safety_buffer_sec", self.token_safety_buffer_sec)?,
			token_fallback_ttl: seconds("token_fallback_ttl_sec", self.token_fallback_ttl_sec)?,
			request_timeout: StdDuration::from_secs(self.request_timeout_sec),
			ucc_issuer,
			oaep_digest: self.oaep_digest,
		})
	}

	fn resolve_base_url(&self) -> Result<Url, ConfigError> {
		let (field, raw) = match self.env {
			Environment::Production => ("production_url", &self.production_url),
			Environment::Sandbox => ("sandbox_url", &self.sandbox_url),
		};
		let url = Url::parse(required(field, raw)?)
			.map_err(|source| ConfigError::InvalidUrl { field, source })?;

		if url.cannot_be_a_base() {
			return Err(ConfigError::UnjoinableBaseUrl { url: url.to_string() });
		}
		if matches!(self.env, Environment::Production) && url.scheme() != "https" {
			return Err(ConfigError::InsecureEndpoint { field, url: url.to_string() });
		}

		Ok(url)
	}
}
impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			env: Environment::default(),
			member_code: None,
			org_code: None,
			org_fingerprint: None,
			production_url: None,
			sandbox_url: None,
			username: None,
			password: None,
			rsa_private_key_path: None,
			rsa_public_key_path: None,
			bse_public_key_path: None,
			token_safety_buffer_sec: Self::DEFAULT_SAFETY_BUFFER_SEC,
			token_fallback_ttl_sec: Self::DEFAULT_FALLBACK_TTL_SEC,
			request_timeout_sec: Self::DEFAULT_TIMEOUT_SEC,
			ucc_issuer: Self::DEFAULT_ISSUER.to_owned(),
			oaep_digest: OaepDigest::default(),
		}
	}
}
impl Debug for GatewayConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GatewayConfig")
			.field("env", &self.env)
			.field("member_code", &self.member_code)
			.field("org_code", &self.org_code)
			.field("org_fingerprint_set", &self.org_fingerprint.is_some())
			.field("production_url", &self.production_url)
			.field("sandbox_url", &self.sandbox_url)
			.field("username", &self.username)
			.field("password_set", &self.password.is_some())
			.field("token_safety_buffer_sec", &self.token_safety_buffer_sec)
			.field("request_timeout_sec", &self.request_timeout_sec)
			.finish_non_exhaustive()
	}
}

/// Validated settings consumed by the gateway.
#[derive(Clone)]
pub struct GatewaySettings {
	/// Platform environment the base URL was resolved for.
	pub environment: Environment,
	/// Base URL every endpoint path is appended to.
	pub base_url: Url,
	/// Member code assigned by the platform.
	pub member_code: MemberCode,
	/// Organization code sent in the identity header.
	pub org_code: OrgCode,
	/// Organization fingerprint sent in the identity header.
	pub org_fingerprint: Secret,
	/// Login username.
	pub username: String,
	/// Login password.
	pub password: Secret,
	/// PEM key locations.
	pub keys: KeyPaths,
	/// Early-refresh window for cached tokens.
	pub token_safety_buffer: Duration,
	/// Token lifetime assumed when no expiry claim can be read.
	pub token_fallback_ttl: Duration,
	/// Timeout applied to every outbound platform call.
	pub request_timeout: StdDuration,
	/// Issuer segment of allocated client codes.
	pub ucc_issuer: UccIssuer,
	/// OAEP digest used for payload encryption.
	pub oaep_digest: OaepDigest,
}
impl GatewaySettings {
	/// Value of the organization identity header: `"{org_code}:{org_fingerprint}"`.
	pub fn org_header_value(&self) -> String {
		format!("{}:{}", self.org_code, self.org_fingerprint.expose())
	}
}
impl Debug for GatewaySettings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GatewaySettings")
			.field("environment", &self.environment)
			.field("base_url", &self.base_url.as_str())
			.field("member_code", &self.member_code)
			.field("org_code", &self.org_code)
			.field("org_fingerprint", &self.org_fingerprint)
			.field("username", &self.username)
			.field("password", &self.password)
			.field("keys", &self.keys)
			.field("token_safety_buffer", &self.token_safety_buffer)
			.field("token_fallback_ttl", &self.token_fallback_ttl)
			.field("request_timeout", &self.request_timeout)
			.field("ucc_issuer", &self.ucc_issuer)
			.field("oaep_digest", &self.oaep_digest)
			.finish()
	}
}

/// Accepts strings and bare numbers, since env values such as member codes parse as integers.
fn lenient_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: From<String>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Scalar {
		Text(String),
		Unsigned(u64),
		Signed(i64),
		Float(f64),
	}

	let value = <Option<Scalar>>::deserialize(deserializer)?;

	Ok(value.map(|scalar| {
		let text = match scalar {
			Scalar::Text(text) => text,
			Scalar::Unsigned(n) => n.to_string(),
			Scalar::Signed(n) => n.to_string(),
			Scalar::Float(n) => n.to_string(),
		};

		T::from(text)
	}))
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, ConfigError> {
	value
		.as_deref()
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.ok_or(ConfigError::Missing { field })
}

fn required_secret(field: &'static str, value: &Option<Secret>) -> Result<Secret, ConfigError> {
	value
		.as_ref()
		.filter(|secret| !secret.is_blank())
		.cloned()
		.ok_or(ConfigError::Missing { field })
}

fn required_path(field: &'static str, value: &Option<PathBuf>) -> Result<PathBuf, ConfigError> {
	value
		.as_ref()
		.filter(|path| !path.as_os_str().is_empty())
		.cloned()
		.ok_or(ConfigError::Missing { field })
}

fn identifier<T, E>(
	field: &'static str,
	value: &Option<String>,
	parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<T, ConfigError>
where
	E: Display,
{
	parse(required(field, value)?)
		.map_err(|e| ConfigError::Invalid { field, reason: e.to_string() })
}

fn seconds(field: &'static str, secs: u64) -> Result<Duration, ConfigError> {
	if secs > GatewayConfig::MAX_TOKEN_WINDOW_SEC {
		return Err(ConfigError::Invalid {
			field,
			reason: format!("must not exceed {} seconds", GatewayConfig::MAX_TOKEN_WINDOW_SEC),
		});
	}

	i64::try_from(secs)
		.map(Duration::seconds)
		.map_err(|_| ConfigError::Invalid { field, reason: "value is out of range".into() })
}
