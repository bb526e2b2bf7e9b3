//! Gateway-level error types shared across flows, transports, and stores.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or key material problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout, unexpected status).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Payload encryption or decryption failure.
	#[error(transparent)]
	Crypto(#[from] crate::crypto::CryptoError),
	/// Client code allocation failure.
	#[error(transparent)]
	Allocation(#[from] AllocationError),

	/// Platform rejected the credentials or returned a malformed login response.
	#[error("Platform login failed: {reason}.")]
	Authentication {
		/// Gateway-supplied reason string.
		reason: String,
		/// Raw login response body preview, kept for diagnostics.
		body: Option<String>,
	},
}
impl Error {
	pub(crate) fn authentication(reason: impl Into<String>, body: Option<String>) -> Self {
		Self::Authentication { reason: reason.into(), body }
	}
}

/// Configuration and key-loading failures raised before the gateway serves requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Layered configuration could not be extracted.
	#[error("Gateway configuration could not be loaded.")]
	Load {
		/// Underlying figment failure.
		#[source]
		source: Box<figment::Error>,
	},
	/// A required setting is absent or blank.
	#[error("Required setting `{field}` is missing.")]
	Missing {
		/// Setting name as it appears in configuration files.
		field: &'static str,
	},
	/// A setting holds a value outside its accepted range.
	#[error("Setting `{field}` is invalid: {reason}.")]
	Invalid {
		/// Setting name as it appears in configuration files.
		field: &'static str,
		/// Human-readable reason.
		reason: String,
	},
	/// A URL setting cannot be parsed.
	#[error("Setting `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Setting name as it appears in configuration files.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Production endpoints must use HTTPS.
	#[error("The {field} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Setting name that failed validation.
		field: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry path segments.
	#[error("Base URL cannot be used to build endpoint paths: {url}.")]
	UnjoinableBaseUrl {
		/// Offending base URL.
		url: String,
	},
	/// A key file could not be read.
	#[error("Key file {} could not be read.", path.display())]
	KeyFile {
		/// Path of the key file.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// A key file does not contain a usable RSA key.
	#[error("Key file {} does not hold a valid RSA key: {reason}.", path.display())]
	KeyParse {
		/// Path of the key file.
		path: PathBuf,
		/// Parser diagnostics.
		reason: String,
	},
	/// Own public key does not belong to the own private key.
	#[error("Public key {} does not match the configured private key.", path.display())]
	KeyMismatch {
		/// Path of the mismatching public key.
		path: PathBuf,
	},
}
impl From<figment::Error> for ConfigError {
	fn from(e: figment::Error) -> Self {
		Self::Load { source: Box::new(e) }
	}
}

/// Transport-level failures (network, timeout, status, body).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Platform call timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Platform answered with a non-success HTTP status.
	#[error("Platform returned HTTP {status}: {body_preview}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Leading part of the response body.
		body_preview: String,
	},
	/// Request body could not be encoded.
	#[error("Request body could not be encoded as JSON.")]
	Encode(#[source] serde_json::Error),
	/// Response body is not valid JSON.
	#[error("Platform returned a body that is not valid JSON (HTTP {status}).")]
	InvalidBody {
		/// HTTP status code.
		status: u16,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the platform.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Returns `true` when the failure was caused by the request timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Client code allocation failures. Callers must abort registration on any of these.
#[derive(Debug, ThisError)]
pub enum AllocationError {
	/// Identifier cannot yield a partition prefix.
	#[error("Identifier cannot be used for client code allocation.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Sequence store could not perform the atomic increment.
	#[error("Sequence store failed to increment the counter.")]
	Store(#[from] crate::store::StoreError),
}
