//! High-level flows powered by the gateway: login, secured posts, and client code allocation.

pub mod common;
pub mod login;
pub mod registration;
pub mod secure_post;
pub mod ucc;

pub use login::*;
pub use registration::*;
pub use secure_post::*;
pub use ucc::*;

// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, TokenCache},
	config::GatewaySettings,
	crypto::PlatformCipher,
	http::GatewayHttpClient,
	store::SequenceStore,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestHttpClient>;

/// Coordinates every call to the platform for one member/organization identity.
///
/// The gateway owns the HTTP client, validated settings, loaded key material, the token
/// cache, and the client code allocator, so flows can focus on request shaping. Build it once
/// at startup and share it behind an `Arc`; cloning is cheap and clones share the cache.
pub struct Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// HTTP client used for every outbound platform request.
	pub http_client: Arc<C>,
	/// Validated settings (base URL, identity, timeouts).
	pub settings: Arc<GatewaySettings>,
	/// Key material for sealing and opening payloads.
	pub cipher: Arc<PlatformCipher>,
	/// Client code allocator backed by the sequence store.
	pub allocator: UccAllocator,
	/// Shared counters for login outcomes.
	pub login_metrics: Arc<LoginMetrics>,
	token_cache: Arc<TokenCache>,
}
impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_http_client(
		settings: GatewaySettings,
		cipher: PlatformCipher,
		sequences: Arc<dyn SequenceStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let allocator = UccAllocator::new(settings.ucc_issuer.clone(), sequences);

		Self {
			http_client: http_client.into(),
			settings: Arc::new(settings),
			cipher: Arc::new(cipher),
			allocator,
			login_metrics: Default::default(),
			token_cache: Default::default(),
		}
	}

	/// Token cache shared by every clone of this gateway.
	pub fn token_cache(&self) -> &TokenCache {
		&self.token_cache
	}

	/// Snapshot of the cached credential, if a login has succeeded.
	pub fn cached_credential(&self) -> Option<CachedCredential> {
		self.token_cache.snapshot()
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a gateway with its own reqwest-backed transport.
	pub fn new(
		settings: GatewaySettings,
		cipher: PlatformCipher,
		sequences: Arc<dyn SequenceStore>,
	) -> Self {
		Self::with_http_client(settings, cipher, sequences, ReqwestHttpClient::default())
	}

	/// Loads key material from the paths in `settings` and builds a reqwest-backed gateway.
	///
	/// Missing or unreadable keys fail here, before any request is served.
	pub fn from_settings(
		settings: GatewaySettings,
		sequences: Arc<dyn SequenceStore>,
	) -> Result<Self, ConfigError> {
		let cipher = PlatformCipher::load(&settings.keys, settings.oaep_digest)?;

		Ok(Self::new(settings, cipher, sequences))
	}
}
impl<C> Clone for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			settings: self.settings.clone(),
			cipher: self.cipher.clone(),
			allocator: self.allocator.clone(),
			login_metrics: self.login_metrics.clone(),
			token_cache: self.token_cache.clone(),
		}
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("environment", &self.settings.environment)
			.field("base_url", &self.settings.base_url.as_str())
			.field("member_code", &self.settings.member_code)
			.field("cipher", &self.cipher)
			.field("token_cached", &self.token_cache.snapshot().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		crypto::OaepDigest,
		error::TransportError,
		http::{HttpFuture, HttpReply, JsonRequest},
		store::MemoryStore,
	};

	struct OfflineClient;
	impl GatewayHttpClient for OfflineClient {
		fn post_json(&self, _: JsonRequest) -> HttpFuture<'_, HttpReply> {
			Box::pin(async {
				Err(TransportError::network(std::io::Error::other("offline test transport")))
			})
		}
	}

	fn offline_gateway() -> Gateway<OfflineClient> {
		Gateway::with_http_client(
			test_settings("https://bse.example.com/StarMF/"),
			gateway_cipher(OaepDigest::Sha1),
			Arc::new(MemoryStore::default()),
			OfflineClient,
		)
	}

	#[test]
	fn clones_share_the_token_cache() {
		let gateway = offline_gateway();
		let clone = gateway.clone();
		let now = OffsetDateTime::now_utc();

		assert!(gateway.cached_credential().is_none());

		clone.token_cache().replace(CachedCredential::new("shared", now, now + Duration::hours(1)));

		let cached = gateway.cached_credential().expect("Clone should write the shared cache.");

		assert_eq!(cached.token.expose(), "shared");
		assert_eq!(gateway.allocator.issuer().as_ref(), "PV");
	}

	#[test]
	fn debug_output_hides_credentials() {
		let rendered = format!("{:?}", offline_gateway());

		assert!(rendered.contains("bse.example.com"));
		assert!(!rendered.contains("member-pass"));
		assert!(!rendered.contains("fp-test"));
	}

	#[tokio::test]
	async fn transport_failure_leaves_cache_empty() {
		let gateway = offline_gateway();
		let err = gateway.access_token().await.expect_err("Offline transport must fail the login.");

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
		assert!(gateway.cached_credential().is_none());
		assert_eq!(gateway.login_metrics.failures(), 1);
	}
}
