//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	path::PathBuf,
	sync::{Arc, Mutex},
};
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use starmf_gateway::{
	config::{GatewayConfig, GatewaySettings},
	crypto::{KeyPaths, OaepDigest, PlatformCipher},
	error::TransportError,
	flows::{Gateway, ReqwestGateway},
	http::{GatewayHttpClient, HttpFuture, HttpReply, JsonRequest, ReqwestHttpClient},
	reqwest::Client,
	store::{MemoryStore, SequenceStore},
};

pub fn fixture_path(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Raw configuration for a sandbox member pointing at `base_url`.
pub fn config(base_url: &str) -> GatewayConfig {
	GatewayConfig {
		member_code: Some("10001".into()),
		org_code: Some("ORG1".into()),
		org_fingerprint: Some("fp-test".to_owned().into()),
		sandbox_url: Some(base_url.into()),
		username: Some("member-user".into()),
		password: Some("member-pass".to_owned().into()),
		rsa_private_key_path: Some(fixture_path("member_private.pem")),
		rsa_public_key_path: Some(fixture_path("member_public.pem")),
		bse_public_key_path: Some(fixture_path("platform_public.pem")),
		..Default::default()
	}
}

pub fn settings(base_url: &str) -> GatewaySettings {
	config(base_url).settings().expect("Test configuration should validate.")
}

pub fn reqwest_gateway(base_url: &str) -> ReqwestGateway {
	reqwest_gateway_with_store(base_url, Arc::new(MemoryStore::default()))
}

/// Reqwest transport that trusts the self-signed certificate served by `httpmock`.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn reqwest_gateway_with_store(
	base_url: &str,
	sequences: Arc<dyn SequenceStore>,
) -> ReqwestGateway {
	reqwest_gateway_from_settings(settings(base_url), sequences)
}

pub fn reqwest_gateway_from_settings(
	settings: GatewaySettings,
	sequences: Arc<dyn SequenceStore>,
) -> ReqwestGateway {
	let cipher = PlatformCipher::load(&settings.keys, settings.oaep_digest)
		.expect("Gateway should load fixture keys.");

	Gateway::with_http_client(settings, cipher, sequences, test_reqwest_http_client())
}

pub fn gateway_cipher() -> PlatformCipher {
	PlatformCipher::load(&settings("http://127.0.0.1/").keys, OaepDigest::Sha1)
		.expect("Gateway-side keys should load.")
}

/// Keys as the platform holds them: seals for the member, opens what the gateway sealed.
pub fn platform_side_cipher() -> PlatformCipher {
	let paths = KeyPaths {
		rsa_private_key: fixture_path("platform_private.pem"),
		rsa_public_key: fixture_path("platform_public.pem"),
		bse_public_key: fixture_path("member_public.pem"),
	};

	PlatformCipher::load(&paths, OaepDigest::Sha1).expect("Platform-side keys should load.")
}

/// Unsigned JWT whose payload carries `exp`.
pub fn jwt_with_exp(exp: i64) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"10001","exp":{exp}}}"#));

	format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Transport fake that records every request and answers from a script.
#[derive(Clone, Default)]
pub struct RecordingClient {
	requests: Arc<Mutex<Vec<JsonRequest>>>,
	replies: Arc<Mutex<VecDeque<HttpReply>>>,
}
impl RecordingClient {
	pub fn reply_json(self, status: u16, body: serde_json::Value) -> Self {
		self.replies.lock().expect("Reply script lock should not be poisoned.").push_back(
			HttpReply {
				status,
				retry_after: None,
				body: serde_json::to_vec(&body).expect("Reply fixture should serialize."),
			},
		);

		self
	}

	pub fn requests(&self) -> Vec<JsonRequest> {
		self.requests.lock().expect("Request log lock should not be poisoned.").clone()
	}
}
impl GatewayHttpClient for RecordingClient {
	fn post_json(&self, request: JsonRequest) -> HttpFuture<'_, HttpReply> {
		self.requests.lock().expect("Request log lock should not be poisoned.").push(request);

		let reply =
			self.replies.lock().expect("Reply script lock should not be poisoned.").pop_front();

		Box::pin(async move {
			reply.ok_or_else(|| {
				TransportError::network(std::io::Error::other("no scripted reply left"))
			})
		})
	}
}

pub fn recording_gateway(client: RecordingClient) -> Gateway<RecordingClient> {
	recording_gateway_with_store(client, Arc::new(MemoryStore::default()))
}

pub fn recording_gateway_with_store(
	client: RecordingClient,
	sequences: Arc<dyn SequenceStore>,
) -> Gateway<RecordingClient> {
	let settings = settings("https://bse.example.com/StarMF/");
	let cipher = PlatformCipher::load(&settings.keys, settings.oaep_digest)
		.expect("Fixture keys should load.");

	Gateway::with_http_client(settings, cipher, sequences, client)
}
