//! Registers a client against a local mock of the platform: the gateway allocates the next
//! client code for the PAN, seals the profile for the platform key, and submits it.
//!
//! Any `BSE_*` environment variable overrides the mock defaults, so the same program can be
//! pointed at a real sandbox.

// std
use std::{path::PathBuf, sync::Arc};
// crates.io
use color_eyre::Result;
use figment::{
	Figment,
	providers::{Env, Serialized},
};
use httpmock::prelude::*;
use serde_json::json;
use time::macros;
// self
use starmf_gateway::{
	config::{ENV_PREFIX, GatewayConfig},
	crypto::PlatformCipher,
	flows::{ClientProfile, Gateway, ORG_HEADER},
	http::ReqwestHttpClient,
	reqwest::Client,
	store::MemoryStore,
};

fn fixture(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let register_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/add_ucc").header(ORG_HEADER, "DEMO:demo-fingerprint");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "status": "success", "message": "UCC created" }));
		})
		.await;
	let defaults = json!({
		"env": "sandbox",
		"member_code": "10001",
		"org_code": "DEMO",
		"org_fingerprint": "demo-fingerprint",
		"sandbox_url": server.base_url(),
		"username": "demo-user",
		"password": "demo-pass",
		"rsa_private_key_path": fixture("member_private.pem"),
		"rsa_public_key_path": fixture("member_public.pem"),
		"bse_public_key_path": fixture("platform_public.pem"),
	});
	let config = GatewayConfig::from_provider(
		Figment::from(Serialized::defaults(defaults)).merge(Env::prefixed(ENV_PREFIX)),
	)?;
	let settings = config.settings()?;
	let cipher = PlatformCipher::load(&settings.keys, settings.oaep_digest)?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let gateway = <Gateway<ReqwestHttpClient>>::with_http_client(
		settings,
		cipher,
		Arc::new(MemoryStore::default()),
		http_client,
	);
	let profile = ClientProfile {
		pan: "ABCDE1234F".into(),
		name: "Asha Rao".into(),
		email: "asha@example.com".into(),
		mobile: "9800000000".into(),
		date_of_birth: Some(macros::date!(1990 - 03 - 07)),
	};
	let registration = gateway.register_client(&profile).await?;

	println!("Registered {} ({}).", registration.client_code, registration.response["message"]);

	register_mock.assert_async().await;

	Ok(())
}
