//! Async client for the BSE StAR MF platform: cached login tokens, RSA-OAEP sealed requests
//! carrying the organization identity header, and atomic unique client code allocation.
//!
//! Start from [`config::GatewayConfig`], validate it into [`config::GatewaySettings`], then
//! build a [`flows::Gateway`] with a [`store::SequenceStore`] of your choice.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and key fixtures for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::path::PathBuf;
	// crates.io
	use rsa::{
		RsaPrivateKey, RsaPublicKey,
		pkcs8::{DecodePrivateKey, DecodePublicKey},
	};
	// self
	use crate::{
		auth::{MemberCode, OrgCode, Secret, UccIssuer},
		config::{Environment, GatewaySettings},
		crypto::{KeyPaths, OaepDigest, PlatformCipher},
	};

	/// Member (own) private key, PKCS#8.
	pub const MEMBER_PRIVATE_PEM: &str = include_str!("../tests/fixtures/member_private.pem");
	/// Member (own) public key, SPKI.
	pub const MEMBER_PUBLIC_PEM: &str = include_str!("../tests/fixtures/member_public.pem");
	/// Platform private key, PKCS#8; lets tests play the platform side.
	pub const PLATFORM_PRIVATE_PEM: &str = include_str!("../tests/fixtures/platform_private.pem");
	/// Platform public key, SPKI.
	pub const PLATFORM_PUBLIC_PEM: &str = include_str!("../tests/fixtures/platform_public.pem");

	fn private_key(pem: &str) -> RsaPrivateKey {
		RsaPrivateKey::from_pkcs8_pem(pem).expect("Private key fixture should parse.")
	}

	fn public_key(pem: &str) -> RsaPublicKey {
		RsaPublicKey::from_public_key_pem(pem).expect("Public key fixture should parse.")
	}

	/// Path of a file under `tests/fixtures`.
	pub fn fixture_path(name: &str) -> PathBuf {
		PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
	}

	/// Fixture key locations laid out the way a deployment would configure them.
	pub fn fixture_key_paths() -> KeyPaths {
		KeyPaths {
			rsa_private_key: fixture_path("member_private.pem"),
			rsa_public_key: fixture_path("member_public.pem"),
			bse_public_key: fixture_path("platform_public.pem"),
		}
	}

	/// Cipher whose sealed payloads it can open itself (both halves are the member keypair).
	pub fn loopback_cipher(digest: OaepDigest) -> PlatformCipher {
		PlatformCipher::new(public_key(MEMBER_PUBLIC_PEM), private_key(MEMBER_PRIVATE_PEM), digest)
	}

	/// Cipher as the gateway holds it: seals for the platform, opens with the member key.
	pub fn gateway_cipher(digest: OaepDigest) -> PlatformCipher {
		let platform_public = public_key(PLATFORM_PUBLIC_PEM);

		PlatformCipher::new(platform_public, private_key(MEMBER_PRIVATE_PEM), digest)
	}

	/// Mirror of [`gateway_cipher`]: seals for the member, opens with the platform key.
	pub fn platform_side_cipher(digest: OaepDigest) -> PlatformCipher {
		let member_public = public_key(MEMBER_PUBLIC_PEM);

		PlatformCipher::new(member_public, private_key(PLATFORM_PRIVATE_PEM), digest)
	}

	/// Sandbox settings pointing at `base_url`, with fixture keys and default timings.
	pub fn test_settings(base_url: &str) -> GatewaySettings {
		GatewaySettings {
			environment: Environment::Sandbox,
			base_url: Url::parse(base_url).expect("Test base URL should parse."),
			member_code: MemberCode::new("10001").expect("Member code fixture should be valid."),
			org_code: OrgCode::new("ORG1").expect("Org code fixture should be valid."),
			org_fingerprint: Secret::new("fp-test"),
			username: "member-user".into(),
			password: Secret::new("member-pass"),
			keys: fixture_key_paths(),
			token_safety_buffer: Duration::seconds(60),
			token_fallback_ttl: Duration::minutes(10),
			request_timeout: std::time::Duration::from_secs(20),
			ucc_issuer: UccIssuer::new("PV").expect("Issuer fixture should be valid."),
			oaep_digest: OaepDigest::Sha1,
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
