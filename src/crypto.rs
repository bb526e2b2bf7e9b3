//! RSA-OAEP payload sealing for the platform's encrypted request envelope.
//!
//! Requests are encrypted with the platform's public key; responses (when encrypted) are
//! decrypted with the member's own private key. Keys are loaded once, at gateway
//! construction, so a missing or corrupt key file stops startup instead of failing requests.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::{
	Oaep, RsaPrivateKey, RsaPublicKey,
	pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
	pkcs8::{DecodePrivateKey, DecodePublicKey},
	rand_core::OsRng,
	traits::PublicKeyParts,
};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ConfigError};

/// Digest used inside the OAEP padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OaepDigest {
	#[default]
	/// SHA-1, the default OAEP digest of most RSA bindings.
	Sha1,
	/// SHA-256.
	Sha256,
}
impl OaepDigest {
	/// Returns a stable label suitable for config files and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OaepDigest::Sha1 => "sha1",
			OaepDigest::Sha256 => "sha256",
		}
	}

	/// Digest output length in bytes.
	pub const fn output_len(self) -> usize {
		match self {
			OaepDigest::Sha1 => 20,
			OaepDigest::Sha256 => 32,
		}
	}

	fn padding(self) -> Oaep {
		match self {
			OaepDigest::Sha1 => Oaep::new::<sha1::Sha1>(),
			OaepDigest::Sha256 => Oaep::new::<sha2::Sha256>(),
		}
	}
}
impl Display for OaepDigest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Filesystem locations of the PEM-encoded keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPaths {
	/// Member's own private key (decrypts platform responses).
	pub rsa_private_key: PathBuf,
	/// Member's own public key (must pair with `rsa_private_key`).
	pub rsa_public_key: PathBuf,
	/// Platform's public key (encrypts outbound payloads).
	pub bse_public_key: PathBuf,
}

/// Encryption and decryption failures for a single payload.
#[derive(Debug, ThisError)]
pub enum CryptoError {
	/// Payload could not be serialized to JSON.
	#[error("Payload could not be serialized to JSON.")]
	Serialize(#[source] serde_json::Error),
	/// RSA-OAEP encryption failed (e.g. the payload exceeds the key's capacity).
	#[error("Payload could not be encrypted for the platform.")]
	Encrypt {
		/// Underlying RSA failure.
		#[source]
		source: rsa::Error,
	},
	/// Ciphertext is not valid base64.
	#[error("Encrypted payload is not valid base64.")]
	Base64(#[from] base64::DecodeError),
	/// RSA-OAEP decryption failed (corrupted ciphertext or key mismatch).
	#[error("Encrypted payload could not be decrypted.")]
	Decrypt {
		/// Underlying RSA failure.
		#[source]
		source: rsa::Error,
	},
	/// Decrypted bytes are not the expected JSON document.
	#[error("Decrypted payload is not valid JSON.")]
	Deserialize(#[source] serde_json::Error),
}

/// Loaded key material for sealing platform payloads.
#[derive(Clone)]
pub struct PlatformCipher {
	platform_public: RsaPublicKey,
	own_private: RsaPrivateKey,
	digest: OaepDigest,
}
impl PlatformCipher {
	/// Builds a cipher from already-parsed keys.
	pub fn new(
		platform_public: RsaPublicKey,
		own_private: RsaPrivateKey,
		digest: OaepDigest,
	) -> Self {
		Self { platform_public, own_private, digest }
	}

	/// Loads all three PEM keys and checks that the own keypair matches.
	///
	/// PKCS#8 (`BEGIN PUBLIC KEY` / `BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA ...`) encodings
	/// are both accepted.
	pub fn load(paths: &KeyPaths, digest: OaepDigest) -> Result<Self, ConfigError> {
		let platform_public = load_public_key(&paths.bse_public_key)?;
		let own_private = load_private_key(&paths.rsa_private_key)?;
		let own_public = load_public_key(&paths.rsa_public_key)?;

		if own_private.to_public_key() != own_public {
			return Err(ConfigError::KeyMismatch { path: paths.rsa_public_key.clone() });
		}

		Ok(Self::new(platform_public, own_private, digest))
	}

	/// OAEP digest in use.
	pub fn digest(&self) -> OaepDigest {
		self.digest
	}

	/// Largest plaintext, in bytes, the platform key can seal in one block.
	pub fn max_plaintext_len(&self) -> usize {
		self.platform_public.size().saturating_sub(2 * self.digest.output_len() + 2)
	}

	/// Serializes `payload` to JSON, encrypts it with the platform key, and returns base64.
	pub fn encrypt_for_platform<T>(&self, payload: &T) -> Result<String, CryptoError>
	where
		T: ?Sized + Serialize,
	{
		let plaintext = serde_json::to_vec(payload).map_err(CryptoError::Serialize)?;
		let ciphertext = self
			.platform_public
			.encrypt(&mut OsRng, self.digest.padding(), &plaintext)
			.map_err(|source| CryptoError::Encrypt { source })?;

		Ok(STANDARD.encode(ciphertext))
	}

	/// Base64-decodes, decrypts with the own private key, and parses the JSON plaintext.
	pub fn decrypt_from_platform<T>(&self, payload: &str) -> Result<T, CryptoError>
	where
		T: DeserializeOwned,
	{
		let ciphertext = STANDARD.decode(payload.trim())?;
		let plaintext = self
			.own_private
			.decrypt(self.digest.padding(), &ciphertext)
			.map_err(|source| CryptoError::Decrypt { source })?;

		serde_json::from_slice(&plaintext).map_err(CryptoError::Deserialize)
	}
}
impl Debug for PlatformCipher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PlatformCipher")
			.field("digest", &self.digest)
			.field("platform_key_bits", &(self.platform_public.size() * 8))
			.field("own_private", &"<redacted>")
			.finish()
	}
}

fn read_pem(path: &Path) -> Result<String, ConfigError> {
	fs::read_to_string(path)
		.map_err(|source| ConfigError::KeyFile { path: path.to_owned(), source })
}

fn load_public_key(path: &Path) -> Result<RsaPublicKey, ConfigError> {
	let pem = read_pem(path)?;

	RsaPublicKey::from_public_key_pem(&pem).or_else(|spki_err| {
		RsaPublicKey::from_pkcs1_pem(&pem).map_err(|pkcs1_err| ConfigError::KeyParse {
			path: path.to_owned(),
			reason: format!("not SPKI ({spki_err}) nor PKCS#1 ({pkcs1_err})"),
		})
	})
}

fn load_private_key(path: &Path) -> Result<RsaPrivateKey, ConfigError> {
	let pem = read_pem(path)?;

	RsaPrivateKey::from_pkcs8_pem(&pem).or_else(|pkcs8_err| {
		RsaPrivateKey::from_pkcs1_pem(&pem).map_err(|pkcs1_err| ConfigError::KeyParse {
			path: path.to_owned(),
			reason: format!("not PKCS#8 ({pkcs8_err}) nor PKCS#1 ({pkcs1_err})"),
		})
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn decrypt_reverses_encrypt_for_matching_keys() {
		let cipher = loopback_cipher(OaepDigest::Sha1);
		let payload = json!({ "client_code": "PV MH 001", "amount": 5000, "tags": ["sip", null] });
		let sealed = cipher.encrypt_for_platform(&payload).expect("Payload should encrypt.");
		let opened: serde_json::Value =
			cipher.decrypt_from_platform(&sealed).expect("Ciphertext should decrypt.");

		assert_eq!(opened, payload);
	}

	#[test]
	fn sha256_padding_round_trips() {
		let cipher = loopback_cipher(OaepDigest::Sha256);
		let sealed =
			cipher.encrypt_for_platform(&json!(["a", 1])).expect("Payload should encrypt.");
		let opened: Vec<serde_json::Value> =
			cipher.decrypt_from_platform(&sealed).expect("Ciphertext should decrypt.");

		assert_eq!(opened, vec![json!("a"), json!(1)]);
	}

	#[test]
	fn ciphertext_is_randomized() {
		let cipher = loopback_cipher(OaepDigest::Sha1);
		let payload = json!({"k": "v"});
		let first = cipher.encrypt_for_platform(&payload).expect("First seal should work.");
		let second = cipher.encrypt_for_platform(&payload).expect("Second seal should work.");

		assert_ne!(first, second);
	}

	#[test]
	fn wrong_private_key_fails_to_decrypt() {
		let sealed = gateway_cipher(OaepDigest::Sha1)
			.encrypt_for_platform(&json!({"k": "v"}))
			.expect("Payload should encrypt for the platform.");
		let err = gateway_cipher(OaepDigest::Sha1)
			.decrypt_from_platform::<serde_json::Value>(&sealed)
			.expect_err("Member key must not open platform-bound ciphertext.");

		assert!(matches!(err, CryptoError::Decrypt { .. }));
	}

	#[test]
	fn malformed_base64_is_reported() {
		let err = loopback_cipher(OaepDigest::Sha1)
			.decrypt_from_platform::<serde_json::Value>("***")
			.expect_err("Non-base64 input must be rejected.");

		assert!(matches!(err, CryptoError::Base64(_)));
	}

	#[test]
	fn oversized_payload_is_an_encrypt_error() {
		let cipher = loopback_cipher(OaepDigest::Sha1);
		let too_big = "x".repeat(cipher.max_plaintext_len() + 1);

		assert_eq!(cipher.max_plaintext_len(), 214);

		let err = cipher.encrypt_for_platform(&too_big).expect_err("Oversized payload must fail.");

		assert!(matches!(err, CryptoError::Encrypt { .. }));
	}

	#[test]
	fn debug_output_hides_private_key() {
		let rendered = format!("{:?}", loopback_cipher(OaepDigest::Sha1));

		assert!(rendered.contains("platform_key_bits: 2048"));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn pkcs1_and_pkcs8_keys_both_load() {
		let paths = KeyPaths {
			rsa_private_key: fixture_path("member_private_pkcs1.pem"),
			rsa_public_key: fixture_path("member_public.pem"),
			bse_public_key: fixture_path("platform_public_pkcs1.pem"),
		};
		let cipher =
			PlatformCipher::load(&paths, OaepDigest::Sha1).expect("PKCS#1 keys should load.");
		let sealed = platform_side_cipher(OaepDigest::Sha1)
			.encrypt_for_platform(&json!({"ok": true}))
			.expect("Platform side should seal for the member.");
		let opened: serde_json::Value =
			cipher.decrypt_from_platform(&sealed).expect("PKCS#1 private key should open it.");

		assert_eq!(opened, json!({"ok": true}));
		assert!(PlatformCipher::load(&fixture_key_paths(), OaepDigest::Sha256).is_ok());
	}

	#[test]
	fn mismatched_own_keypair_is_rejected() {
		let paths = KeyPaths {
			rsa_public_key: fixture_path("platform_public.pem"),
			..fixture_key_paths()
		};
		let err = PlatformCipher::load(&paths, OaepDigest::Sha1)
			.expect_err("Foreign public key must not pass as the member key.");

		assert!(matches!(err, ConfigError::KeyMismatch { .. }));
	}

	#[test]
	fn non_pem_key_is_a_parse_error() {
		let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
		let garbage = dir.path().join("garbage.pem");

		fs::write(&garbage, "not a key").expect("Failed to write garbage key.");

		let paths = KeyPaths { bse_public_key: garbage, ..fixture_key_paths() };
		let err = PlatformCipher::load(&paths, OaepDigest::Sha1)
			.expect_err("Garbage key file must be rejected.");

		assert!(matches!(err, ConfigError::KeyParse { .. }));
	}

	#[test]
	fn missing_key_file_is_a_config_error() {
		let paths = KeyPaths {
			rsa_private_key: PathBuf::from("/nonexistent/member_private.pem"),
			rsa_public_key: PathBuf::from("/nonexistent/member_public.pem"),
			bse_public_key: PathBuf::from("/nonexistent/platform_public.pem"),
		};
		let err = PlatformCipher::load(&paths, OaepDigest::Sha1)
			.expect_err("Missing key files must fail fast.");

		assert!(matches!(err, ConfigError::KeyFile { .. }));
	}
}
