//! Secured POSTs carrying the organization identity header and an optionally sealed payload.

// self
use crate::{
	_prelude::*,
	error::TransportError,
	flows::{Gateway, common},
	http::{GatewayHttpClient, JsonRequest},
	obs::{self, FlowKind},
};

/// Header carrying `"{org_code}:{org_fingerprint}"` on every secured request.
pub const ORG_HEADER: &str = "X-API-Org-ID";

/// Wire envelope shared by every platform request: `{ "data": ... }`.
#[derive(Serialize)]
pub(crate) struct Envelope<'a, T>
where
	T: ?Sized,
{
	pub(crate) data: &'a T,
}

/// Per-call switches for [`Gateway::post`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostOptions {
	/// Seal the payload with the platform key (default `true`).
	pub encrypt: bool,
	/// Open a string `data` field in the reply with the own private key (default `false`).
	pub decrypt_response: bool,
	/// Attach `Authorization: Bearer <token>` from the token cache (default `false`).
	pub bearer: bool,
}
impl PostOptions {
	/// Options for endpoints documented as accepting plaintext payloads.
	pub fn plain() -> Self {
		Self { encrypt: false, ..Default::default() }
	}

	/// Overrides the encryption switch.
	pub fn with_encrypt(mut self, encrypt: bool) -> Self {
		self.encrypt = encrypt;

		self
	}

	/// Decrypts the reply's `data` field when it is a sealed string.
	pub fn decrypt_response(mut self) -> Self {
		self.decrypt_response = true;

		self
	}

	/// Sends the cached bearer token, logging in first if needed.
	pub fn with_bearer(mut self) -> Self {
		self.bearer = true;

		self
	}
}
impl Default for PostOptions {
	fn default() -> Self {
		Self { encrypt: true, decrypt_response: false, bearer: false }
	}
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Posts `payload` to `{base_url}/{path}` and returns the JSON reply.
	///
	/// The call is made exactly once with the configured timeout. Non-2xx statuses, bodies
	/// that are not JSON, and sealing failures all surface as errors; nothing is retried.
	pub async fn post<P>(
		&self,
		path: &str,
		payload: &P,
		options: PostOptions,
	) -> Result<serde_json::Value>
	where
		P: ?Sized + Serialize + Sync,
	{
		obs::observe(FlowKind::SecurePost, "post", self.send_secured(path, payload, options)).await
	}

	async fn send_secured<P>(
		&self,
		path: &str,
		payload: &P,
		options: PostOptions,
	) -> Result<serde_json::Value>
	where
		P: ?Sized + Serialize + Sync,
	{
		let url = common::endpoint(&self.settings.base_url, path)?;
		let encoded = if options.encrypt {
			let sealed = self.cipher.encrypt_for_platform(payload)?;

			serde_json::to_vec(&Envelope { data: sealed.as_str() })
		} else {
			serde_json::to_vec(&Envelope { data: payload })
		};
		let body = encoded.map_err(TransportError::Encode)?;
		let mut request = JsonRequest::new(url, body, self.settings.request_timeout)
			.header(ORG_HEADER, self.settings.org_header_value());

		if options.bearer {
			let token = self.access_token().await?;

			request = request.header("Authorization", format!("Bearer {}", token.expose()));
		}

		let reply = self.http_client.post_json(request).await?;

		common::ensure_success(&reply)?;

		let mut body = common::parse_json(&reply)?;

		if options.decrypt_response {
			self.open_data_field(&mut body)?;
		}

		Ok(body)
	}

	fn open_data_field(&self, body: &mut serde_json::Value) -> Result<()> {
		let Some(slot) = body.get_mut("data") else {
			return Ok(());
		};
		let opened = match slot {
			serde_json::Value::String(sealed) => self.cipher.decrypt_from_platform(sealed)?,
			_ => return Ok(()),
		};

		*slot = opened;

		Ok(())
	}
}
