//! Typed wrappers over the secured endpoints: client registration and order listing.

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	auth::ClientCode,
	flows::{Gateway, PostOptions},
	http::GatewayHttpClient,
	obs::{self, FlowKind},
};

const ADD_UCC_PATH: &str = "/v2/add_ucc";
const ORDER_LIST_PATH: &str = "/s2/order_list";

/// Client details submitted when registering a new investor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
	/// National identifier (PAN); its first two characters pick the code partition.
	pub pan: String,
	/// Display name.
	pub name: String,
	/// Contact email.
	pub email: String,
	/// Contact phone number.
	pub mobile: String,
	/// Date of birth, sent as `dd/mm/yyyy` when present.
	#[serde(default)]
	pub date_of_birth: Option<Date>,
}

/// Outcome of [`Gateway::register_client`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClientRegistration {
	/// Code allocated for the client before the platform call.
	pub client_code: ClientCode,
	/// Platform reply, as returned.
	pub response: serde_json::Value,
}

/// Filters for [`Gateway::order_list`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListQuery {
	/// First day of the window (inclusive).
	pub from_date: Date,
	/// Last day of the window (inclusive).
	pub to_date: Date,
	/// Restricts the listing to one client.
	#[serde(default)]
	pub client_code: Option<String>,
	/// Restricts the listing to one order type (e.g. `PUR`, `RED`).
	#[serde(default)]
	pub order_type: Option<String>,
}
impl OrderListQuery {
	/// Lists every order placed between `from_date` and `to_date`.
	pub fn between(from_date: Date, to_date: Date) -> Self {
		Self { from_date, to_date, client_code: None, order_type: None }
	}

	/// Narrows the listing to one client.
	pub fn for_client(mut self, client_code: impl Into<String>) -> Self {
		self.client_code = Some(client_code.into());

		self
	}

	/// Narrows the listing to one order type.
	pub fn of_type(mut self, order_type: impl Into<String>) -> Self {
		self.order_type = Some(order_type.into());

		self
	}
}

#[derive(Serialize)]
struct RegistrationPayload<'a> {
	member_code: &'a str,
	client_code: String,
	pan: &'a str,
	name: &'a str,
	email: &'a str,
	mobile: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	dob: Option<String>,
}

#[derive(Serialize)]
struct OrderListPayload<'a> {
	member_code: &'a str,
	from_date: String,
	to_date: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	client_code: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	order_type: Option<&'a str>,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Allocates a client code from the profile's PAN and registers the client.
	///
	/// Allocation failures abort before any request is sent. A code consumed by a failed
	/// registration is not returned to the pool.
	pub async fn register_client(&self, profile: &ClientProfile) -> Result<ClientRegistration> {
		obs::observe(
			FlowKind::ClientRegistration,
			"register_client",
			self.submit_registration(profile),
		)
		.await
	}

	/// Lists orders matching `query`.
	pub async fn order_list(&self, query: &OrderListQuery) -> Result<serde_json::Value> {
		let payload = OrderListPayload {
			member_code: &self.settings.member_code,
			from_date: platform_date(query.from_date),
			to_date: platform_date(query.to_date),
			client_code: query.client_code.as_deref(),
			order_type: query.order_type.as_deref(),
		};

		self.post(ORDER_LIST_PATH, &payload, PostOptions::default()).await
	}

	async fn submit_registration(&self, profile: &ClientProfile) -> Result<ClientRegistration> {
		let client_code = self.allocate_ucc(&profile.pan).await?;
		let payload = RegistrationPayload {
			member_code: &self.settings.member_code,
			client_code: client_code.to_string(),
			pan: &profile.pan,
			name: &profile.name,
			email: &profile.email,
			mobile: &profile.mobile,
			dob: profile.date_of_birth.map(platform_date),
		};
		let response = self.post(ADD_UCC_PATH, &payload, PostOptions::default()).await?;

		Ok(ClientRegistration { client_code, response })
	}
}

/// Renders a date the way the platform expects it: `dd/mm/yyyy`.
fn platform_date(date: Date) -> String {
	format!("{:02}/{:02}/{:04}", date.day(), u8::from(date.month()), date.year())
}
