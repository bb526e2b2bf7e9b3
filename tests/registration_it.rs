mod common;

// crates.io
use serde_json::json;
use time::macros;
// self
use common::RecordingClient;
use starmf_gateway::{
	error::{AllocationError, Error, TransportError},
	flows::{ClientProfile, ORG_HEADER, OrderListQuery},
};

fn profile(pan: &str) -> ClientProfile {
	ClientProfile {
		pan: pan.into(),
		name: "Asha Rao".into(),
		email: "asha@example.com".into(),
		mobile: "9800000000".into(),
		date_of_birth: Some(macros::date!(1990 - 03 - 07)),
	}
}

fn opened_body(request: &starmf_gateway::http::JsonRequest) -> serde_json::Value {
	let body: serde_json::Value =
		serde_json::from_slice(&request.body).expect("Sent body should be JSON.");
	let sealed = body["data"].as_str().expect("Registration body should be sealed.");

	common::platform_side_cipher()
		.decrypt_from_platform(sealed)
		.expect("Platform key should open the registration payload.")
}

#[tokio::test]
async fn registration_allocates_then_submits_sealed_profile() {
	let client = RecordingClient::default()
		.reply_json(200, json!({ "status": "success", "message": "UCC created" }));
	let gateway = common::recording_gateway(client.clone());
	let registration = gateway
		.register_client(&profile("ABCDE1234F"))
		.await
		.expect("Registration should succeed.");

	assert_eq!(registration.client_code.to_string(), "PV AB 001");
	assert_eq!(registration.response["message"], "UCC created");

	let requests = client.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].url.path(), "/StarMF/v2/add_ucc");
	assert_eq!(requests[0].header_value(ORG_HEADER), Some("ORG1:fp-test"));
	assert_eq!(
		opened_body(&requests[0]),
		json!({
			"member_code": "10001",
			"client_code": "PV AB 001",
			"pan": "ABCDE1234F",
			"name": "Asha Rao",
			"email": "asha@example.com",
			"mobile": "9800000000",
			"dob": "07/03/1990",
		})
	);
}

#[tokio::test]
async fn invalid_identifier_aborts_before_any_request() {
	let client = RecordingClient::default();
	let gateway = common::recording_gateway(client.clone());
	let err = gateway
		.register_client(&profile("A"))
		.await
		.expect_err("Single-character PAN must abort registration.");

	assert!(matches!(err, Error::Allocation(AllocationError::InvalidIdentifier(_))));
	assert!(client.requests().is_empty());
}

#[tokio::test]
async fn failed_submission_does_not_reuse_the_code() {
	let client = RecordingClient::default()
		.reply_json(503, json!({ "status": "error" }))
		.reply_json(200, json!({ "status": "success" }));
	let gateway = common::recording_gateway(client.clone());
	let err = gateway
		.register_client(&profile("ABCDE1234F"))
		.await
		.expect_err("Platform outage must fail registration.");

	assert!(matches!(err, Error::Transport(TransportError::Status { status: 503, .. })));

	let retried = gateway
		.register_client(&profile("ABXYZ9876K"))
		.await
		.expect("Second registration should succeed.");

	assert_eq!(retried.client_code.to_string(), "PV AB 002");
}

#[tokio::test]
async fn order_list_sends_dates_day_first() {
	let client = RecordingClient::default().reply_json(200, json!({ "status": "ok", "data": [] }));
	let gateway = common::recording_gateway(client.clone());
	let query =
		OrderListQuery::between(macros::date!(2026 - 01 - 01), macros::date!(2026 - 01 - 31))
			.for_client("PV AB 001");
	let reply = gateway.order_list(&query).await.expect("Order listing should succeed.");

	assert_eq!(reply["data"], json!([]));

	let requests = client.requests();

	assert_eq!(requests[0].url.path(), "/StarMF/s2/order_list");
	assert_eq!(
		opened_body(&requests[0]),
		json!({
			"member_code": "10001",
			"from_date": "01/01/2026",
			"to_date": "31/01/2026",
			"client_code": "PV AB 001",
		})
	);
}
