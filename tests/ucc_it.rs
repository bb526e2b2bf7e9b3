mod common;

// std
use std::{collections::BTreeSet, sync::Arc};
// self
use common::RecordingClient;
use starmf_gateway::{
	auth::{IdentifierError, UccPrefix},
	error::{AllocationError, Error},
	store::{FileStore, MemoryStore, SequenceStore},
};

#[tokio::test]
async fn codes_follow_issuer_prefix_sequence_format() {
	let gateway = common::recording_gateway(RecordingClient::default());
	let first = gateway.allocate_ucc("MH0001").await.expect("First MH allocation should succeed.");
	let second =
		gateway.allocate_ucc("mh0002").await.expect("Second MH allocation should succeed.");
	let other = gateway.allocate_ucc("AB1234C").await.expect("AB allocation should succeed.");

	assert_eq!(first.to_string(), "PV MH 001");
	assert_eq!(second.to_string(), "PV MH 002");
	assert_eq!(other.to_string(), "PV AB 001");
	assert_eq!(second.prefix().as_str(), "MH");
	assert_eq!(second.sequence(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_allocations_never_repeat() {
	const CALLERS: u64 = 64;

	let gateway = common::recording_gateway(RecordingClient::default());
	let mut handles = Vec::new();

	for i in 0..CALLERS {
		let gateway = gateway.clone();

		handles.push(tokio::spawn(async move { gateway.allocate_ucc(&format!("MH{i:04}")).await }));
	}

	let mut sequences = BTreeSet::new();

	for handle in handles {
		let code = handle
			.await
			.expect("Allocation task should not panic.")
			.expect("Allocation should succeed.");

		assert!(sequences.insert(code.sequence()), "Duplicate sequence {code}.");
	}

	assert_eq!(sequences, (1..=CALLERS).collect::<BTreeSet<_>>());
}

#[tokio::test]
async fn sequence_widens_past_three_digits() {
	let store = Arc::new(MemoryStore::default());
	let prefix = UccPrefix::from_identifier("KA").expect("Prefix fixture should be valid.");

	for _ in 0..999 {
		store.increment(&prefix).await.expect("Seeding increment should succeed.");
	}

	let gateway = common::recording_gateway_with_store(RecordingClient::default(), store);
	let code = gateway.allocate_ucc("KA77").await.expect("Allocation past 999 should succeed.");

	assert_eq!(code.to_string(), "PV KA 1000");
}

#[tokio::test]
async fn file_store_counters_outlive_the_gateway() {
	let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
	let path = dir.path().join("ucc.json");

	{
		let store = Arc::new(FileStore::open(&path).expect("File store should open."));
		let gateway = common::recording_gateway_with_store(RecordingClient::default(), store);

		gateway.allocate_ucc("GJ01").await.expect("First allocation should succeed.");
		gateway.allocate_ucc("GJ02").await.expect("Second allocation should succeed.");
	}

	let store = Arc::new(FileStore::open(&path).expect("File store should reopen."));
	let gateway = common::recording_gateway_with_store(RecordingClient::default(), store);
	let code = gateway.allocate_ucc("gj03").await.expect("Allocation after reopen should succeed.");

	assert_eq!(code.to_string(), "PV GJ 003");
}

#[tokio::test]
async fn unusable_identifiers_are_rejected() {
	let store = Arc::new(MemoryStore::default());
	let gateway = common::recording_gateway_with_store(RecordingClient::default(), store.clone());

	for (identifier, expected) in [
		("", "empty"),
		("M", "too short"),
		("M 123", "whitespace"),
	] {
		let err = gateway.allocate_ucc(identifier).await.expect_err("Identifier must be rejected.");
		let Error::Allocation(AllocationError::InvalidIdentifier(inner)) = err else {
			panic!("Identifier {identifier:?} should fail validation.");
		};
		let matched = match inner {
			IdentifierError::Empty { .. } => "empty",
			IdentifierError::TooShort { .. } => "too short",
			IdentifierError::ContainsWhitespace { .. } => "whitespace",
			other => panic!("Unexpected identifier error: {other:?}"),
		};

		assert_eq!(matched, expected);
	}

	let mh = UccPrefix::from_identifier("MH").expect("Prefix fixture should be valid.");

	assert_eq!(store.current(&mh).await, Ok(None));
}

#[tokio::test]
async fn punctuation_and_non_ascii_identifiers_get_their_own_partition() {
	let gateway = common::recording_gateway(RecordingClient::default());

	for (identifier, expected) in [
		("A-1234", "PV A- 001"),
		("éa1234", "PV ÉA 001"),
		("ÉA9999", "PV ÉA 002"),
		("1_2345", "PV 1_ 001"),
	] {
		let code = gateway
			.allocate_ucc(identifier)
			.await
			.expect("Any two leading non-blank characters should allocate.");

		assert_eq!(code.to_string(), expected);
	}
}
