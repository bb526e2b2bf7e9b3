//! Thread-safe in-memory [`SequenceStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::UccPrefix,
	store::{self, SequenceStore, StoreError, StoreFuture},
};

type CounterMap = Arc<RwLock<HashMap<UccPrefix, u64>>>;

/// Process-local counters; increments are atomic under a single write lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(CounterMap);
impl MemoryStore {
	fn increment_now(map: CounterMap, prefix: UccPrefix) -> Result<u64, StoreError> {
		let mut guard = map.write();
		let next = store::next_value(&prefix, guard.get(&prefix).copied())?;

		guard.insert(prefix, next);

		Ok(next)
	}

	fn current_now(map: CounterMap, prefix: UccPrefix) -> Option<u64> {
		map.read().get(&prefix).copied()
	}
}
impl SequenceStore for MemoryStore {
	fn increment<'a>(&'a self, prefix: &'a UccPrefix) -> StoreFuture<'a, u64> {
		let map = self.0.clone();
		let prefix = prefix.to_owned();

		Box::pin(async move { Self::increment_now(map, prefix) })
	}

	fn current<'a>(&'a self, prefix: &'a UccPrefix) -> StoreFuture<'a, Option<u64>> {
		let map = self.0.clone();
		let prefix = prefix.to_owned();

		Box::pin(async move { Ok(Self::current_now(map, prefix)) })
	}
}
