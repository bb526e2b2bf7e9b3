//! Storage contracts and built-in sequence stores for client code allocation.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::UccPrefix};

/// Boxed future returned by [`SequenceStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable per-prefix counters backing client code allocation.
///
/// The only mutation is [`SequenceStore::increment`]; implementations perform the
/// get-or-create and the increment as one atomic step.
pub trait SequenceStore
where
	Self: Send + Sync,
{
	/// Atomically creates the counter at zero if absent, increments it, and returns the new
	/// value.
	///
	/// Two calls for the same prefix never observe the same value, including across
	/// concurrent callers.
	fn increment<'a>(&'a self, prefix: &'a UccPrefix) -> StoreFuture<'a, u64>;

	/// Returns the last allocated value for the prefix without changing it.
	fn current<'a>(&'a self, prefix: &'a UccPrefix) -> StoreFuture<'a, Option<u64>>;
}

/// Error type produced by [`SequenceStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Counter cannot be incremented any further.
	#[error("Counter for prefix {prefix} is exhausted.")]
	Exhausted {
		/// Prefix whose counter overflowed.
		prefix: String,
	},
}

pub(crate) fn next_value(prefix: &UccPrefix, current: Option<u64>) -> Result<u64, StoreError> {
	current
		.unwrap_or(0)
		.checked_add(1)
		.ok_or_else(|| StoreError::Exhausted { prefix: prefix.to_string() })
}
