//! Simple file-backed [`SequenceStore`] for single-process deployments.

// std
use std::{
	collections::BTreeMap,
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::UccPrefix,
	store::{self, SequenceStore, StoreError, StoreFuture},
};

type Snapshot = BTreeMap<UccPrefix, u64>;

/// Persists counters to a JSON file after each increment.
///
/// The increment and the write happen under one lock, and a failed write rolls the counter
/// back, so a value is only returned once it is on disk. Atomicity holds within one process;
/// deployments running several instances need a database-backed [`SequenceStore`].
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(Snapshot::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Snapshot::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize counter snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl SequenceStore for FileStore {
	fn increment<'a>(&'a self, prefix: &'a UccPrefix) -> StoreFuture<'a, u64> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let previous = guard.get(prefix).copied();
			let next = store::next_value(prefix, previous)?;

			guard.insert(prefix.clone(), next);

			if let Err(e) = self.persist_locked(&guard) {
				match previous {
					Some(value) => guard.insert(prefix.clone(), value),
					None => guard.remove(prefix),
				};

				return Err(e);
			}

			Ok(next)
		})
	}

	fn current<'a>(&'a self, prefix: &'a UccPrefix) -> StoreFuture<'a, Option<u64>> {
		Box::pin(async move { Ok(self.inner.read().get(prefix).copied()) })
	}
}
