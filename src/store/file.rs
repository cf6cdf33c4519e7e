//! Simple file-backed [`AccountStore`] for lightweight deployments and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ProviderUserId, UserId},
	error::LinkError,
	store::{self, AccountStore, BindingKey, Bindings, LinkedAccount, StoreFuture},
};

/// Persists account bindings to a JSON file after each mutation.
///
/// A mutation only becomes visible once the snapshot has been written, so a failed write
/// leaves both the file and the in-memory view untouched.
#[derive(Clone, Debug)]
pub struct FileAccountStore {
	path: PathBuf,
	inner: Arc<RwLock<Bindings>>,
}
impl FileAccountStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, LinkError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { Bindings::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Bindings, LinkError> {
		let metadata = path.metadata().map_err(|e| {
			LinkError::unavailable(format!("Failed to inspect {}: {e}", path.display()))
		})?;

		if metadata.len() == 0 {
			return Ok(Bindings::new());
		}

		let bytes = fs::read(path).map_err(|e| {
			LinkError::unavailable(format!("Failed to read {}: {e}", path.display()))
		})?;
		let entries: Vec<(BindingKey, UserId)> = serde_json::from_slice(&bytes).map_err(|e| {
			LinkError::unavailable(format!("Failed to parse {}: {e}", path.display()))
		})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), LinkError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| {
				LinkError::unavailable(format!(
					"Failed to create store directory {}: {e}",
					parent.display()
				))
			})?;
		}

		Ok(())
	}

	fn persist(&self, contents: &Bindings) -> Result<(), LinkError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized = serde_json::to_vec_pretty(&snapshot).map_err(|e| {
			LinkError::unavailable(format!("Failed to serialize store snapshot: {e}"))
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| {
				LinkError::unavailable(format!("Failed to create {}: {e}", tmp_path.display()))
			})?;

			file.write_all(&serialized).map_err(|e| {
				LinkError::unavailable(format!("Failed to write {}: {e}", tmp_path.display()))
			})?;
			file.sync_all().map_err(|e| {
				LinkError::unavailable(format!("Failed to sync {}: {e}", tmp_path.display()))
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| {
			LinkError::unavailable(format!("Failed to replace {}: {e}", self.path.display()))
		})
	}

	/// Applies `mutate` to a copy of the bindings and commits it once the snapshot is durable.
	fn mutate<T>(
		&self,
		mutate: impl FnOnce(&mut Bindings) -> Result<(T, bool), LinkError>,
	) -> Result<T, LinkError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();
		let (value, changed) = mutate(&mut next)?;

		if changed {
			self.persist(&next)?;

			*guard = next;
		}

		Ok(value)
	}
}
impl AccountStore for FileAccountStore {
	fn connect<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, LinkedAccount> {
		Box::pin(async move {
			let key = BindingKey::new(provider_id, provider_user_id);

			self.mutate(|bindings| {
				let linked = store::connect_locked(bindings, key);
				let created = linked.created;

				Ok((linked, created))
			})
		})
	}

	fn bind<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
		user_id: &'a UserId,
	) -> StoreFuture<'a, LinkedAccount> {
		Box::pin(async move {
			let key = BindingKey::new(provider_id, provider_user_id);

			self.mutate(|bindings| store::bind_locked(bindings, key, user_id))
		})
	}

	fn lookup<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, Option<LinkedAccount>> {
		Box::pin(async move {
			let key = BindingKey::new(provider_id, provider_user_id);

			Ok(store::lookup_locked(&self.inner.read(), key))
		})
	}

	fn unlink<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let key = BindingKey::new(provider_id, provider_user_id);

			self.mutate(|bindings| {
				let removed = bindings.remove(&key).is_some();

				Ok((removed, removed))
			})
		})
	}
}
