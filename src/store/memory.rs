//! Thread-safe in-memory [`AccountStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ProviderUserId, UserId},
	store::{self, AccountStore, BindingKey, Bindings, LinkedAccount, StoreFuture},
};

type StoreMap = Arc<RwLock<Bindings>>;

/// Process-local account store; bindings vanish when the process exits.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore(StoreMap);
impl MemoryAccountStore {
	/// Number of bindings currently held.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no identity has been bound yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl AccountStore for MemoryAccountStore {
	fn connect<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, LinkedAccount> {
		let map = self.0.clone();
		let key = BindingKey::new(provider_id, provider_user_id);

		Box::pin(async move { Ok(store::connect_locked(&mut map.write(), key)) })
	}

	fn bind<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
		user_id: &'a UserId,
	) -> StoreFuture<'a, LinkedAccount> {
		let map = self.0.clone();
		let key = BindingKey::new(provider_id, provider_user_id);

		Box::pin(async move {
			store::bind_locked(&mut map.write(), key, user_id).map(|(linked, _)| linked)
		})
	}

	fn lookup<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, Option<LinkedAccount>> {
		let map = self.0.clone();
		let key = BindingKey::new(provider_id, provider_user_id);

		Box::pin(async move { Ok(store::lookup_locked(&map.read(), key)) })
	}

	fn unlink<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, bool> {
		let map = self.0.clone();
		let key = BindingKey::new(provider_id, provider_user_id);

		Box::pin(async move { Ok(map.write().remove(&key).is_some()) })
	}
}
