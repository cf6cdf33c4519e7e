//! Account-store contract plus built-in store implementations for linked identities.

pub mod file;
pub mod memory;

pub use file::FileAccountStore;
pub use memory::MemoryAccountStore;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ProviderUserId, UserId},
	error::LinkError,
};

/// Boxed future returned by [`AccountStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LinkError>> + 'a + Send>>;

/// Identity store that binds external provider users to local accounts.
///
/// Implementations own atomicity: [`connect`](AccountStore::connect) must look up and, if
/// needed, create the account plus binding as one logical step so concurrent callbacks for
/// the same external user converge on a single account.
pub trait AccountStore
where
	Self: Send + Sync,
{
	/// Returns the account bound to the external identity, creating one if absent.
	fn connect<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, LinkedAccount>;

	/// Binds the external identity to an existing local account.
	///
	/// Re-binding to the same account is a no-op; binding to a different account fails with
	/// [`LinkError::ConflictingBinding`].
	fn bind<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
		user_id: &'a UserId,
	) -> StoreFuture<'a, LinkedAccount>;

	/// Fetches the binding for the external identity, if present.
	fn lookup<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, Option<LinkedAccount>>;

	/// Removes the binding; returns whether one existed.
	fn unlink<'a>(
		&'a self,
		provider_id: &'a ProviderId,
		provider_user_id: &'a ProviderUserId,
	) -> StoreFuture<'a, bool>;
}

/// Binding between an external provider identity and a local account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
	/// Provider that issued the external identity.
	pub provider_id: ProviderId,
	/// External user identifier.
	pub provider_user_id: ProviderUserId,
	/// Local account the identity is bound to.
	pub user_id: UserId,
	/// Whether the store created the local account during this call.
	pub created: bool,
}

/// Unique key identifying a stored binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingKey {
	/// Provider component.
	pub provider_id: ProviderId,
	/// External user component.
	pub provider_user_id: ProviderUserId,
}
impl BindingKey {
	/// Builds a key for the provided identity.
	pub fn new(provider_id: &ProviderId, provider_user_id: &ProviderUserId) -> Self {
		Self { provider_id: provider_id.clone(), provider_user_id: provider_user_id.clone() }
	}

	fn linked(&self, user_id: UserId, created: bool) -> LinkedAccount {
		LinkedAccount {
			provider_id: self.provider_id.clone(),
			provider_user_id: self.provider_user_id.clone(),
			user_id,
			created,
		}
	}
}

type Bindings = HashMap<BindingKey, UserId>;

/// Lookup-or-create against an already locked map.
fn connect_locked(bindings: &mut Bindings, key: BindingKey) -> LinkedAccount {
	if let Some(existing) = bindings.get(&key) {
		return key.linked(existing.clone(), false);
	}

	let user_id = UserId::generate();
	let linked = key.linked(user_id.clone(), true);

	bindings.insert(key, user_id);

	linked
}

/// Returns the account plus whether the map changed.
fn bind_locked(
	bindings: &mut Bindings,
	key: BindingKey,
	user_id: &UserId,
) -> Result<(LinkedAccount, bool), LinkError> {
	match bindings.get(&key) {
		Some(existing) if existing == user_id => Ok((key.linked(existing.clone(), false), false)),
		Some(existing) => Err(LinkError::ConflictingBinding {
			provider_id: key.provider_id.to_string(),
			provider_user_id: key.provider_user_id.to_string(),
			message: format!("bound to account {existing}"),
		}),
		None => {
			let linked = key.linked(user_id.clone(), false);

			bindings.insert(key, user_id.clone());

			Ok((linked, true))
		},
	}
}

fn lookup_locked(bindings: &Bindings, key: BindingKey) -> Option<LinkedAccount> {
	let user_id = bindings.get(&key)?.clone();

	Some(key.linked(user_id, false))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn key(user: &str) -> BindingKey {
		BindingKey::new(
			&ProviderId::new("spotify").expect("Provider fixture should be valid."),
			&ProviderUserId::new(user).expect("Provider user fixture should be valid."),
		)
	}

	#[test]
	fn connect_creates_once_then_reuses() {
		let mut bindings = Bindings::new();
		let first = connect_locked(&mut bindings, key("u1"));
		let second = connect_locked(&mut bindings, key("u1"));

		assert!(first.created);
		assert!(!second.created);
		assert_eq!(first.user_id, second.user_id);
		assert_eq!(bindings.len(), 1);
	}

	#[test]
	fn bind_rejects_a_different_account() {
		let mut bindings = Bindings::new();
		let owner = UserId::new("owner").expect("User fixture should be valid.");
		let intruder = UserId::new("intruder").expect("User fixture should be valid.");
		let (linked, changed) = bind_locked(&mut bindings, key("u1"), &owner)
			.expect("First bind should succeed.");

		assert!(changed);
		assert_eq!(linked.user_id, owner);

		let (_, changed) = bind_locked(&mut bindings, key("u1"), &owner)
			.expect("Re-binding to the same account should be a no-op.");

		assert!(!changed);

		let err = bind_locked(&mut bindings, key("u1"), &intruder)
			.expect_err("Binding to another account should conflict.");

		assert!(matches!(err, LinkError::ConflictingBinding { .. }));
		assert_eq!(lookup_locked(&bindings, key("u1")).map(|l| l.user_id), Some(owner));
	}
}
