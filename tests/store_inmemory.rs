// self
use oauth2_integration::{
	_preludet::*,
	auth::{ProviderId, ProviderUserId, UserId},
	error::LinkError,
	store::{AccountStore, MemoryAccountStore},
};

fn provider() -> ProviderId {
	ProviderId::new("spotify").expect("Failed to build provider identifier for store tests.")
}

fn external(value: &str) -> ProviderUserId {
	ProviderUserId::new(value).expect("Failed to build provider user identifier for store tests.")
}

#[tokio::test]
async fn connect_creates_then_reuses_accounts() {
	let store = MemoryAccountStore::default();
	let provider = provider();
	let first = store
		.connect(&provider, &external("u1"))
		.await
		.expect("First connect should create an account.");

	assert!(first.created);
	assert_eq!(first.provider_id, provider);
	assert_eq!(first.provider_user_id, external("u1"));

	let second = store
		.connect(&provider, &external("u1"))
		.await
		.expect("Second connect should reuse the account.");

	assert!(!second.created);
	assert_eq!(second.user_id, first.user_id);

	let other = store
		.connect(&provider, &external("u2"))
		.await
		.expect("Another identity should get its own account.");

	assert_ne!(other.user_id, first.user_id);
	assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn same_external_id_on_other_providers_is_distinct() {
	let store = MemoryAccountStore::default();
	let github = ProviderId::new("github").expect("Failed to build GitHub identifier.");
	let spotify = store
		.connect(&provider(), &external("42"))
		.await
		.expect("Spotify connect should succeed.");
	let github = store
		.connect(&github, &external("42"))
		.await
		.expect("GitHub connect should succeed.");

	assert!(spotify.created && github.created);
	assert_ne!(spotify.user_id, github.user_id);
}

#[tokio::test]
async fn concurrent_connects_converge_on_one_account() {
	let store = MemoryAccountStore::default();
	let tasks = (0..8)
		.map(|_| {
			let store = store.clone();

			tokio::spawn(async move {
				store
					.connect(&provider(), &external("racer"))
					.await
					.expect("Concurrent connect should succeed.")
			})
		})
		.collect::<Vec<_>>();
	let mut accounts = Vec::new();

	for task in tasks {
		accounts.push(task.await.expect("Connect task should not panic."));
	}

	let created = accounts.iter().filter(|account| account.created).count();

	assert_eq!(created, 1, "only one connect may create the account");
	assert!(accounts.iter().all(|account| account.user_id == accounts[0].user_id));
	assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn bind_attaches_identities_to_existing_accounts() {
	let store = MemoryAccountStore::default();
	let provider = provider();
	let owner = UserId::new("owner-1").expect("Failed to build owner identifier.");
	let linked = store
		.bind(&provider, &external("u1"), &owner)
		.await
		.expect("Binding a fresh identity should succeed.");

	assert_eq!(linked.user_id, owner);
	assert!(!linked.created);

	let connected = store
		.connect(&provider, &external("u1"))
		.await
		.expect("Connect should find the bound account.");

	assert_eq!(connected.user_id, owner);

	let intruder = UserId::new("owner-2").expect("Failed to build intruder identifier.");
	let err = store
		.bind(&provider, &external("u1"), &intruder)
		.await
		.expect_err("Binding to another account should conflict.");

	assert!(matches!(
		err,
		LinkError::ConflictingBinding { ref provider_user_id, .. } if provider_user_id == "u1"
	));
}

#[tokio::test]
async fn unlink_removes_bindings() {
	let store = MemoryAccountStore::default();
	let provider = provider();

	assert!(
		!store.unlink(&provider, &external("ghost")).await.expect("Unlink should not error."),
		"Unlinking an unknown identity reports nothing removed."
	);

	let linked =
		store.connect(&provider, &external("u1")).await.expect("Connect should succeed.");

	let found = store
		.lookup(&provider, &external("u1"))
		.await
		.expect("Lookup should succeed.")
		.expect("Connected identity should be found.");

	assert_eq!(found.user_id, linked.user_id);
	assert!(!found.created, "Lookups never report a creation.");
	assert!(store.unlink(&provider, &external("u1")).await.expect("Unlink should succeed."));
	assert_eq!(
		store.lookup(&provider, &external("u1")).await.expect("Lookup should succeed."),
		None
	);
	assert!(store.is_empty());
}
