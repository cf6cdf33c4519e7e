//! Strongly typed identifiers for providers, external users, and local accounts.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validate:ident) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;
const USER_ID_LEN: usize = 15;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (provider, provider user, user).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (provider, provider user, user).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte count.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier (provider, provider user, user).
		kind: &'static str,
		/// Maximum permitted byte count.
		max: usize,
	},
}

def_id! {
	ProviderId,
	"Fixed identifier of an OAuth provider (e.g. `spotify`).",
	"Provider",
	validate_view
}
def_id! {
	ProviderUserId,
	"Stable, opaque user identifier issued by a provider; any non-empty string.",
	"ProviderUser",
	validate_opaque
}
def_id! { UserId, "Identifier of a local account owned by the account store.", "User", validate_view }

impl UserId {
	/// Generates a fresh random identifier for a newly created local account.
	pub fn generate() -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(USER_ID_LEN).map(char::from).collect())
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

fn validate_opaque(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_padding_and_empty_values() {
		assert!(ProviderId::new(" spotify").is_err(), "Leading whitespace must be rejected.");
		assert!(ProviderId::new("spotify ").is_err(), "Trailing whitespace must be rejected.");

		let provider = ProviderId::new("spotify").expect("Provider fixture should be valid.");

		assert_eq!(provider.as_ref(), "spotify");
		assert!(ProviderUserId::new("").is_err());
		assert!(UserId::new("with space").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let user: ProviderUserId =
			serde_json::from_str("\"wizzler\"").expect("Provider user should deserialize.");

		assert_eq!(user.as_ref(), "wizzler");
		assert!(serde_json::from_str::<ProviderId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<ProviderUserId>("\"\"").is_err());
		assert_eq!(
			serde_json::to_string(&user).expect("Provider user should serialize."),
			"\"wizzler\""
		);
	}

	#[test]
	fn length_limit_is_inclusive() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ProviderId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(matches!(
			ProviderId::new(&too_long),
			Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN, .. })
		));
	}

	#[test]
	fn provider_user_ids_are_opaque() {
		let long = "x".repeat(IDENTIFIER_MAX_LEN * 2);

		for raw in ["jane doe", " padded ", long.as_str()] {
			let id = ProviderUserId::new(raw).expect("Non-empty provider user ids are accepted.");

			assert_eq!(id.as_ref(), raw);
		}

		assert_eq!(ProviderUserId::new(""), Err(IdentifierError::Empty { kind: "ProviderUser" }));
	}

	#[test]
	fn generated_user_ids_are_valid_and_distinct() {
		let a = UserId::generate();
		let b = UserId::generate();

		assert_eq!(a.len(), USER_ID_LEN);
		assert!(UserId::new(a.as_ref()).is_ok());
		assert_ne!(a, b);
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ProviderId, u8> = HashMap::from_iter([(
			ProviderId::new("github").expect("Provider used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("github"), Some(&7));
	}
}
