// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
	/// Scopes always requested ahead of the caller-configured ones.
	pub default_scopes: Vec<String>,
	/// Profile field holding the stable user id; a leading `/` selects a JSON pointer.
	pub user_id_field: String,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { scope_delimiter: ' ', default_scopes: Vec::new(), user_id_field: "id".into() }
	}
}
