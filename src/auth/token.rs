//! Token sets issued by provider token endpoints and the secret wrapper guarding them.

pub mod secret;
pub mod set;
