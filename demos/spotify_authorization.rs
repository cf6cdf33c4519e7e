//! Interactive Spotify login walkthrough.
//!
//! Prints the authorize URL, waits for the `state` and `code` query parameters from the
//! redirect, then exchanges the code, fetches the Spotify profile, and links it to a local
//! account kept in a JSON file.

// std
use std::{
	io::{self, Write},
	path::PathBuf,
	sync::Arc,
};
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use oauth2_integration::{
	provider::{
		ProviderConfig,
		spotify::{self, SpotifyConfig},
	},
	store::{AccountStore, FileAccountStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = prompt_with_default("Enter your Spotify client ID", None)?;
	let client_secret = prompt_with_default("Enter your Spotify client secret", None)?;
	let redirect_uri = prompt_with_default(
		"Enter the redirect URI registered with Spotify",
		Some("http://127.0.0.1:8080/callback"),
	)?;
	let store_path = prompt_with_default("Account store file", Some("spotify-accounts.json"))?;
	let store: Arc<dyn AccountStore> = Arc::new(FileAccountStore::open(PathBuf::from(store_path))?);
	let config = SpotifyConfig::new(
		ProviderConfig::new(client_id, client_secret, redirect_uri)
			.with_scope(["user-read-email", "user-read-private"]),
	)
	.with_show_dialog(true);
	let flow = spotify::spotify(store, config)?;
	let request = flow.authorization_url(None)?;

	println!("Authorize URL: {}", request.url);
	println!(
		"After Spotify redirects back to your app, copy the `state` and `code` query parameters and paste them here."
	);

	let returned_state = prompt_with_default(
		"State (press Enter to reuse the generated value)",
		Some(request.state.as_str()),
	)?;

	if returned_state != request.state {
		return Err(eyre!("Returned state does not match the issued one."));
	}

	let Some(code) = prompt_optional("Authorization code (leave blank to stop here)")? else {
		println!("Authorization code not provided; skipping the callback.");

		return Ok(());
	};
	let outcome = flow.validate_callback(&code).await?;
	let profile = &outcome.provider_user.profile;

	println!(
		"Spotify user: {} ({})",
		profile.display_name.as_deref().unwrap_or("<no display name>"),
		outcome.provider_user.id
	);
	println!(
		"Local account: {} ({})",
		outcome.account.user_id,
		if outcome.account.created { "created" } else { "existing" }
	);
	println!("Access token: {}", outcome.tokens.access_token.expose());

	match outcome.tokens.access_token_expires_in {
		Some(seconds) => println!("Expires in: {seconds}s"),
		None => println!("Provider did not report an expiry."),
	}

	Ok(())
}

fn prompt_with_default(message: &str, default: Option<&str>) -> Result<String> {
	loop {
		if let Some(value) = default {
			print!("{message} [{value}]: ");
		} else {
			print!("{message}: ");
		}

		io::stdout().flush()?;

		let mut input = String::new();

		io::stdin().read_line(&mut input)?;

		let trimmed = input.trim();

		if trimmed.is_empty() {
			if let Some(value) = default {
				return Ok(value.to_owned());
			}
		} else {
			return Ok(trimmed.to_owned());
		}
	}
}

fn prompt_optional(message: &str) -> Result<Option<String>> {
	print!("{message}: ");

	io::stdout().flush()?;

	let mut input = String::new();

	io::stdin().read_line(&mut input)?;

	let trimmed = input.trim();

	if trimmed.is_empty() { Ok(None) } else { Ok(Some(trimmed.to_owned())) }
}
