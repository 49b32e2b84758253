//! `ink auth`, `ink logout` and `ink whoami`

use anyhow::{bail, Context, Result};
use inkdown_config::{CliConfig, Env};
use inkdown_devkit::account::{device_name, AccountClient};
use tracing::info;

use crate::console;

/// Prompt for credentials and store an Inkdown CLI token
pub async fn login() -> Result<()> {
    let mut config = CliConfig::load().context("failed to load config")?;
    if config.is_authenticated() {
        console::success(&format!(
            "You are already authenticated as: {}",
            config.email.as_deref().unwrap_or_default()
        ));
        console::note("  Use 'ink logout' to sign out first.");
        return Ok(());
    }

    console::info("Inkdown CLI Authentication");

    let email = console::prompt("Email: ").context("failed to read email")?;
    if email.is_empty() {
        bail!("email cannot be empty");
    }
    let password = console::prompt_password("Password: ").context("failed to read password")?;
    if password.is_empty() {
        bail!("password cannot be empty");
    }

    console::info("Authenticating...");
    let env = Env::load();
    let client = AccountClient::new(env.api_base_url.as_str())?;
    let token = client
        .login(&email, &password, &device_name())
        .await
        .context("authentication failed")?;

    config
        .set_credentials(token, email.as_str())
        .context("failed to save credentials")?;
    info!(email = %email, "Stored CLI credentials");

    console::success("Authentication successful!");
    console::note(&format!("  Logged in as: {}", email));
    console::note(&format!("  Config saved to: {}", config.path().display()));
    Ok(())
}

/// Forget the stored Inkdown credentials
pub fn logout() -> Result<()> {
    let mut config = CliConfig::load().context("failed to load config")?;
    if !config.is_authenticated() {
        console::info("You are not currently logged in.");
        return Ok(());
    }

    let email = config
        .clear_credentials()
        .context("failed to clear credentials")?
        .unwrap_or_default();
    console::success(&format!("Logged out successfully from: {}", email));
    Ok(())
}

/// Report which account is logged in
pub fn whoami() -> Result<()> {
    let config = CliConfig::load().context("failed to load config")?;
    match config.email.as_deref().filter(|_| config.is_authenticated()) {
        Some(email) => console::info(&format!("Logged in as: {}", email)),
        None => console::info("Not authenticated. Use 'ink auth' to login."),
    }
    Ok(())
}
