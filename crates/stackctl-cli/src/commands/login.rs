//! `stackctl login` — Authenticate and cache the API token.

use clap::Args;
use stackctl_client::credentials::Credentials;

/// Arguments for the `login` command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account name (prompted if absent).
    #[arg(short, long, env = "STACKCTL_USERNAME")]
    pub username: Option<String>,

    /// Password (prompted if absent).
    #[arg(short, long, env = "STACKCTL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Executes the `login` command.
///
/// # Errors
///
/// Returns an error if the credentials are rejected or cannot be cached.
pub fn execute(ctx: &super::Context, args: LoginArgs) -> anyhow::Result<()> {
    let username = match args.username {
        Some(username) => username,
        None => crate::prompt::read_line("Username: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => crate::prompt::read_password("Password: ")?,
    };

    let client = ctx.anonymous_client()?;
    let token = client
        .login(&username, &password)
        .map_err(|e| anyhow::anyhow!("login failed: {e}"))?;

    ctx.credentials.save(&Credentials::new(username, token))?;
    tracing::info!(path = %ctx.credentials.path().display(), "cached credentials");
    println!("Login succeeded");
    Ok(())
}
