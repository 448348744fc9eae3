//! CLI command definitions and dispatch.

pub mod add;
pub mod delete;
pub mod detach;
pub mod login;
pub mod plan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stackctl_client::api::ApiClient;
use stackctl_client::credentials::CredentialCache;
use stackctl_client::session::Session;
use stackctl_common::config::StackctlConfig;
use stackctl_common::constants::ADMIN_USER;

/// stackctl — compose and manage service stacks.
#[derive(Parser, Debug)]
#[command(name = stackctl_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Orchestration API endpoint (overrides the config file).
    #[arg(long, global = true, env = "STACKCTL_SERVER")]
    pub server: Option<String>,

    /// Path to the configuration file.
    #[arg(long, global = true, env = "STACKCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Administrator password for admin-only operations (prompted if absent).
    #[arg(long, global = true, env = "STACKCTL_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in to the server and cache the token.
    Login(login::LoginArgs),
    /// Add a resource.
    #[command(subcommand)]
    Add(add::AddCommand),
    /// Delete a resource.
    #[command(subcommand)]
    Delete(delete::DeleteCommand),
    /// Detach a volume from a stack service.
    Detach(detach::DetachArgs),
    /// Show the services a stack would contain, without creating it.
    Plan(plan::PlanArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::from_cli(&cli)?;
    match cli.command {
        Command::Login(args) => login::execute(&ctx, args),
        Command::Add(cmd) => add::execute(&ctx, cmd),
        Command::Delete(cmd) => delete::execute(&ctx, cmd),
        Command::Detach(args) => detach::execute(&ctx, args),
        Command::Plan(args) => plan::execute(&ctx, args),
    }
}

/// Settings and credentials shared by every command.
#[derive(Debug)]
pub struct Context {
    /// Effective configuration.
    pub config: StackctlConfig,
    /// Cached login credentials.
    pub credentials: CredentialCache,
    admin_password: Option<String>,
}

impl Context {
    /// Builds the context from global flags and the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(stackctl_common::constants::default_config_file);
        let config = StackctlConfig::load(&path)?.with_server(cli.server.clone());
        let credentials = CredentialCache::new(config.credentials_file.clone());
        Ok(Self {
            config,
            credentials,
            admin_password: cli.admin_password.clone(),
        })
    }

    /// Returns a client that is not logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is invalid.
    pub fn anonymous_client(&self) -> anyhow::Result<ApiClient> {
        let session = Session::anonymous(&self.config.server)?;
        Ok(ApiClient::new(session)?)
    }

    /// Returns a client acting as the cached user.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is logged in or the server URL is invalid.
    pub fn client(&self) -> anyhow::Result<ApiClient> {
        let creds = self.credentials.load()?;
        tracing::debug!(user = %creds.username, "using cached credentials");
        let session = Session::authenticated(&self.config.server, &creds)?;
        Ok(ApiClient::new(session)?)
    }

    /// Logs in as the administrator and returns the admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if the password cannot be read or is rejected.
    pub fn admin_token(&self, client: &ApiClient) -> anyhow::Result<String> {
        let password = match &self.admin_password {
            Some(password) => password.clone(),
            None => crate::prompt::read_password("Admin password: ")?,
        };
        Ok(client.login(ADMIN_USER, &password)?)
    }
}

/// Config and credential files for command tests, logged in as `alice`.
#[cfg(test)]
pub(crate) struct TestState {
    _dir: tempfile::TempDir,
    config: PathBuf,
    pub(crate) credentials: CredentialCache,
}

#[cfg(test)]
impl TestState {
    pub(crate) fn logged_in(token: &str) -> Self {
        use stackctl_client::credentials::Credentials;

        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("config.json");
        let credentials = CredentialCache::new(dir.path().join("credentials.json"));
        let settings = StackctlConfig {
            credentials_file: credentials.path().to_path_buf(),
            ..StackctlConfig::default()
        };
        std::fs::write(&config, serde_json::to_string(&settings).expect("serialize"))
            .expect("write config");
        credentials
            .save(&Credentials::new("alice", token))
            .expect("save credentials");
        Self {
            _dir: dir,
            config,
            credentials,
        }
    }

    /// Runs `stackctl --config <state> --server <server> <args>`.
    pub(crate) fn run(&self, server: &str, args: &[&str]) -> anyhow::Result<()> {
        let config = self.config.to_str().expect("utf8");
        let mut argv = vec!["stackctl", "--config", config, "--server", server];
        argv.extend_from_slice(args);
        execute(Cli::try_parse_from(argv).expect("parse"))
    }
}
