//! `stackctl delete` — Remove stacks, volumes, accounts, and services.

use anyhow::Context as _;
use clap::{Args, Subcommand};
use stackctl_common::constants::SYSTEM_CATALOG;
use stackctl_common::types::{ServiceKey, StackId};

use super::Context;

/// Resources that can be deleted.
#[derive(Subcommand, Debug)]
pub enum DeleteCommand {
    /// Remove a stack.
    Stack(DeleteStackArgs),
    /// Remove a volume.
    Volume(DeleteVolumeArgs),
    /// Remove an account (admin users only).
    Account(DeleteAccountArgs),
    /// Remove a service from a catalog.
    Service(DeleteServiceArgs),
}

/// Arguments for `delete stack`.
#[derive(Args, Debug)]
pub struct DeleteStackArgs {
    /// Stack ID.
    pub stack: String,
}

/// Arguments for `delete volume`.
#[derive(Args, Debug)]
pub struct DeleteVolumeArgs {
    /// Volume ID.
    pub volume: String,
}

/// Arguments for `delete account`.
#[derive(Args, Debug)]
pub struct DeleteAccountArgs {
    /// Account (project) ID.
    pub account: String,
}

/// Arguments for `delete service`.
#[derive(Args, Debug)]
pub struct DeleteServiceArgs {
    /// Service key.
    pub service: String,

    /// Catalog to delete from; `system` requires the admin password.
    #[arg(short, long)]
    pub catalog: Option<String>,
}

/// Executes a `delete` subcommand.
///
/// # Errors
///
/// Returns an error if the resource cannot be deleted.
pub fn execute(ctx: &Context, cmd: DeleteCommand) -> anyhow::Result<()> {
    match cmd {
        DeleteCommand::Stack(args) => {
            let client = ctx.client()?;
            client
                .delete_stack(&StackId::new(&args.stack))
                .with_context(|| format!("unable to delete stack {}", args.stack))?;
            println!("Stack {} deleted", args.stack);
        }
        DeleteCommand::Volume(args) => {
            let client = ctx.client()?;
            client
                .delete_volume(&args.volume)
                .with_context(|| format!("unable to delete volume {}", args.volume))?;
            println!("Volume {} deleted", args.volume);
        }
        DeleteCommand::Account(args) => {
            let client = ctx.anonymous_client()?;
            let token = ctx.admin_token(&client)?;
            client
                .delete_account(&args.account, &token)
                .with_context(|| format!("unable to delete account {}", args.account))?;
            println!("Account {} deleted", args.account);
        }
        DeleteCommand::Service(args) => delete_service(ctx, &args)?,
    }
    Ok(())
}

fn delete_service(ctx: &Context, args: &DeleteServiceArgs) -> anyhow::Result<()> {
    let catalog = args
        .catalog
        .as_deref()
        .unwrap_or(&ctx.config.default_catalog);
    let key = ServiceKey::parse(&args.service)?;

    let (client, token) = if catalog == SYSTEM_CATALOG {
        let client = ctx.anonymous_client()?;
        let token = ctx.admin_token(&client)?;
        (client, token)
    } else {
        let client = ctx.client()?;
        let token = client
            .session()
            .token()
            .map(str::to_string)
            .ok_or(stackctl_common::error::StackctlError::NotAuthenticated)?;
        (client, token)
    };

    tracing::info!(service = %key, catalog, "deleting service");
    client
        .delete_service(&key, &token, catalog)
        .with_context(|| format!("unable to delete service {key}"))?;
    println!("Service {key} deleted");
    Ok(())
}
