//! `stackctl plan` — Show the services a stack would contain.

use std::path::PathBuf;

use clap::Args;
use stackctl_common::types::ServiceKey;
use stackctl_compose::catalog::{CatalogLookup, InMemoryCatalog};
use stackctl_compose::graph::DependencyGraph;
use stackctl_compose::resolver::{OptionalSelection, StackComposition, resolve};

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Catalog key of the service the stack is built around.
    pub service_key: String,

    /// Comma-delimited list of optional services to include.
    #[arg(long, default_value = "")]
    pub opt: String,

    /// Stack name to show in the plan (defaults to the service key).
    #[arg(long)]
    pub name: Option<String>,

    /// Resolve against service definitions in this directory instead of the server.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Print the composition as the JSON body that `add stack` would submit.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `plan` command.
///
/// Resolves the composition without submitting it, then derives a
/// dependencies-first startup order from the members' required edges.
///
/// # Errors
///
/// Returns an error if the catalog cannot be reached or a service is unknown.
pub fn execute(ctx: &super::Context, args: PlanArgs) -> anyhow::Result<()> {
    let catalog: Box<dyn CatalogLookup> = match &args.dir {
        Some(dir) => Box::new(InMemoryCatalog::load_dir(dir)?),
        None => Box::new(ctx.client().or_else(|e| {
            tracing::debug!(error = %e, "planning without cached credentials");
            ctx.anonymous_client()
        })?),
    };

    let root = ServiceKey::parse(&args.service_key)?;
    let optional = OptionalSelection::parse(&args.opt);
    let name = args.name.as_deref().unwrap_or(root.as_str());
    let composition = resolve(&root, &optional, name, catalog.as_ref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&composition)?);
        return Ok(());
    }
    print_plan(&composition, catalog.as_ref());
    Ok(())
}

fn print_plan(composition: &StackComposition, catalog: &dyn CatalogLookup) {
    println!("Stack plan for: {} ({})", composition.name, composition.root_key);
    println!();
    print!("{}", crate::output::composition_list(composition));
    println!();
    println!("  {} service(s) will be created.", composition.members.len());

    let order = DependencyGraph::from_composition(composition, catalog)
        .and_then(|graph| graph.startup_order());
    match order {
        Ok(order) => {
            let keys: Vec<_> = order.iter().map(ServiceKey::as_str).collect();
            println!("  Startup order: {}", keys.join(" -> "));
        }
        Err(e) => {
            tracing::warn!(error = %e, "no startup order");
            println!("  Startup order: unavailable ({e})");
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::super::{Cli, execute as dispatch};

    fn write_catalog(dir: &std::path::Path) {
        std::fs::write(
            dir.join("web.json"),
            r#"{"key": "web", "depends": [{"key": "db", "required": true}, {"key": "cache"}]}"#,
        )
        .expect("write");
        std::fs::write(dir.join("db.json"), r#"{"key": "db"}"#).expect("write");
        std::fs::write(dir.join("cache.json"), r#"{"key": "cache"}"#).expect("write");
    }

    fn run(args: &[&str]) -> anyhow::Result<()> {
        let state = tempfile::tempdir().expect("tempdir");
        let config = state.path().join("config.json");
        let mut argv = vec!["stackctl", "--config", config.to_str().expect("utf8")];
        argv.extend_from_slice(args);
        dispatch(Cli::try_parse_from(argv).expect("parse"))
    }

    #[test]
    fn plans_against_local_definitions() {
        let defs = tempfile::tempdir().expect("tempdir");
        write_catalog(defs.path());
        let dir = defs.path().to_str().expect("utf8");

        run(&["plan", "web", "--opt", "cache", "--dir", dir]).expect("plan");
        run(&["plan", "web", "--dir", dir, "--json"]).expect("plan json");
    }

    #[test]
    fn plan_reports_unknown_service() {
        let defs = tempfile::tempdir().expect("tempdir");
        write_catalog(defs.path());
        let dir = defs.path().to_str().expect("utf8");

        let err = run(&["plan", "ghost", "--dir", dir]).expect_err("unknown");
        assert!(err.to_string().contains("unknown service: ghost"), "{err}");
    }
}
