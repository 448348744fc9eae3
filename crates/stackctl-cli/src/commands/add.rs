//! `stackctl add` — Create stacks, projects, services, and volumes.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Subcommand};
use stackctl_client::models::{Project, Volume};
use stackctl_common::constants::VOLUME_SIZE_UNIT;
use stackctl_common::types::{ServiceKey, StackServiceId};
use stackctl_compose::catalog::{
    DefinitionFile, definition_paths, is_definition_file, load_definition_file,
};
use stackctl_compose::resolver::{OptionalSelection, resolve};
use stackctl_compose::submission::StackSubmission;

use super::Context;

/// Resources that can be added.
#[derive(Subcommand, Debug)]
pub enum AddCommand {
    /// Compose and create a stack in your project.
    Stack(AddStackArgs),
    /// Create a project (admin users only).
    Project(AddProjectArgs),
    /// Register service definitions (admin users only).
    Service(AddServiceArgs),
    /// Create a volume.
    Volume(AddVolumeArgs),
}

/// Arguments for `add stack`.
#[derive(Args, Debug)]
pub struct AddStackArgs {
    /// Catalog key of the service the stack is built around.
    pub service_key: String,

    /// Name of the new stack.
    pub name: String,

    /// Comma-delimited list of optional services to include.
    #[arg(long, default_value = "")]
    pub opt: String,
}

/// Arguments for `add project`.
#[derive(Args, Debug)]
pub struct AddProjectArgs {
    /// Project name (used as id and namespace).
    #[arg(requires = "password", conflicts_with = "file")]
    pub name: Option<String>,

    /// Project password.
    pub password: Option<String>,

    /// Path to a project definition (JSON).
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for `add service`.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct AddServiceArgs {
    /// Path to a service definition (JSON).
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Directory of service definitions, searched recursively.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Arguments for `add volume`.
#[derive(Args, Debug)]
pub struct AddVolumeArgs {
    /// Volume name.
    pub name: String,

    /// Size in GB.
    pub size: u32,

    /// Stack service ID to attach the volume to.
    pub stack_service_id: Option<String>,
}

/// Executes an `add` subcommand.
///
/// # Errors
///
/// Returns an error if the resource cannot be created.
pub fn execute(ctx: &Context, cmd: AddCommand) -> anyhow::Result<()> {
    match cmd {
        AddCommand::Stack(args) => add_stack(ctx, &args),
        AddCommand::Project(args) => add_project(ctx, args),
        AddCommand::Service(args) => add_service(ctx, args),
        AddCommand::Volume(args) => add_volume(ctx, args),
    }
}

fn add_stack(ctx: &Context, args: &AddStackArgs) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let project = client.session().project()?;
    let root = ServiceKey::parse(&args.service_key)?;
    let optional = OptionalSelection::parse(&args.opt);

    let composition = resolve(&root, &optional, &args.name, &client)
        .with_context(|| format!("cannot compose stack {}", args.name))?;
    let stack = client
        .submit(&project, composition)
        .with_context(|| format!("error adding stack {}", args.name))?;

    println!("Added stack {}", stack.id);
    print!("{}", crate::output::stack_table(&stack));
    Ok(())
}

fn add_project(ctx: &Context, args: AddProjectArgs) -> anyhow::Result<()> {
    let project = match (args.file, args.name, args.password) {
        (Some(path), _, _) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("error reading project file {}", path.display()))?;
            serde_json::from_str::<Project>(&content)
                .with_context(|| format!("invalid project file {}", path.display()))?
        }
        (None, Some(name), Some(password)) => Project::named(&name, &password),
        _ => anyhow::bail!("specify a project name and password, or --file"),
    };

    let client = ctx.anonymous_client()?;
    let token = ctx.admin_token(&client)?;
    client
        .add_project(&project, &token)
        .with_context(|| format!("unable to add project {}", project.id))?;
    println!("Added project {}", project.id);
    Ok(())
}

fn add_service(ctx: &Context, args: AddServiceArgs) -> anyhow::Result<()> {
    let paths = match (args.file, args.dir) {
        (Some(path), _) => {
            if !is_definition_file(&path) {
                anyhow::bail!("expecting extension .json: {}", path.display());
            }
            vec![path]
        }
        (None, Some(dir)) => definition_paths(&dir)?,
        (None, None) => anyhow::bail!("specify --file or --dir"),
    };
    let total = paths.iter().filter(|path| is_definition_file(path)).count();
    if total == 0 {
        anyhow::bail!("no service definitions found");
    }

    let client = ctx.anonymous_client()?;
    let token = ctx.admin_token(&client)?;
    let failed = register_services(&paths, |file| {
        client.add_service(&file.raw, &token).map(|_| ())
    });

    if failed > 0 {
        anyhow::bail!("{failed} of {total} service(s) could not be added");
    }
    Ok(())
}

/// Loads and registers each definition file, reporting per file, and returns
/// the number of files that could not be parsed or registered.
fn register_services<F>(paths: &[PathBuf], mut register: F) -> usize
where
    F: FnMut(&DefinitionFile) -> stackctl_common::error::Result<()>,
{
    let mut failed = 0;
    for path in paths {
        let file = match load_definition_file(path) {
            Ok(Some(file)) => file,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid service definition");
                println!("Unable to add service {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        let label = file.definition.display_name();
        match register(&file) {
            Ok(()) => println!("Added service {label}"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "service registration failed");
                println!("Unable to add service {label}: {e}");
                failed += 1;
            }
        }
    }
    failed
}

fn add_volume(ctx: &Context, args: AddVolumeArgs) -> anyhow::Result<()> {
    let attached = args
        .stack_service_id
        .as_deref()
        .map(StackServiceId::parse)
        .transpose()?
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();

    let volume = Volume {
        name: args.name,
        size: args.size,
        size_unit: VOLUME_SIZE_UNIT.to_string(),
        attached,
        ..Volume::default()
    };

    let client = ctx.client()?;
    let created = client
        .add_volume(&volume)
        .with_context(|| format!("error creating volume {}", volume.name))?;
    println!("Created volume {}", created.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use stackctl_common::error::StackctlError;

    use super::super::{Cli, Command, TestState};
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).expect("write");
        path
    }

    #[test]
    fn register_services_skips_unparsable_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = vec![
            write(dir.path(), "a.json", r#"{"key": "a"}"#),
            write(dir.path(), "bad.json", "{"),
            write(dir.path(), "c.json", r#"{"key": "c"}"#),
        ];

        let mut registered = Vec::new();
        let failed = register_services(&paths, |file| {
            registered.push(file.definition.key.to_string());
            Ok(())
        });
        assert_eq!(failed, 1);
        assert_eq!(registered, vec!["a", "c"]);
    }

    #[test]
    fn register_services_continues_after_rejection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|key| write(dir.path(), &format!("{key}.json"), &format!(r#"{{"key": "{key}"}}"#)))
            .collect();

        let mut seen = Vec::new();
        let failed = register_services(&paths, |file| {
            seen.push(file.definition.key.to_string());
            if file.definition.key.as_str() == "b" {
                Err(StackctlError::Api {
                    status: 409,
                    message: "exists".into(),
                })
            } else {
                Ok(())
            }
        });
        assert_eq!(failed, 1);
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn add_service_dir_registers_every_valid_file() {
        let defs = tempfile::tempdir().expect("tempdir");
        let nested = defs.path().join("nested");
        std::fs::create_dir_all(&nested).expect("mkdir");
        let _ = write(defs.path(), "a.json", r#"{"key": "a"}"#);
        let _ = write(defs.path(), "bad.json", "{");
        let _ = write(&nested, "c.json", r#"{"key": "c", "image": "org/c"}"#);
        let _ = write(defs.path(), "notes.txt", "ignored");

        let mut server = Server::new();
        let login = server
            .mock("POST", "/authenticate")
            .match_body(Matcher::PartialJson(json!({"username": "admin", "password": "pw"})))
            .with_body(r#"{"token": "admin-tok"}"#)
            .create();
        let a = server
            .mock("POST", "/services")
            .match_header("authorization", "Bearer admin-tok")
            .match_body(Matcher::Json(json!({"key": "a"})))
            .with_body(r#"{"key": "a"}"#)
            .create();
        let c = server
            .mock("POST", "/services")
            .match_header("authorization", "Bearer admin-tok")
            .match_body(Matcher::Json(json!({"key": "c", "image": "org/c"})))
            .with_body(r#"{"key": "c"}"#)
            .create();

        let state = TestState::logged_in("tok-123");
        let dir = defs.path().to_str().expect("utf8");
        let err = state
            .run(&server.url(), &["--admin-password", "pw", "add", "service", "--dir", dir])
            .expect_err("one file is invalid");
        assert!(err.to_string().contains("1 of 3 service(s)"), "{err}");
        login.assert();
        a.assert();
        c.assert();
    }

    #[test]
    fn add_stack_resolves_then_submits() {
        let mut server = Server::new();
        let _web = server
            .mock("GET", "/services/web")
            .with_body(
                r#"{"key": "web", "depends": [
                    {"key": "db", "required": true},
                    {"key": "cache", "required": false}
                ]}"#,
            )
            .create();
        let _db = server.mock("GET", "/services/db").with_body(r#"{"key": "db"}"#).create();
        let _cache = server
            .mock("GET", "/services/cache")
            .with_body(r#"{"key": "cache"}"#)
            .create();
        let submit = server
            .mock("POST", "/projects/alice/stacks")
            .match_header("authorization", "Bearer tok-123")
            .match_body(Matcher::Json(json!({
                "key": "web",
                "name": "blog",
                "services": [{"service": "web"}, {"service": "db"}, {"service": "cache"}]
            })))
            .with_body(
                r#"{"id": "alice-s1", "key": "web", "name": "blog", "services": [
                    {"id": "alice-s1-web", "service": "web"},
                    {"id": "alice-s1-db", "service": "db"},
                    {"id": "alice-s1-cache", "service": "cache"}
                ]}"#,
            )
            .create();

        let state = TestState::logged_in("tok-123");
        state
            .run(&server.url(), &["add", "stack", "web", "blog", "--opt", "cache"])
            .expect("add stack");
        submit.assert();
    }

    #[test]
    fn add_stack_with_unknown_optional_dependency_fails_before_submit() {
        let mut server = Server::new();
        let _web = server
            .mock("GET", "/services/web")
            .with_body(r#"{"key": "web", "depends": [{"key": "cache"}]}"#)
            .create();
        let _cache = server.mock("GET", "/services/cache").with_status(404).create();
        let submit = server.mock("POST", "/projects/alice/stacks").expect(0).create();

        let state = TestState::logged_in("tok-123");
        let err = state
            .run(&server.url(), &["add", "stack", "web", "blog", "--opt", "cache"])
            .expect_err("unknown dependency");
        assert!(format!("{err:#}").contains("unknown service: cache"), "{err:#}");
        submit.assert();
    }

    #[test]
    fn add_service_requires_a_source() {
        assert!(Cli::try_parse_from(["stackctl", "add", "service"]).is_err());
        assert!(Cli::try_parse_from(["stackctl", "add", "service", "--dir", "defs"]).is_ok());
    }

    #[test]
    fn add_project_needs_password_with_name() {
        assert!(Cli::try_parse_from(["stackctl", "add", "project", "lab"]).is_err());
        assert!(Cli::try_parse_from(["stackctl", "add", "project", "lab", "pw"]).is_ok());
    }

    #[test]
    fn volume_rejects_stack_id_as_attachment() {
        let cli = Cli::try_parse_from(["stackctl", "add", "volume", "data", "10", "abc123"])
            .expect("parse");
        let Command::Add(AddCommand::Volume(args)) = cli.command else {
            panic!("expected add volume");
        };
        let err = args
            .stack_service_id
            .as_deref()
            .map(StackServiceId::parse)
            .transpose()
            .expect_err("stack id");
        assert!(err.to_string().contains("looks like a stack id"));
    }
}
