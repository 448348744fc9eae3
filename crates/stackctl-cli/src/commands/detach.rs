//! `stackctl detach` — Detach a volume from its stack service.

use anyhow::Context as _;
use clap::Args;

/// Arguments for the `detach` command.
#[derive(Args, Debug)]
pub struct DetachArgs {
    /// Volume ID.
    pub volume: String,
}

/// Executes the `detach` command.
///
/// Clears the volume's attachment, then exchanges the cached token for a
/// fresh one so an active user stays logged in.
///
/// # Errors
///
/// Returns an error if the volume cannot be fetched or updated.
pub fn execute(ctx: &super::Context, args: DetachArgs) -> anyhow::Result<()> {
    let client = ctx.client()?;

    let mut volume = client.get_volume(&args.volume).context("detach failed")?;
    if !volume.is_attached() {
        tracing::info!(volume = %volume.id, "volume is not attached");
    }
    volume.attached.clear();
    let updated = client.update_volume(&volume).context("detach failed")?;
    println!("Detached volume {}", updated.id);

    match client.refresh_token() {
        Ok(token) => {
            let _ = ctx.credentials.update_token(token)?;
        }
        Err(e) => tracing::warn!(error = %e, "could not refresh token"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::super::TestState;

    #[test]
    fn detach_clears_attachment_and_refreshes_cached_token() {
        let mut server = Server::new();
        let get = server
            .mock("GET", "/projects/alice/volumes/v1")
            .match_header("authorization", "Bearer tok-123")
            .with_body(r#"{"id": "v1", "name": "data", "size": 10, "sizeUnit": "GB", "attached": "alice-s1-db"}"#)
            .create();
        let put = server
            .mock("PUT", "/projects/alice/volumes/v1")
            .match_body(Matcher::PartialJson(json!({"id": "v1", "attached": ""})))
            .with_body(r#"{"id": "v1", "name": "data", "size": 10, "sizeUnit": "GB", "attached": ""}"#)
            .create();
        let refresh = server
            .mock("GET", "/refresh_token")
            .match_header("authorization", "Bearer tok-123")
            .with_body(r#"{"token": "tok-456"}"#)
            .create();

        let state = TestState::logged_in("tok-123");
        state.run(&server.url(), &["detach", "v1"]).expect("detach");

        get.assert();
        put.assert();
        refresh.assert();
        let cached = state.credentials.load().expect("credentials");
        assert_eq!(cached.username, "alice");
        assert_eq!(cached.token, "tok-456");
    }

    #[test]
    fn failed_refresh_keeps_cached_token() {
        let mut server = Server::new();
        let _get = server
            .mock("GET", "/projects/alice/volumes/v1")
            .with_body(r#"{"id": "v1", "name": "data", "size": 10, "sizeUnit": "GB", "attached": ""}"#)
            .create();
        let _put = server
            .mock("PUT", "/projects/alice/volumes/v1")
            .with_body(r#"{"id": "v1", "name": "data", "size": 10, "sizeUnit": "GB", "attached": ""}"#)
            .create();
        let _refresh = server.mock("GET", "/refresh_token").with_status(401).create();

        let state = TestState::logged_in("tok-123");
        state.run(&server.url(), &["detach", "v1"]).expect("detach");

        let cached = state.credentials.load().expect("credentials");
        assert_eq!(cached.token, "tok-123");
    }
}
