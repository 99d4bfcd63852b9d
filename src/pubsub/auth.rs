//! Access token resolution for the Pub/Sub REST API.
//!
//! An explicit token via `CLOUDSDK_AUTH_ACCESS_TOKEN` wins, otherwise the
//! gcloud CLI is asked for one, matching the ambient-credential workflow of
//! an operator shell. Emulator runs need no credentials at all.

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable the gcloud SDK itself honors for a pre-issued token.
pub const TOKEN_ENV: &str = "CLOUDSDK_AUTH_ACCESS_TOKEN";
/// Standard emulator override honored by Pub/Sub client libraries.
pub const EMULATOR_ENV: &str = "PUBSUB_EMULATOR_HOST";

/// Where bearer tokens come from.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Token handed in via the environment.
    Static(String),
    /// Ask the gcloud CLI for a token.
    GcloudCli,
    /// Emulator mode: no Authorization header at all.
    None,
}

impl Credentials {
    /// Pick a credential source from the environment.
    pub fn from_env() -> Self {
        if std::env::var_os(EMULATOR_ENV).is_some() {
            return Self::None;
        }
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Self::Static(token.trim().to_string()),
            _ => Self::GcloudCli,
        }
    }

    /// Resolve a bearer token, if this source issues one.
    pub async fn access_token(&self) -> Result<Option<String>> {
        match self {
            Self::Static(token) => Ok(Some(token.clone())),
            Self::GcloudCli => gcloud_access_token().await.map(Some),
            Self::None => Ok(None),
        }
    }
}

/// Shell out to `gcloud auth print-access-token`.
async fn gcloud_access_token() -> Result<String> {
    let output = Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .await
        .map_err(|e| Error::Auth(format!("Failed to run gcloud: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Auth(format!(
            "gcloud auth print-access-token failed: {}",
            stderr.trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(Error::Auth(
            "gcloud returned an empty access token".to_string(),
        ));
    }
    debug!("Obtained access token from the gcloud CLI");
    Ok(token)
}
