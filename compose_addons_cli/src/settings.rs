//! Layered fetch settings: defaults, settings file, environment, then flags.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use compose_addons::FetchOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Serialize;

use crate::error::CliError;

/// Prefix of environment variables read as fetch settings.
pub const ENV_PREFIX: &str = "COMPOSE_ADDONS_";

/// Fetch settings supplied on the command line.
///
/// Absent values leave lower layers intact.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOverrides {
    /// Per-request timeout, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Verify server TLS certificates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,
    /// PEM bundle with the client certificate and key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<Utf8PathBuf>,
    /// Proxy URLs keyed by scheme.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub proxies: BTreeMap<String, String>,
    /// Honour proxy environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_env: Option<bool>,
    /// Base URL of an S3-compatible endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_endpoint: Option<String>,
    /// Region for object storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_region: Option<String>,
    /// Send unsigned object-storage requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_anonymous: Option<bool>,
}

/// Assemble [`FetchOptions`] from every layer.
///
/// Precedence, lowest first: built-in defaults, the TOML file at
/// `settings_path`, `COMPOSE_ADDONS_*` environment variables, `overrides`.
/// Nested keys may be set from the environment with `__`, for example
/// `COMPOSE_ADDONS_PROXIES__HTTPS`.
///
/// # Errors
///
/// Returns [`CliError::MissingSettings`] if `settings_path` does not exist and
/// [`CliError::Settings`] if any layer holds an invalid value.
pub fn load_fetch_options(
    settings_path: Option<&Utf8Path>,
    overrides: &FetchOverrides,
) -> Result<FetchOptions, CliError> {
    let mut figment = Figment::from(Serialized::defaults(FetchOptions::default()));
    if let Some(path) = settings_path {
        if !path.is_file() {
            return Err(CliError::MissingSettings(path.to_owned()));
        }
        figment = figment.merge(Toml::file(path));
    }
    let options = figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["log"]).split("__"))
        .merge(Serialized::defaults(overrides))
        .extract()?;
    Ok(options)
}
