//! Settings that control the network backends.

use std::collections::BTreeMap;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default network timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Options applied to HTTP(S) and object-storage fetches.
///
/// Local file fetches ignore every field. The `s3_*` fields apply only to
/// object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Per-request timeout, in seconds.
    pub timeout: u64,
    /// Verify the server's TLS certificate.
    pub verify_tls: bool,
    /// PEM bundle holding a client certificate and its private key.
    pub client_certificate: Option<Utf8PathBuf>,
    /// Proxy URLs keyed by `http`, `https` or `all`.
    pub proxies: BTreeMap<String, String>,
    /// Honour the `HTTP_PROXY` family of environment variables.
    pub trust_env: bool,
    /// Base URL of an S3-compatible endpoint, addressed path-style.
    pub s3_endpoint: Option<String>,
    /// Region for object storage; the AWS environment is consulted when unset.
    pub s3_region: Option<String>,
    /// Send unsigned object-storage requests instead of using AWS credentials.
    pub s3_anonymous: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
            client_certificate: None,
            proxies: BTreeMap::new(),
            trust_env: true,
            s3_endpoint: None,
            s3_region: None,
            s3_anonymous: false,
        }
    }
}

impl FetchOptions {
    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
