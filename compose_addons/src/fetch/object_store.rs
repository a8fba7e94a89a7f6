//! Object-storage backend.
//!
//! The [`ObjectStore`] trait is the seam through which buckets are read; the
//! [`Fetcher`](super::Fetcher) only talks to object storage when a store has
//! been injected.

use std::error::Error;
use std::sync::OnceLock;

use aws_config::meta::region::RegionProviderChain;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use tokio::runtime::Runtime;
use tracing::debug;

use super::FetchOptions;

/// Error type reported by [`ObjectStore`] implementations.
pub type StoreError = Box<dyn Error + Send + Sync>;

/// Region used when neither the options nor the environment name one.
const FALLBACK_REGION: &str = "us-east-1";

/// Read access to objects addressed by bucket and key.
pub trait ObjectStore: Send + Sync {
    /// Fetch the bytes of `key` in `bucket`.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns any error raised while reaching the bucket or reading the
    /// object.
    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// An [`ObjectStore`] backed by the AWS S3 SDK.
///
/// Credentials come from the standard AWS chain (environment, shared
/// profile files, web identity, instance metadata) unless
/// [`FetchOptions::s3_anonymous`] asks for unsigned requests. Setting
/// [`FetchOptions::s3_endpoint`] targets an S3-compatible service with
/// path-style addressing. The SDK brings its own HTTP stack, so the proxy,
/// TLS and client certificate options do not apply here.
pub struct S3ObjectStore {
    options: FetchOptions,
    connection: OnceLock<Connection>,
}

struct Connection {
    runtime: Runtime,
    client: Client,
}

impl S3ObjectStore {
    /// Construct a store configured from `options`.
    ///
    /// Nothing is resolved until the first object is requested.
    #[must_use]
    pub const fn new(options: FetchOptions) -> Self {
        Self {
            options,
            connection: OnceLock::new(),
        }
    }

    fn connection(&self) -> Result<&Connection, StoreError> {
        if let Some(connection) = self.connection.get() {
            return Ok(connection);
        }
        let built = connect(&self.options)?;
        Ok(self.connection.get_or_init(|| built))
    }
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("options", &self.options)
            .field("connected", &self.connection.get().is_some())
            .finish()
    }
}

fn connect(options: &FetchOptions) -> Result<Connection, StoreError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let client = runtime.block_on(build_client(options));
    Ok(Connection { runtime, client })
}

async fn build_client(options: &FetchOptions) -> Client {
    let region = RegionProviderChain::first_try(options.s3_region.clone().map(Region::new))
        .or_default_provider()
        .or_else(Region::new(FALLBACK_REGION));
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(options.timeout())
        .build();
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .timeout_config(timeouts);
    if options.s3_anonymous {
        loader = loader.no_credentials();
    }
    let shared = loader.load().await;
    let mut config = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = &options.s3_endpoint {
        config = config.endpoint_url(endpoint).force_path_style(true);
    }
    debug!(region = ?shared.region(), endpoint = ?options.s3_endpoint, "s3 client ready");
    Client::from_conf(config.build())
}

fn is_missing(err: &SdkError<GetObjectError, HttpResponse>) -> bool {
    err.as_service_error()
        .is_some_and(GetObjectError::is_no_such_key)
        || err
            .raw_response()
            .is_some_and(|response| response.status().as_u16() == 404)
}

async fn read_object(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<Vec<u8>>, StoreError> {
    let output = match client.get_object().bucket(bucket).key(key).send().await {
        Ok(output) => output,
        Err(err) if is_missing(&err) => return Ok(None),
        Err(err) => return Err(DisplayErrorContext(&err).to_string().into()),
    };
    let body = output.body.collect().await?;
    Ok(Some(body.into_bytes().to_vec()))
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let Connection { runtime, client } = self.connection()?;
        runtime.block_on(read_object(client, bucket, key))
    }
}
