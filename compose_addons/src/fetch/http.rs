//! HTTP(S) backend built on a blocking `reqwest` client.

use std::sync::OnceLock;

use reqwest::blocking::Client;
use reqwest::{Identity, Proxy};

use super::{FetchOptions, StoreError};

/// A client configured from [`FetchOptions`], built on first use so that
/// purely local resolutions never touch TLS or proxy settings.
#[derive(Debug)]
pub(super) struct LazyClient {
    options: FetchOptions,
    client: OnceLock<Client>,
}

impl LazyClient {
    pub(super) const fn new(options: FetchOptions) -> Self {
        Self {
            options,
            client: OnceLock::new(),
        }
    }

    pub(super) const fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub(super) fn get(&self) -> Result<&Client, StoreError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = build_client(&self.options)?;
        Ok(self.client.get_or_init(|| built))
    }
}

fn proxy_for(scheme: &str, url: &str) -> Result<Proxy, StoreError> {
    let proxy = match scheme {
        "http" => Proxy::http(url)?,
        "https" => Proxy::https(url)?,
        "all" => Proxy::all(url)?,
        other => {
            return Err(format!(
                "unsupported proxy scheme '{other}': expected 'http', 'https' or 'all'"
            )
            .into());
        }
    };
    Ok(proxy)
}

fn build_client(options: &FetchOptions) -> Result<Client, StoreError> {
    let mut builder = Client::builder()
        .timeout(options.timeout())
        .danger_accept_invalid_certs(!options.verify_tls);
    if !options.trust_env {
        builder = builder.no_proxy();
    }
    for (scheme, url) in &options.proxies {
        builder = builder.proxy(proxy_for(scheme, url)?);
    }
    if let Some(path) = &options.client_certificate {
        let pem = std::fs::read(path)
            .map_err(|err| format!("cannot read client certificate '{path}': {err}"))?;
        builder = builder.identity(Identity::from_pem(&pem)?);
    }
    Ok(builder.build()?)
}

/// Fetch the body at `url`; any status of 400 or above is an error.
pub(super) fn get(client: &Client, url: &str) -> Result<Vec<u8>, StoreError> {
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}
