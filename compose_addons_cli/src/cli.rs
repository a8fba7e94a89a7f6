//! Command-line interface definitions for `compose-addons`.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::settings::FetchOverrides;

/// Parsed CLI arguments for `compose-addons`.
#[derive(Debug, Parser)]
#[command(name = "compose-addons")]
#[command(about = "Include, merge and namespace compose configuration")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (repeat for more detail).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Transformation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Transformations offered by the command.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve `include` directives into a single configuration.
    Include(IncludeArgs),
    /// Merge override files onto a base configuration.
    Merge(MergeArgs),
    /// Namespace services so the configuration can be included elsewhere.
    Namespace(NamespaceArgs),
}

/// Where to write the result.
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output filename, defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,
}

/// Arguments of `compose-addons include`.
#[derive(Debug, Clone, Args)]
pub struct IncludeArgs {
    /// Configuration with includes; reads stdin when omitted or `-`.
    #[arg(value_name = "COMPOSE_FILE")]
    pub compose_file: Option<Utf8PathBuf>,
    /// Output destination.
    #[command(flatten)]
    pub output: OutputArgs,
    /// Network fetch settings.
    #[command(flatten)]
    pub fetch: FetchArgs,
}

/// Settings for fetching remote includes.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// TOML file with fetch settings.
    #[arg(long = "config", value_name = "PATH")]
    pub settings_path: Option<Utf8PathBuf>,
    /// Timeout used when making network calls, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
    /// Skip TLS certificate verification.
    #[arg(long = "insecure")]
    pub is_insecure: bool,
    /// PEM file with a client certificate and private key.
    #[arg(long = "client-cert", value_name = "PATH")]
    pub client_certificate: Option<Utf8PathBuf>,
    /// Proxy for a scheme (`http`, `https` or `all`), as `SCHEME=URL`.
    #[arg(long = "proxy", value_name = "SCHEME=URL", value_parser = parse_proxy)]
    pub proxies: Vec<(String, String)>,
    /// Ignore `HTTP_PROXY` and related environment variables.
    #[arg(long = "no-proxy-env")]
    pub should_ignore_proxy_env: bool,
    /// Base URL of an S3-compatible endpoint for `s3://` includes.
    #[arg(long, value_name = "URL")]
    pub s3_endpoint: Option<String>,
    /// Region of the buckets named by `s3://` includes.
    #[arg(long, value_name = "REGION")]
    pub s3_region: Option<String>,
    /// Read `s3://` includes without AWS credentials.
    #[arg(long = "s3-anonymous")]
    pub is_s3_anonymous: bool,
}

impl FetchArgs {
    /// Settings given explicitly on the command line.
    #[must_use]
    pub fn overrides(&self) -> FetchOverrides {
        FetchOverrides {
            timeout: self.timeout,
            verify_tls: self.is_insecure.then_some(false),
            client_certificate: self.client_certificate.clone(),
            proxies: self.proxies.iter().cloned().collect::<BTreeMap<_, _>>(),
            trust_env: self.should_ignore_proxy_env.then_some(false),
            s3_endpoint: self.s3_endpoint.clone(),
            s3_region: self.s3_region.clone(),
            s3_anonymous: self.is_s3_anonymous.then_some(true),
        }
    }
}

/// Arguments of `compose-addons merge`.
#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
    /// Base configuration file.
    #[arg(value_name = "BASE")]
    pub base: Utf8PathBuf,
    /// Files to merge onto the base, in order.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<Utf8PathBuf>,
    /// Output destination.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments of `compose-addons namespace`.
#[derive(Debug, Clone, Args)]
pub struct NamespaceArgs {
    /// Configuration to namespace; `-` reads stdin.
    #[arg(value_name = "COMPOSE_FILE")]
    pub compose_file: Utf8PathBuf,
    /// Namespace to add to all service names.
    #[arg(value_name = "NAMESPACE")]
    pub namespace: String,
    /// Output destination.
    #[command(flatten)]
    pub output: OutputArgs,
}

fn parse_proxy(value: &str) -> Result<(String, String), String> {
    let (scheme, url) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SCHEME=URL, got '{value}'"))?;
    let scheme = scheme.trim().to_ascii_lowercase();
    if !matches!(scheme.as_str(), "http" | "https" | "all") {
        return Err(format!(
            "unsupported proxy scheme '{scheme}': expected 'http', 'https' or 'all'"
        ));
    }
    Ok((scheme, url.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("compose-addons").chain(args.iter().copied()))
            .expect("parse")
    }

    #[test]
    fn include_flags_become_overrides() {
        let cli = parse(&[
            "include",
            "compose.yml",
            "--timeout",
            "3",
            "--insecure",
            "--proxy",
            "HTTPS=http://proxy:3128",
            "--no-proxy-env",
            "--s3-region",
            "eu-central-1",
            "--s3-anonymous",
        ]);
        let Command::Include(args) = cli.command else {
            panic!("expected include");
        };
        assert_eq!(args.compose_file.as_deref().map(|p| p.as_str()), Some("compose.yml"));
        let overrides = args.fetch.overrides();
        assert_eq!(overrides.timeout, Some(3));
        assert_eq!(overrides.verify_tls, Some(false));
        assert_eq!(overrides.trust_env, Some(false));
        assert_eq!(overrides.s3_region.as_deref(), Some("eu-central-1"));
        assert_eq!(overrides.s3_anonymous, Some(true));
        assert_eq!(
            overrides.proxies.get("https").map(String::as_str),
            Some("http://proxy:3128")
        );
    }

    #[test]
    fn absent_flags_leave_overrides_empty() {
        let Command::Include(args) = parse(&["include"]).command else {
            panic!("expected include");
        };
        assert!(args.compose_file.is_none());
        assert_eq!(args.fetch.overrides(), FetchOverrides::default());
    }

    #[rstest]
    #[case("http")]
    #[case("socks=socks5://proxy")]
    fn bad_proxies_are_rejected(#[case] proxy: &str) {
        let result = Cli::try_parse_from(["compose-addons", "include", "--proxy", proxy]);
        assert!(result.is_err());
    }

    #[test]
    fn merge_requires_an_override() {
        assert!(Cli::try_parse_from(["compose-addons", "merge", "base.yml"]).is_err());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = parse(&["namespace", "compose.yml", "svc", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
