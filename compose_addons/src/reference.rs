//! Normalization of URL-like references to included documents.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::{ComposeError, ComposeResult};

/// Backends a reference can be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// A path on the local filesystem.
    File,
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
    /// An object in an S3-compatible bucket.
    S3,
}

impl Scheme {
    /// Returns the canonical, lower-case scheme name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Http => "http",
            Self::Https => "https",
            Self::S3 => "s3",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "file" => Some(Self::File),
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            "s3" => Some(Self::S3),
            _ => None,
        }
    }
}

/// Where the bytes of a referenced document live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Local file, absolute or relative to the working directory.
    LocalFile(PathBuf),
    /// A URL fetched with a `GET` request.
    Http(String),
    /// An object addressed by bucket and key.
    ObjectStorage {
        /// Bucket name, taken from the authority component.
        bucket: String,
        /// Object key, taken from the path without its leading `/`.
        key: String,
    },
}

/// A normalized reference to an includable document.
///
/// Two references are equal when their scheme, authority and path are equal;
/// the spelling supplied by the user is kept only for messages.
///
/// # Examples
///
/// ```
/// use compose_addons::{Reference, Scheme};
///
/// let reference = Reference::parse("./services/api.yml")?;
/// assert_eq!(reference.scheme(), Scheme::File);
/// assert_eq!(reference, Reference::parse("file://./services/api.yml")?);
/// # Ok::<(), compose_addons::ComposeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Reference {
    scheme: Scheme,
    authority: String,
    path: String,
    raw: String,
}

/// Split a leading `scheme:` off `raw`, following generic URL syntax.
fn split_scheme(raw: &str) -> Option<(&str, &str)> {
    let (candidate, rest) = raw.split_once(':')?;
    let mut chars = candidate.chars();
    let first = chars.next()?;
    let is_scheme = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    is_scheme.then_some((candidate, rest))
}

/// Split `//authority/path` into its authority and path components.
fn split_authority(rest: &str) -> (&str, &str) {
    let Some(after) = rest.strip_prefix("//") else {
        return ("", rest);
    };
    let end = after.find(['/', '?', '#']).unwrap_or(after.len());
    after.split_at(end)
}

impl Reference {
    /// Normalize `raw` into a reference with an explicit scheme.
    ///
    /// Strings without a scheme become `file` references that keep their
    /// relative or absolute shape.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnsupportedScheme`] for schemes other than
    /// `file`, `http`, `https` and `s3`, and
    /// [`ComposeError::InvalidReference`] for an empty string.
    pub fn parse(raw: &str) -> ComposeResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ComposeError::InvalidReference {
                reference: raw.to_owned(),
                message: "reference must not be empty".to_owned(),
            });
        }
        let Some((name, rest)) = split_scheme(trimmed) else {
            return Ok(Self {
                scheme: Scheme::File,
                authority: String::new(),
                path: trimmed.to_owned(),
                raw: raw.to_owned(),
            });
        };
        let lowered = name.to_ascii_lowercase();
        let scheme = Scheme::from_name(&lowered).ok_or_else(|| ComposeError::UnsupportedScheme {
            scheme: lowered.clone(),
            reference: raw.to_owned(),
        })?;
        let (authority, path) = split_authority(rest);
        // `file://./relative` spells a relative path, not a host.
        let (authority, path) = if scheme == Scheme::File && authority.starts_with('.') {
            (String::new(), format!("{authority}{path}"))
        } else {
            (authority.to_owned(), path.to_owned())
        };
        Ok(Self {
            scheme,
            authority,
            path,
            raw: raw.to_owned(),
        })
    }

    /// Returns the normalized scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the authority component (host, bucket, or a relative-path marker).
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns the path component.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the reference exactly as the user wrote it.
    #[must_use]
    pub fn as_written(&self) -> &str {
        &self.raw
    }

    /// Resolve where the referenced bytes live.
    ///
    /// Relative file paths resolve against the working directory when read.
    #[must_use]
    pub fn location(&self) -> Location {
        match self.scheme {
            Scheme::File => Location::LocalFile(PathBuf::from(&self.path)),
            Scheme::Http | Scheme::Https => Location::Http(self.to_string()),
            Scheme::S3 => Location::ObjectStorage {
                bucket: self.authority.clone(),
                key: self.path.trim_start_matches('/').to_owned(),
            },
        }
    }

    const fn identity(&self) -> (Scheme, &String, &String) {
        (self.scheme, &self.authority, &self.path)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = self.scheme.as_str();
        if self.authority.is_empty() && !self.path.starts_with('/') {
            write!(f, "{scheme}:{}", self.path)
        } else {
            write!(f, "{scheme}://{}{}", self.authority, self.path)
        }
    }
}
