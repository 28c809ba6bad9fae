//! Connection URL parsing
//!
//! Accepted forms:
//!
//! ```text
//! sqlite:mem:                  private in-memory database
//! sqlite:mem:<name>            named in-memory database, shared by name
//! sqlite:file:<path>           file-backed database
//! mem:<name> / file:<path>     the same without the scheme prefix
//! ```
//!
//! followed by any number of `;KEY=VALUE` flags. Keys are case-insensitive.
//! `READONLY` and `IFEXISTS` are honored; `USER`, `PASSWORD` and
//! `AUTO_SERVER` are accepted for compatibility and have no effect on an
//! embedded engine.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::{DriverError, DriverResult};

const SCHEME: &str = "sqlite:";

/// Flags accepted without effect
const IGNORED_FLAGS: &[&str] = &["USER", "PASSWORD", "AUTO_SERVER"];

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlTarget {
    /// In-memory; `Some(name)` is shared by every connection using that name
    Memory(Option<String>),
    /// File-backed
    File(PathBuf),
}

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionUrl {
    pub target: UrlTarget,
    pub read_only: bool,
    pub if_exists: bool,
    /// Every flag as given, keys uppercased
    pub options: BTreeMap<String, String>,
}

impl ConnectionUrl {
    /// Parse a connection string
    pub fn parse(url: &str) -> DriverResult<Self> {
        let malformed = |reason: &str| DriverError::MalformedUrl {
            url: redact(url),
            reason: reason.to_string(),
        };

        let mut parts = url.trim().split(';');
        let location = parts.next().unwrap_or_default();
        let location = location.strip_prefix(SCHEME).unwrap_or(location);

        let target = if let Some(name) = location.strip_prefix("mem:") {
            let name = name.trim();
            UrlTarget::Memory((!name.is_empty()).then(|| name.to_string()))
        } else if let Some(path) = location.strip_prefix("file:") {
            let path = path.trim();
            if path.is_empty() {
                return Err(malformed("file path is empty"));
            }
            UrlTarget::File(PathBuf::from(path))
        } else {
            return Err(malformed("unknown scheme, expected mem: or file:"));
        };

        let mut options = BTreeMap::new();
        for flag in parts {
            if flag.trim().is_empty() {
                continue;
            }
            let (key, value) = flag
                .split_once('=')
                .ok_or_else(|| malformed(&format!("flag '{}' is not KEY=VALUE", flag)))?;
            options.insert(key.trim().to_ascii_uppercase(), value.trim().to_string());
        }

        let read_only = parse_bool_flag(&options, "READONLY").map_err(|r| malformed(&r))?;
        let if_exists = parse_bool_flag(&options, "IFEXISTS").map_err(|r| malformed(&r))?;

        for key in options.keys() {
            if IGNORED_FLAGS.contains(&key.as_str()) {
                tracing::debug!(target: "sqlbridge::driver", flag = %key, "Ignoring connection flag");
            }
        }

        Ok(ConnectionUrl {
            target,
            read_only,
            if_exists,
            options,
        })
    }

    /// True for in-memory targets
    pub fn is_memory(&self) -> bool {
        matches!(self.target, UrlTarget::Memory(_))
    }
}

fn parse_bool_flag(options: &BTreeMap<String, String>, key: &str) -> Result<bool, String> {
    match options.get(key) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(format!("{} must be TRUE or FALSE, got '{}'", key, v)),
    }
}

/// The url with any `PASSWORD=` value masked, for logs and errors.
pub fn redact(url: &str) -> String {
    url.split(';')
        .map(|part| match part.split_once('=') {
            Some((k, _)) if k.trim().eq_ignore_ascii_case("PASSWORD") => format!("{}=***", k),
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

impl fmt::Display for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            UrlTarget::Memory(None) => write!(f, "{}mem:", SCHEME)?,
            UrlTarget::Memory(Some(name)) => write!(f, "{}mem:{}", SCHEME, name)?,
            UrlTarget::File(path) => write!(f, "{}file:{}", SCHEME, path.display())?,
        }
        for (k, v) in &self.options {
            if k == "PASSWORD" {
                write!(f, ";{}=***", k)?;
            } else {
                write!(f, ";{}={}", k, v)?;
            }
        }
        Ok(())
    }
}
