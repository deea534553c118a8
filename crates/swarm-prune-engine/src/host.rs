//! Daemon address parsing.
//!
//! Accepts the address forms understood by the Docker CLI: `unix:///path`,
//! `tcp://host[:port]`, `http://host[:port]` and `https://host[:port]`.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use url::Url;

use crate::error::{EngineError, EngineResult};

/// Default plain-text daemon port.
pub const DEFAULT_HTTP_PORT: u16 = 2375;
/// Default TLS daemon port.
pub const DEFAULT_HTTPS_PORT: u16 = 2376;

/// Transport scheme used for TCP daemons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostScheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl HostScheme {
    /// URL scheme label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Parsed daemon address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineHost {
    /// Local daemon socket.
    Unix(PathBuf),
    /// Remote daemon reachable over TCP.
    Tcp {
        /// Transport scheme.
        scheme: HostScheme,
        /// Hostname or IP literal (IPv6 literals keep their brackets).
        host: String,
        /// TCP port.
        port: u16,
    },
}

impl EngineHost {
    /// Parse a daemon address. `tcp://` is promoted to `https` when `tls` is set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidHost`] when the address is empty, uses an
    /// unsupported scheme, has no host, or carries a path.
    pub fn parse(input: &str, tls: bool) -> EngineResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid(input, "address is empty"));
        }

        if let Some(path) = trimmed.strip_prefix("unix://") {
            if !path.starts_with('/') {
                return Err(invalid(input, "socket path must be absolute"));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }

        let (scheme, rest) = trimmed.split_once("://").unwrap_or(("tcp", trimmed));
        let scheme = match scheme {
            "tcp" if tls => HostScheme::Https,
            "tcp" | "http" => HostScheme::Http,
            "https" => HostScheme::Https,
            other => return Err(invalid(input, &format!("unsupported scheme '{other}'"))),
        };

        // A non-special scheme keeps explicit ports that would otherwise be
        // normalised away (e.g. `:80` for http).
        let parsed = Url::parse(&format!("docker://{rest}"))
            .map_err(|err| invalid(input, &err.to_string()))?;
        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| invalid(input, "missing host"))?
            .to_string();
        if !matches!(parsed.path(), "" | "/") || parsed.query().is_some() {
            return Err(invalid(input, "daemon address must not contain a path"));
        }
        let port = parsed.port().unwrap_or(match scheme {
            HostScheme::Http => DEFAULT_HTTP_PORT,
            HostScheme::Https => DEFAULT_HTTPS_PORT,
        });

        Ok(Self::Tcp { scheme, host, port })
    }

    /// Address of a swarm node's daemon, derived from its hostname.
    #[must_use]
    pub fn for_node(hostname: &str, port: u16, tls: bool) -> String {
        let scheme = if tls { "https" } else { "tcp" };
        format!("{scheme}://{hostname}:{port}")
    }

    /// Base URL requests are resolved against.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidHost`] if the host cannot form a URL.
    pub fn base_url(&self) -> EngineResult<Url> {
        let raw = match self {
            Self::Unix(_) => "http://localhost/".to_string(),
            Self::Tcp { scheme, host, port } => format!("{}://{host}:{port}/", scheme.as_str()),
        };
        Url::parse(&raw).map_err(|err| invalid(&self.to_string(), &err.to_string()))
    }
}

impl Display for EngineHost {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(formatter, "unix://{}", path.display()),
            Self::Tcp { scheme, host, port } => {
                write!(formatter, "{}://{host}:{port}", scheme.as_str())
            }
        }
    }
}

fn invalid(host: &str, reason: &str) -> EngineError {
    EngineError::InvalidHost {
        host: host.to_string(),
        reason: reason.to_string(),
    }
}
