//! TLS client-certificate material.

use std::fmt::{self, Debug, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::{Certificate, Identity};

use crate::error::{EngineError, EngineResult};

/// TLS file locations as supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// CA bundle used to verify the daemon.
    pub ca_file: Option<PathBuf>,
    /// Client certificate presented to the daemon.
    pub cert_file: Option<PathBuf>,
    /// Private key for the client certificate.
    pub key_file: Option<PathBuf>,
    /// Verify the daemon's certificate chain and hostname.
    pub verify: bool,
}

impl TlsOptions {
    /// All three credential paths are present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.ca_file, &self.cert_file, &self.key_file]
            .iter()
            .all(|path| path.as_ref().is_some_and(|p| !p.as_os_str().is_empty()))
    }

    /// Read and parse the credential files.
    ///
    /// Returns `Ok(None)` when any credential is missing, in which case the
    /// caller falls back to a plain transport.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TlsRead`] when a file cannot be read and
    /// [`EngineError::TlsMaterial`] when its contents are empty or malformed.
    pub fn load(&self) -> EngineResult<Option<TlsMaterial>> {
        let (Some(ca_file), Some(cert_file), Some(key_file)) =
            (&self.ca_file, &self.cert_file, &self.key_file)
        else {
            return Ok(None);
        };
        if !self.is_complete() {
            return Ok(None);
        }

        let ca_pem = read_pem(ca_file)?;
        let ca = Certificate::from_pem(&ca_pem).map_err(|err| EngineError::TlsMaterial {
            reason: format!("CA certificate {}: {err}", ca_file.display()),
        })?;

        let mut identity_pem = read_pem(cert_file)?;
        identity_pem.push(b'\n');
        identity_pem.extend_from_slice(&read_pem(key_file)?);
        let identity = Identity::from_pem(&identity_pem).map_err(|err| EngineError::TlsMaterial {
            reason: format!(
                "client identity {} / {}: {err}",
                cert_file.display(),
                key_file.display()
            ),
        })?;

        Ok(Some(TlsMaterial {
            ca,
            identity,
            verify: self.verify,
        }))
    }
}

/// Parsed TLS material ready to be installed on an HTTP client.
#[derive(Clone)]
pub struct TlsMaterial {
    pub(crate) ca: Certificate,
    pub(crate) identity: Identity,
    pub(crate) verify: bool,
}

impl TlsMaterial {
    /// Whether the daemon's certificate is verified.
    #[must_use]
    pub const fn verifies_server(&self) -> bool {
        self.verify
    }
}

impl Debug for TlsMaterial {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TlsMaterial")
            .field("verify", &self.verify)
            .finish_non_exhaustive()
    }
}

fn read_pem(path: &Path) -> EngineResult<Vec<u8>> {
    let bytes = fs::read(path).map_err(|source| EngineError::TlsRead {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(EngineError::TlsMaterial {
            reason: format!("{} is empty", path.display()),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn incomplete_options_fall_back_to_plain_transport() -> Result<()> {
        let options = TlsOptions {
            ca_file: Some(PathBuf::from("/certs/ca.pem")),
            cert_file: Some(PathBuf::from("/certs/cert.pem")),
            key_file: None,
            verify: true,
        };
        assert!(!options.is_complete());
        assert!(options.load()?.is_none());

        let blank = TlsOptions {
            key_file: Some(PathBuf::new()),
            ..options
        };
        assert!(!blank.is_complete());
        assert!(blank.load()?.is_none());
        Ok(())
    }

    #[test]
    fn missing_files_are_reported() {
        let options = TlsOptions {
            ca_file: Some(PathBuf::from("/definitely/missing/ca.pem")),
            cert_file: Some(PathBuf::from("/definitely/missing/cert.pem")),
            key_file: Some(PathBuf::from("/definitely/missing/key.pem")),
            verify: false,
        };
        assert!(options.is_complete());
        let err = options.load().expect_err("missing files must fail");
        assert!(matches!(err, EngineError::TlsRead { .. }));
    }

    #[test]
    fn empty_files_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let ca = dir.path().join("ca.pem");
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        for path in [&ca, &cert, &key] {
            fs::write(path, "\n")?;
        }

        let options = TlsOptions {
            ca_file: Some(ca),
            cert_file: Some(cert),
            key_file: Some(key),
            verify: true,
        };
        let err = options.load().expect_err("empty material must fail");
        assert!(matches!(err, EngineError::TlsMaterial { .. }));
        assert!(err.to_string().contains("is empty"));
        Ok(())
    }
}
