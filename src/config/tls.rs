//! TLS configuration for backend connections.

use std::path::PathBuf;

use crate::Error;

/// TLS settings for the connection to the privileged-access backend.
///
/// By default system root certificates are used and server certificates
/// are validated. A custom CA is typical for private endpoints or
/// emulators.
///
/// ```rust
/// use pam_grants::TlsConfig;
///
/// let config = TlsConfig::builder()
///     .ca_cert_file("/etc/ssl/private-ca.crt")
///     .build();
/// assert!(config.has_custom_ca());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct TlsConfig {
    /// Custom CA certificate file path.
    #[builder(into)]
    pub ca_cert_file: Option<PathBuf>,

    /// Custom CA certificate PEM data.
    #[builder(into)]
    pub ca_cert_pem: Option<String>,

    /// Whether to skip certificate verification.
    ///
    /// **WARNING**: This is insecure and should only be used against a local
    /// emulator.
    #[builder(default = false)]
    pub skip_verification: bool,
}

impl TlsConfig {
    /// Creates an insecure TLS config that skips verification.
    pub fn insecure() -> Self {
        Self::builder().skip_verification(true).build()
    }

    /// Returns `true` if a custom CA is configured.
    pub fn has_custom_ca(&self) -> bool {
        self.ca_cert_file.is_some() || self.ca_cert_pem.is_some()
    }

    /// Loads every configured CA certificate as PEM bytes.
    ///
    /// Fails with [`ErrorKind::Configuration`](crate::ErrorKind::Configuration)
    /// when the file cannot be read.
    pub fn ca_certificates_pem(&self) -> Result<Vec<Vec<u8>>, Error> {
        let mut certs = Vec::new();
        if let Some(ref path) = self.ca_cert_file {
            let pem = std::fs::read(path).map_err(|e| {
                Error::configuration(format!("failed to read certificate {:?}: {}", path, e))
                    .with_source(e)
            })?;
            certs.push(pem);
        }
        if let Some(ref pem) = self.ca_cert_pem {
            certs.push(pem.as_bytes().to_vec());
        }
        Ok(certs)
    }
}
