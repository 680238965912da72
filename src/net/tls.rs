//! TLS configuration and certificate loading.
//!
//! There is no plaintext fallback: if the certificate or key cannot be
//! read and parsed, startup fails.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("{kind} file not found: {}", .path.display())]
    NotFound { kind: &'static str, path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("no certificates found in {}", .0.display())]
    NoCertificates(PathBuf),
    #[error("no private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),
    #[error("invalid TLS material: {0}")]
    Invalid(io::Error),
}

fn read_file(path: &Path, kind: &'static str) -> Result<Vec<u8>, TlsError> {
    if !path.exists() {
        return Err(TlsError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    fs::read(path).map_err(|source| TlsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the PEM files and check they hold at least one certificate and a
/// private key.
pub fn read_pem_material(cert_path: &Path, key_path: &Path) -> Result<(Vec<u8>, Vec<u8>), TlsError> {
    let cert = read_file(cert_path, "Certificate")?;
    let key = read_file(key_path, "Private key")?;

    let certs = rustls_pemfile::certs(&mut cert.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: cert_path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_path_buf()));
    }

    match rustls_pemfile::private_key(&mut key.as_slice()) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(TlsError::NoPrivateKey(key_path.to_path_buf())),
        Err(source) => {
            return Err(TlsError::Io {
                path: key_path.to_path_buf(),
                source,
            })
        }
    }

    tracing::debug!(certificates = certs.len(), "TLS material parsed");
    Ok((cert, key))
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    let (cert, key) = read_pem_material(cert_path, key_path)?;
    RustlsConfig::from_pem(cert, key)
        .await
        .map_err(TlsError::Invalid)
}
