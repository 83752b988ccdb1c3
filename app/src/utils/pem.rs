use anyhow::{Context, Result};
use log::debug;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls_pemfile::{certs, private_key};

pub struct PemUtils {}

impl PemUtils {
    pub fn init_provider() {
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            debug!("rustls crypto provider already installed");
        }
    }
    pub fn parse_certificate(data: Vec<u8>) -> Result<CertificateDer<'static>> {
        certs(&mut &data[..])
            .find_map(|cert_res| cert_res.ok())
            .context("Failed to parse certificate")
    }
    pub fn parse_private_key(data: Vec<u8>) -> Result<PrivateKeyDer<'static>> {
        private_key(&mut &data[..])
            .context("Failed to read private key")?
            .context("Failed to parse any valid private key")
    }
}
