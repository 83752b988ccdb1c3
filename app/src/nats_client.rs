use crate::config::{app_config::CertificateProvider, nats_config::ClientConfig as NatsClientConf};
use anyhow::{Context, Result};
use async_nats::ConnectOptions;
use log::info;
use rustls::{ClientConfig, RootCertStore};

pub struct NatsClient {
    pub client_config: NatsClientConf,
}
impl NatsClient {
    fn client_configuration(certificate_provider: &impl CertificateProvider) -> Result<ClientConfig> {
        let mut store = RootCertStore::empty();
        let ca = certificate_provider.root_ca().context("Unable to load NATS root CA")?;
        let cert = certificate_provider
            .certificate()
            .context("Unable to load NATS client certificate")?;
        let private_key = certificate_provider
            .private_key()
            .context("Unable to load NATS client key")?;
        store.add(ca).context("Invalid NATS root CA")?;
        ClientConfig::builder()
            .with_root_certificates(store)
            .with_client_auth_cert(vec![cert], private_key)
            .context("Unable to build client configuration!")
    }

    pub async fn connect(&self) -> Result<async_nats::Client> {
        let address = format!("tls://{}:{}", self.client_config.host, self.client_config.port);
        let mut options = ConnectOptions::new()
            .tls_client_config(NatsClient::client_configuration(&self.client_config.cert)?)
            .require_tls(true)
            .name("fermentation-controller");
        if let Some(creds_path) = &self.client_config.creds_path {
            options = options
                .credentials_file(creds_path)
                .await
                .with_context(|| format!("Unable to read NATS credentials {creds_path}"))?;
        }

        let client = async_nats::connect_with_options(&address, options)
            .await
            .context("Cannot connect to nats server")?;
        info!("Connected to NATS at {address}");
        Ok(client)
    }
}
