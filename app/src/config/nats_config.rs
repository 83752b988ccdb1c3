use serde::Deserialize;

use super::app_config::CertConfig;

#[derive(Deserialize, Default, Clone)]
pub struct NatsConfig {
    pub client: ClientConfig,
    pub consumer: ConsumerConfig,
    pub publisher: PublisherConfig,
}

#[derive(Deserialize, Default, Clone)]
pub struct ConsumerConfig {
    pub subjects: Vec<String>,
    pub name: String,
}

#[derive(Deserialize, Default, Clone)]
pub struct PublisherConfig {
    pub command_subject: String,
}

#[derive(Deserialize, Default, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub cert: CertConfig,
    pub creds_path: Option<String>,
}
