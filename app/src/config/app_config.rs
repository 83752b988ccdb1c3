use std::path::Path;

use anyhow::{Context, Result, ensure};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use serde::Deserialize;

use crate::utils::{file::FileUtils, pem::PemUtils};

use super::{
    fermenter_config::{ControllerConfig, FermenterConfig, SerialConfig},
    nats_config::NatsConfig,
    postgres_config::PostgresConfig,
};

#[derive(Deserialize)]
pub struct AppConfig {
    pub fermenter: FermenterConfig,
    pub serial: SerialConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    pub nats: NatsConfig,
    pub postgres: PostgresConfig,
}

impl AppConfig {
    pub fn load(file_path: impl AsRef<Path>) -> Result<AppConfig> {
        let file_path = file_path.as_ref();
        let content = FileUtils::load_to_string(file_path).context("Could not read config file")?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Could not parse TOML config {}", file_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.fermenter.target_temp.is_finite(),
            "fermenter.target_temp must be a number, got {}",
            self.fermenter.target_temp
        );
        ensure!(!self.fermenter.brew_id.trim().is_empty(), "fermenter.brew_id must not be empty");
        ensure!(!self.serial.port.trim().is_empty(), "serial.port must not be empty");
        ensure!(self.serial.baud_rate > 0, "serial.baud_rate must be greater than 0");
        ensure!(
            self.controller.reconcile_interval_secs > 0,
            "controller.reconcile_interval_secs must be greater than 0"
        );
        ensure!(
            !self.nats.consumer.subjects.is_empty(),
            "nats.consumer.subjects must list at least one subject"
        );
        Ok(())
    }
}

#[derive(Deserialize, Default, Clone)]
pub struct CertConfig {
    absolute_folder_path: String,
    key_file_name: String,
    cert_file_name: String,
    root_ca_file_name: String,
}

pub enum CertFileType {
    Key,
    Cert,
    Ca,
}

pub trait CertificateProvider {
    fn get_path_of(&self, cert_type: CertFileType) -> String;
    fn private_key(&self) -> Result<PrivateKeyDer<'static>>;
    fn certificate(&self) -> Result<CertificateDer<'static>>;
    fn root_ca(&self) -> Result<CertificateDer<'static>>;
}

#[cfg_attr(test, mockall::automock)]
impl CertificateProvider for CertConfig {
    fn get_path_of(&self, cert_type: CertFileType) -> String {
        match cert_type {
            CertFileType::Ca => format!("{}/{}", self.absolute_folder_path, self.root_ca_file_name),
            CertFileType::Cert => format!("{}/{}", self.absolute_folder_path, self.cert_file_name),
            CertFileType::Key => format!("{}/{}", self.absolute_folder_path, self.key_file_name),
        }
    }
    fn private_key(&self) -> Result<PrivateKeyDer<'static>> {
        let key_data = FileUtils::load(self.get_path_of(CertFileType::Key))?;
        PemUtils::parse_private_key(key_data)
    }

    fn certificate(&self) -> Result<CertificateDer<'static>> {
        let cert_data = FileUtils::load(self.get_path_of(CertFileType::Cert))?;
        PemUtils::parse_certificate(cert_data)
    }

    fn root_ca(&self) -> Result<CertificateDer<'static>> {
        let ca_data = FileUtils::load(self.get_path_of(CertFileType::Ca))?;
        PemUtils::parse_certificate(ca_data)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml")).unwrap()
    }

    #[test]
    fn should_load_app_config() {
        let conf = sample_config();
        assert_eq!(conf.fermenter.target_temp, 18.0);
        assert_eq!(conf.serial.baud_rate, 115200);
        assert_eq!(conf.controller.reconcile_interval_secs, 5);
        assert_eq!(conf.nats.consumer.subjects, vec!["fermenter.commands".to_string()]);
    }

    #[test]
    fn should_fail_on_missing_file() {
        assert!(AppConfig::load("/no/such/config.toml").is_err());
    }

    #[test]
    fn should_reject_empty_brew_id() {
        let mut conf = sample_config();
        conf.fermenter.brew_id = "  ".into();
        let err = conf.validate().unwrap_err();
        assert!(err.to_string().contains("brew_id"));
    }

    #[test]
    fn should_reject_zero_reconcile_interval() {
        let mut conf = sample_config();
        conf.controller.reconcile_interval_secs = 0;
        assert!(conf.validate().is_err());
    }

    #[test]
    fn should_reject_non_finite_target() {
        let mut conf = sample_config();
        conf.fermenter.target_temp = f64::NAN;
        assert!(conf.validate().is_err());
    }

    #[test]
    fn should_return_correct_cert_file_path() {
        let cert_conf = CertConfig {
            absolute_folder_path: String::from("path"),
            key_file_name: String::from("key"),
            cert_file_name: String::from("cert"),
            root_ca_file_name: String::from("ca"),
        };
        assert_eq!(cert_conf.get_path_of(CertFileType::Cert), "path/cert");
        assert_eq!(cert_conf.get_path_of(CertFileType::Key), "path/key");
        assert_eq!(cert_conf.get_path_of(CertFileType::Ca), "path/ca");
    }

    #[test]
    fn should_fail_when_cert_files_are_missing() {
        let cert_conf = CertConfig {
            absolute_folder_path: String::from("/no/such/folder"),
            key_file_name: String::from("client.key"),
            cert_file_name: String::from("client.crt"),
            root_ca_file_name: String::from("ca.crt"),
        };
        assert!(cert_conf.root_ca().is_err());
        assert!(cert_conf.private_key().is_err());
    }
}
