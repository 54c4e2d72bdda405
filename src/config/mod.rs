#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::notify::Recipients;
use crate::core::store::StoreLayout;
use crate::core::templates::MailIdentity;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Complete runtime configuration.
///
/// Built from defaults, then an optional TOML file, then environment
/// variables, then command-line flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub data_dir: String,
    pub public_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_dir: "data".to_string(),
            public_dir: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sender: String,
    pub organization_name: String,
    pub site_name: String,
    pub admin_email: Option<String>,
    pub contact_email: Option<String>,
    pub school_email: Option<String>,
    pub tour_email: Option<String>,
    pub forum_email: Option<String>,
    /// HTTP mail relay; when unset messages are only logged.
    pub relay_endpoint: Option<String>,
    pub relay_token: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "noreply@localhost".to_string(),
            organization_name: "Christian Jewish Believers".to_string(),
            site_name: "CJB Website".to_string(),
            admin_email: None,
            contact_email: None,
            school_email: None,
            tour_email: None,
            forum_email: None,
            relay_endpoint: None,
            relay_token: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl SiteConfig {
    /// 套用環境變數覆蓋設定
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| SiteError::InvalidConfigValueError {
                    field: "PORT".to_string(),
                    value: port.clone(),
                    reason: "not a valid port number".to_string(),
                })?;
        }
        if let Some(sender) = get("EMAIL_USER") {
            self.mail.sender = sender;
        }

        let overrides: [(&str, &mut Option<String>); 7] = [
            ("ADMIN_EMAIL", &mut self.mail.admin_email),
            ("CONTACT_EMAIL", &mut self.mail.contact_email),
            ("SCHOOL_EMAIL", &mut self.mail.school_email),
            ("TOUR_EMAIL", &mut self.mail.tour_email),
            ("FORUM_EMAIL", &mut self.mail.forum_email),
            ("MAIL_RELAY_URL", &mut self.mail.relay_endpoint),
            ("MAIL_RELAY_TOKEN", &mut self.mail.relay_token),
        ];
        for (key, slot) in overrides {
            if let Some(value) = get(key) {
                *slot = Some(value);
            }
        }

        Ok(())
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(&self.storage.data_dir, &self.storage.public_dir)
    }

    pub fn public_root(&self) -> PathBuf {
        self.storage.root.join(&self.storage.public_dir)
    }

    pub fn identity(&self) -> MailIdentity {
        MailIdentity {
            sender: self.mail.sender.clone(),
            organization_name: self.mail.organization_name.clone(),
            site_name: self.mail.site_name.clone(),
        }
    }

    pub fn recipients(&self) -> Recipients {
        Recipients {
            admin: self.mail.admin_email.clone(),
            contact: self.mail.contact_email.clone(),
            school: self.mail.school_email.clone(),
            tour: self.mail.tour_email.clone(),
            forum: self.mail.forum_email.clone(),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr =
            self.server
                .host
                .parse()
                .map_err(|_| SiteError::InvalidConfigValueError {
                    field: "server.host".to_string(),
                    value: self.server.host.clone(),
                    reason: "must be an IP address".to_string(),
                })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        validation::validate_positive_number("server.port", self.server.port as usize, 1)?;
        validation::validate_positive_number(
            "server.max_body_bytes",
            self.server.max_body_bytes as usize,
            1024,
        )?;

        validation::validate_path("storage.root", &self.storage.root.to_string_lossy())?;
        validation::validate_relative_dir("storage.data_dir", &self.storage.data_dir)?;
        validation::validate_relative_dir("storage.public_dir", &self.storage.public_dir)?;

        validation::validate_email("mail.sender", &self.mail.sender)?;
        let optional_addresses = [
            ("mail.admin_email", &self.mail.admin_email),
            ("mail.contact_email", &self.mail.contact_email),
            ("mail.school_email", &self.mail.school_email),
            ("mail.tour_email", &self.mail.tour_email),
            ("mail.forum_email", &self.mail.forum_email),
        ];
        for (field, address) in optional_addresses {
            if let Some(address) = address {
                validation::validate_email(field, address)?;
            }
        }

        if let Some(endpoint) = &self.mail.relay_endpoint {
            validation::validate_url("mail.relay_endpoint", endpoint)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SiteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
        assert_eq!(config.layout().collection_path(crate::core::Kind::Product), "data/products.json");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SiteConfig::default();
        config
            .apply_env_with(env(&[
                ("PORT", "8080"),
                ("EMAIL_USER", "site@cjb.org"),
                ("ADMIN_EMAIL", "admin@cjb.org"),
                ("TOUR_EMAIL", ""),
                ("MAIL_RELAY_URL", "https://relay.cjb.org/send"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.mail.sender, "site@cjb.org");
        assert_eq!(config.mail.admin_email.as_deref(), Some("admin@cjb.org"));
        assert_eq!(config.mail.tour_email, None);
        assert_eq!(
            config.mail.relay_endpoint.as_deref(),
            Some("https://relay.cjb.org/send")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_port_from_env() {
        let mut config = SiteConfig::default();
        assert!(config.apply_env_with(env(&[("PORT", "eighty")])).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SiteConfig::default();
        config.mail.admin_email = Some("not-an-address".to_string());
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.mail.relay_endpoint = Some("smtp://mail.example.com".to_string());
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.storage.data_dir = "../outside".to_string();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.server.host = "localhost:3000".to_string();
        assert!(config.validate().is_err());
    }
}
