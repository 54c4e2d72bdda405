use crate::config::{MailConfig, SiteConfig};
use crate::utils::error::{Result, SiteError};
use regex::Regex;
use std::path::Path;

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未列出的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        let mut config: SiteConfig =
            toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.drop_unresolved_mail_values();
        Ok(config)
    }

    /// 郵件設定中未替換的 ${VAR} 視為未設定
    fn drop_unresolved_mail_values(&mut self) {
        let mail = &mut self.mail;
        if is_unresolved(&mail.sender) {
            tracing::warn!("mail.sender is {}, using the default sender", mail.sender);
            mail.sender = MailConfig::default().sender;
        }

        let optional = [
            ("mail.admin_email", &mut mail.admin_email),
            ("mail.contact_email", &mut mail.contact_email),
            ("mail.school_email", &mut mail.school_email),
            ("mail.tour_email", &mut mail.tour_email),
            ("mail.forum_email", &mut mail.forum_email),
            ("mail.relay_endpoint", &mut mail.relay_endpoint),
            ("mail.relay_token", &mut mail.relay_token),
        ];
        for (field, slot) in optional {
            if slot.as_deref().is_some_and(is_unresolved) {
                tracing::warn!("{} refers to an unset variable, ignoring it", field);
                *slot = None;
            }
        }
    }
}

fn is_unresolved(value: &str) -> bool {
    value.contains("${")
}

/// 替換環境變數 (例如 ${ADMIN_EMAIL})，未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigError {
        message: format!("invalid substitution pattern: {e}"),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[storage]
root = "/srv/cjb"
data_dir = "data"
public_dir = "www"

[mail]
sender = "site@cjb.org"
admin_email = "admin@cjb.org"
school_email = "school@cjb.org"

[logging]
format = "json"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage.public_dir, "www");
        assert_eq!(config.mail.school_email.as_deref(), Some("school@cjb.org"));
        assert_eq!(config.mail.organization_name, "Christian Jewish Believers");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.data_dir, "data");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CJB_TEST_RELAY_TOKEN", "s3cret");

        let toml_content = r#"
[mail]
relay_endpoint = "https://relay.example.com/send"
relay_token = "${CJB_TEST_RELAY_TOKEN}"
forum_email = "${CJB_TEST_UNSET_VARIABLE}"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mail.relay_token.as_deref(), Some("s3cret"));
        assert_eq!(config.mail.forum_email, None);

        std::env::remove_var("CJB_TEST_RELAY_TOKEN");
    }

    #[test]
    fn test_unresolved_mail_values_are_unset() {
        let toml_content = r#"
[mail]
sender = "${CJB_TEST_UNSET_SENDER}"
admin_email = "${CJB_TEST_UNSET_ADMIN}"
contact_email = "contact@cjb.org"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mail.sender, MailConfig::default().sender);
        assert_eq!(config.mail.admin_email, None);
        assert_eq!(config.mail.contact_email.as_deref(), Some("contact@cjb.org"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = SiteConfig::from_toml_str(include_str!("../../site.example.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = SiteConfig::from_toml_str("[server]\nport = \"many\"").unwrap_err();
        assert!(matches!(err, SiteError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 4000\n")
            .unwrap();

        let config = SiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 4000);
    }
}
