use crate::config::{LogFormat, SiteConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cjb-site")]
#[command(about = "Form submission backend for the CJB website")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CJB_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the data and public directories
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// defaults → TOML → 環境變數 → 命令列參數
    pub fn resolve(&self) -> Result<SiteConfig> {
        let mut config = match &self.config {
            Some(path) => SiteConfig::from_file(path)?,
            None => SiteConfig::default(),
        };

        config.apply_env()?;

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(root) = &self.root {
            config.storage.root = root.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[server]\nport = 4000\nhost = \"127.0.0.1\"\n").unwrap();

        let cli = CliConfig::parse_from([
            "cjb-site",
            "--config",
            file.path().to_str().unwrap(),
            "--root",
            "/srv/cjb",
            "--log-format",
            "json",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.root, PathBuf::from("/srv/cjb"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
