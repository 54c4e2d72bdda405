use crate::utils::error::{Result, SiteError};
use std::path::{Component, Path};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> SiteError {
    SiteError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// A directory relative to the storage root that stays inside it.
pub fn validate_relative_dir(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    let escapes = Path::new(path).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(invalid(
            field_name,
            path,
            "Must be a relative path inside the storage root",
        ));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Shape check only: `local@domain` with no whitespace.
pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(invalid(field_name, value, "Not an email address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("mail.relay_endpoint", "https://example.com").is_ok());
        assert!(validate_url("mail.relay_endpoint", "http://example.com").is_ok());
        assert!(validate_url("mail.relay_endpoint", "").is_err());
        assert!(validate_url("mail.relay_endpoint", "invalid-url").is_err());
        assert!(validate_url("mail.relay_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("server.port", 5, 1).is_ok());
        assert!(validate_positive_number("server.port", 0, 1).is_err());
    }

    #[test]
    fn test_validate_relative_dir() {
        assert!(validate_relative_dir("storage.data_dir", "data").is_ok());
        assert!(validate_relative_dir("storage.data_dir", "var/data").is_ok());
        assert!(validate_relative_dir("storage.data_dir", "../data").is_err());
        assert!(validate_relative_dir("storage.data_dir", "/data").is_err());
        assert!(validate_relative_dir("storage.data_dir", "").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("mail.sender", "site@cjb.org").is_ok());
        assert!(validate_email("mail.sender", "site").is_err());
        assert!(validate_email("mail.sender", "@cjb.org").is_err());
        assert!(validate_email("mail.sender", "a b@cjb.org").is_err());
        assert!(validate_email("mail.sender", "a@b@c").is_err());
        assert!(validate_email("mail.sender", " ").is_err());
    }
}
