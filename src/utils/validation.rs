use crate::utils::error::{GateError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(GateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(GateError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(GateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Accepts `owner/name` with both halves non-empty and free of whitespace.
pub fn validate_repository_slug(field_name: &str, slug: &str) -> Result<()> {
    let invalid = |reason: &str| GateError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: slug.to_string(),
        reason: reason.to_string(),
    };

    let (owner, name) = slug
        .split_once('/')
        .ok_or_else(|| invalid("Expected the form owner/name"))?;

    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(invalid("Expected the form owner/name"));
    }
    if slug.chars().any(char::is_whitespace) {
        return Err(invalid("Repository slug cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| GateError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
