use crate::utils::error::{JsonApiError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(JsonApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(JsonApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(JsonApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(JsonApiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Allowed values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input", "doc.json").is_ok());
        assert!(validate_path("input", "-").is_ok());
        assert!(validate_path("input", "").is_err());
        assert!(validate_path("input", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("mapper.relationship_names_prop", "names").is_ok());
        assert!(validate_non_empty_string("mapper.relationship_names_prop", "   ").is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("logging.level", "debug", &LOG_LEVELS).is_ok());
        let err = validate_one_of("logging.level", "loud", &LOG_LEVELS).unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }
}
