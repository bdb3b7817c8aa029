//! Environment variable expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// `field` names the config key and is only used in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains('$') {
        return Ok(value.to_owned());
    }
    shellexpand::env(value)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(v) = value.as_deref() {
        *value = Some(expand_env(v, field)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_default_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RELAY_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${RELAY_EXPAND_UNSET:-fallback}", "x").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_expand_literal_unchanged() {
        assert_eq!(expand_env("plain", "x").unwrap(), "plain");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RELAY_EXPAND_MISSING");
        }
        let err = expand_env("${RELAY_EXPAND_MISSING}", "confluence.api_token").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("RELAY_EXPAND_MISSING"));
        assert!(msg.contains("confluence.api_token"));
    }
}
