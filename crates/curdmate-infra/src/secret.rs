//! Environment variable secret resolution.
//!
//! The backend bearer token and the completion API key are read from the
//! environment variables named in config and wrapped in [`SecretString`]
//! immediately, so they never reach Debug output or logs.

use secrecy::SecretString;

/// Read `var` from the environment as a secret.
///
/// Unset, empty, and non-Unicode values all resolve to `None`.
pub fn secret_from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val.trim().to_string())),
        Ok(_) => None,
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            tracing::warn!(var, "environment variable is not valid Unicode, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_from_env_existing() {
        // SAFETY: unique variable name, removed below.
        unsafe { std::env::set_var("CURDMATE_TEST_SECRET_1", "  tok-123 ") };
        let secret = secret_from_env("CURDMATE_TEST_SECRET_1").unwrap();
        assert_eq!(secret.expose_secret(), "tok-123");
        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("CURDMATE_TEST_SECRET_1") };
    }

    #[test]
    fn test_secret_from_env_missing_or_blank() {
        assert!(secret_from_env("NONEXISTENT_VAR_XYZ_123").is_none());
        // SAFETY: unique variable name, removed below.
        unsafe { std::env::set_var("CURDMATE_TEST_SECRET_2", "   ") };
        assert!(secret_from_env("CURDMATE_TEST_SECRET_2").is_none());
        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("CURDMATE_TEST_SECRET_2") };
    }
}
