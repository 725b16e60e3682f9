// Settings validation

use crate::settings::PLACEHOLDER;
use crate::{ConfigError, Result, Settings};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a template contains exactly one `%s`
    pub fn is_template(value: &str, field: &str) -> Result<()> {
        if value.matches(PLACEHOLDER).count() != 1 {
            return Err(ConfigError::ValidationError(format!(
                "{} must contain exactly one {} placeholder",
                field, PLACEHOLDER
            )));
        }
        Ok(())
    }

    /// Validate a cookie name template: a template made of cookie-safe characters
    pub fn is_cookie_template(value: &str, field: &str) -> Result<()> {
        Self::is_template(value, field)?;
        let rendered = value.replace(PLACEHOLDER, "");
        if rendered
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "=;,\"".contains(c))
        {
            return Err(ConfigError::ValidationError(format!(
                "{} contains characters not allowed in a cookie name",
                field
            )));
        }
        Ok(())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_cookie_template(&self.cookie, "COOKIE")?;
        ConfigValidator::is_cookie_template(&self.test_cookie, "TEST_COOKIE")?;
        if self.cookie == self.test_cookie {
            return Err(ConfigError::ValidationError(
                "COOKIE and TEST_COOKIE must differ".to_string(),
            ));
        }

        let keys = [
            (&self.flag_cache_key, "FLAG_CACHE_KEY"),
            (&self.flag_users_cache_key, "FLAG_USERS_CACHE_KEY"),
            (&self.flag_groups_cache_key, "FLAG_GROUPS_CACHE_KEY"),
            (&self.switch_cache_key, "SWITCH_CACHE_KEY"),
            (&self.sample_cache_key, "SAMPLE_CACHE_KEY"),
        ];
        for (template, field) in keys {
            ConfigValidator::not_empty(template, field)?;
            ConfigValidator::is_template(template, field)?;
        }
        Ok(())
    }
}
