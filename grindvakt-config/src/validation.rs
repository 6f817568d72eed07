//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate a front-end socket locator: `unix:///absolute/path` or
/// `tcp://host:port`.
pub fn validate_socket_locator(locator: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^(unix:///.+|tcp://[^:/]+:[0-9]{1,5})$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;

    if re.is_match(locator) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_socket_locator"))
    }
}

/// Validate a rule action name.
pub fn validate_action(action: &str) -> Result<(), ValidationError> {
    if ["allow", "deny"].contains(&action) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_action"))
    }
}
