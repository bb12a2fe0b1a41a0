//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{ChimeConfig, LogOutput, LoggingConfig, ServerConfig, SlackConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ChimeConfig) -> ConfigResult<()> {
    validate_slack_config(&config.slack, config.server.verify_signatures)?;
    validate_server_config(&config.server)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates Slack credentials and client settings.
fn validate_slack_config(slack: &SlackConfig, verify_signatures: bool) -> ConfigResult<()> {
    if slack.bot_token.trim().is_empty() {
        return Err(ConfigError::missing_field("slack.bot_token"));
    }

    if verify_signatures && slack.signing_secret.trim().is_empty() {
        return Err(ConfigError::missing_field("slack.signing_secret"));
    }

    validate_url(&slack.api_base)?;

    if slack.timeout_ms == 0 {
        return Err(ConfigError::validation(
            "Slack API timeout must be greater than 0",
        ));
    }

    Ok(())
}

/// Validates webhook server settings.
fn validate_server_config(server: &ServerConfig) -> ConfigResult<()> {
    if server.host.is_empty() {
        return Err(ConfigError::missing_field("server.host"));
    }

    validate_port(server.port)?;
    validate_path(&server.path)?;

    if server.ack_timeout_ms == 0 {
        return Err(ConfigError::validation(
            "Acknowledgment timeout must be greater than 0",
        ));
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

/// Validates an HTTP(S) URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("url"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {:?}", valid_schemes),
        ));
    }

    Ok(())
}

/// Validates a port number.
fn validate_port(port: u16) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

/// Validates a path.
fn validate_path(path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation("Path must start with '/'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ChimeConfig {
        let mut config = ChimeConfig::default();
        config.slack.bot_token = "xoxb-test".to_string();
        config.slack.signing_secret = "secret".to_string();
        config
    }

    #[test]
    fn test_validate_complete_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_default_config_lacks_credentials() {
        let result = validate_config(&ChimeConfig::default());
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { ref field }) if field == "slack.bot_token"
        ));
    }

    #[test]
    fn test_signing_secret_only_required_when_verifying() {
        let mut config = valid();
        config.slack.signing_secret.clear();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.server.verify_signatures = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_server_fields() {
        let mut config = valid();
        config.server.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPort(0))
        ));

        let mut config = valid();
        config.server.path = "slack/events".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.server.ack_timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_api_base_scheme() {
        let mut config = valid();
        config.slack.api_base = "slack.com/api".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = valid();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/chime.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
