//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a scan namespace
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Namespace syntax is checked by the catalog at startup

use std::net::SocketAddr;

use crate::config::schema::DispatcherConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("scanPackage is required")]
    MissingScanPackage,

    #[error("context_path `{0}` must start with '/'")]
    InvalidContextPath(String),

    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),

    #[error("admin.api_key must not be empty when the admin API is enabled")]
    EmptyApiKey,
}

pub fn validate_config(config: &DispatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.scan_package.trim().is_empty() {
        errors.push(ValidationError::MissingScanPackage);
    }

    if !config.context_path.is_empty() && !config.context_path.starts_with('/') {
        errors.push(ValidationError::InvalidContextPath(config.context_path.clone()));
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NonPositive("timeouts.request_secs"));
    }
    if config.dispatch.max_body_bytes == 0 {
        errors.push(ValidationError::NonPositive("dispatch.max_body_bytes"));
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::EmptyApiKey);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DispatcherConfig {
        DispatcherConfig {
            scan_package: "mvc_dispatch.demo".into(),
            ..DispatcherConfig::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = DispatcherConfig::default();
        config.context_path = "app".into();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MissingScanPackage));
        assert!(errors.contains(&ValidationError::NonPositive("timeouts.request_secs")));
    }

    #[test]
    fn test_admin_checks_only_when_enabled() {
        let mut config = valid();
        config.admin.api_key = String::new();
        assert!(validate_config(&config).is_ok());

        config.admin.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyApiKey]);
    }
}
