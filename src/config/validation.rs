//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the base path shape and controller discovery settings
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: KernelConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::KernelConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("kernel.route must be empty or start with '/' (got {0:?})")]
    BasePathNotAbsolute(String),

    #[error("kernel.route must not end with '/' (got {0:?})")]
    BasePathTrailingSlash(String),

    #[error("kernel.controller_extension must be non-empty and contain no dot (got {0:?})")]
    ControllerExtension(String),

    #[error("kernel.routes_file must not be empty")]
    EmptyRoutesFile,

    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &KernelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let kernel = &config.kernel;

    if !kernel.route.is_empty() {
        if !kernel.route.starts_with('/') {
            errors.push(ValidationError::BasePathNotAbsolute(kernel.route.clone()));
        }
        if kernel.route.ends_with('/') {
            errors.push(ValidationError::BasePathTrailingSlash(kernel.route.clone()));
        }
    }

    if kernel.controller_extension.is_empty() || kernel.controller_extension.contains('.') {
        errors.push(ValidationError::ControllerExtension(
            kernel.controller_extension.clone(),
        ));
    }

    if kernel.routes_file.is_empty() {
        errors.push(ValidationError::EmptyRoutesFile);
    }

    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
