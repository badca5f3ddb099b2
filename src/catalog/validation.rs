//! Validation for catalog records.
//!
//! Shards are validated record by record after parsing; a single invalid
//! record makes the whole shard unusable for the current sync pass.

use super::models::{Singer, Software};
use std::fmt;

/// Validation error types
#[derive(Debug)]
pub enum ValidationError {
    EmptyField {
        field: &'static str,
    },
    MissingNames {
        id: String,
    },
    NoVariants,
    VariantIdNotPrefixed {
        variant_id: String,
        singer_id: String,
    },
    VariantWithoutDownload {
        variant_id: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' is required but was empty", field)
            }
            ValidationError::MissingNames { id } => {
                write!(f, "'{}' must have at least one name", id)
            }
            ValidationError::NoVariants => write!(f, "Singer must have at least one variant"),
            ValidationError::VariantIdNotPrefixed {
                variant_id,
                singer_id,
            } => write!(
                f,
                "Variant '{}' is not prefixed by singer id '{}'",
                variant_id, singer_id
            ),
            ValidationError::VariantWithoutDownload { variant_id } => write!(
                f,
                "Variant '{}' needs a file url or a download page url",
                variant_id
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a singer and all of its variants
pub fn validate_singer(singer: &Singer) -> ValidationResult<()> {
    if singer.id.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "id" });
    }
    if singer.names.is_empty() {
        return Err(ValidationError::MissingNames {
            id: singer.id.clone(),
        });
    }
    if singer.variants.is_empty() {
        return Err(ValidationError::NoVariants);
    }
    for variant in &singer.variants {
        if !variant.id.starts_with(&singer.id) {
            return Err(ValidationError::VariantIdNotPrefixed {
                variant_id: variant.id.clone(),
                singer_id: singer.id.clone(),
            });
        }
        if variant.names.is_empty() {
            return Err(ValidationError::MissingNames {
                id: variant.id.clone(),
            });
        }
        if variant.file_url.is_none() && variant.download_page_url.is_none() {
            return Err(ValidationError::VariantWithoutDownload {
                variant_id: variant.id.clone(),
            });
        }
    }
    Ok(())
}

/// Validate a software entry
pub fn validate_software(software: &Software) -> ValidationResult<()> {
    if software.id.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "id" });
    }
    if software.names.is_empty() {
        return Err(ValidationError::MissingNames {
            id: software.id.clone(),
        });
    }
    Ok(())
}
