// src/error.rs

//! Unified error handling for the profile engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for profile engine operations.
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Unified engine error type.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// A profile definition is missing a required field
    #[error("profile '{profile}' is missing required field '{field}'")]
    Validation { profile: String, field: String },

    /// A parse schema carries a malformed CSS selector
    #[error("schema '{schema}': invalid selector '{selector}': {message}")]
    Schema {
        schema: String,
        selector: String,
        message: String,
    },

    /// Page fetch failed
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Referenced profile id is not in the store
    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    /// Referenced schema name is not defined on the profile
    #[error("profile '{profile}' has no schema named '{schema}'")]
    UnknownSchema { profile: String, schema: String },
}

impl ProfileError {
    /// Create a validation error naming the missing field.
    pub fn validation(profile: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            profile: profile.into(),
            field: field.into(),
        }
    }

    /// Create a schema error for a malformed selector.
    pub fn schema(
        schema: impl Into<String>,
        selector: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Schema {
            schema: schema.into(),
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error with the requested URL as context.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an unknown-schema error.
    pub fn unknown_schema(profile: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::UnknownSchema {
            profile: profile.into(),
            schema: schema.into(),
        }
    }
}
