// src/models/profile.rs

//! Profile definitions: one template per tracker-software family.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::models::rule::RuleNode;
use crate::models::schema::ParseSchema;

/// Identifying metadata of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeta {
    /// Unique, stable identifier, e.g. "nexusphp".
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Site-software family label surfaced to callers.
    pub family: String,

    /// Template version.
    pub version: String,
}

/// An immutable, versioned site template: how to recognize one
/// tracker-software family and how to parse its pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub meta: ProfileMeta,

    /// Boolean rule tree used for identification.
    pub verify: RuleNode,

    /// Named extraction schemas ("list", "detail", ...). A profile with no
    /// schemas is legal: some templates only identify.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, ParseSchema>,
}

/// Permissive mirror of [`Profile`] used to produce field-naming validation
/// errors instead of opaque deserialization failures.
#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    meta: RawMeta,
    verify: Option<RuleNode>,
    #[serde(default)]
    schemas: BTreeMap<String, ParseSchema>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    id: Option<String>,
    name: Option<String>,
    family: Option<String>,
    version: Option<String>,
}

impl Profile {
    /// Parse a profile from its TOML definition and validate it.
    ///
    /// `origin` labels the definition in errors (file stem, usually).
    pub fn from_toml(source: &str, origin: &str) -> Result<Self> {
        let raw: RawProfile = toml::from_str(source)?;
        raw.validate(origin)
    }

    /// Serialize back to the native TOML definition format.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl RawProfile {
    /// Check required fields and compile every schema.
    fn validate(self, origin: &str) -> Result<Profile> {
        let id = match self.meta.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(ProfileError::validation(origin, "meta.id")),
        };
        let family = match self.meta.family {
            Some(family) if !family.trim().is_empty() => family,
            _ => return Err(ProfileError::validation(&id, "meta.family")),
        };
        let verify = self
            .verify
            .ok_or_else(|| ProfileError::validation(&id, "verify"))?;

        // Reject malformed CSS at load, not at extraction.
        for (name, schema) in &self.schemas {
            schema.compile(name)?;
        }

        let name = self.meta.name.unwrap_or_else(|| id.clone());
        let version = self.meta.version.unwrap_or_else(|| "1".to_string());

        Ok(Profile {
            meta: ProfileMeta {
                id,
                name,
                family,
                version,
            },
            verify,
            schemas: self.schemas,
        })
    }
}

/// How an identification result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// The profile's verify rules ran against the live site.
    Verified,

    /// Rebuilt from a previously persisted match, no re-verification.
    Cached,
}

/// Output of one identification: which profile matched and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub profile_id: String,
    pub family: String,
    pub version: String,
    pub source: MatchSource,
}
