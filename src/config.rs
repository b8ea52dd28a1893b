// Report configuration: schema version, separators and the names of the OTF switches
use crate::collaborators::OtfVariables;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Switch (boolean) that adds the cities/chains/properties criteria to the main line.
pub const OTF_LOG_REQUEST_CRITERIA: &str = "HOS_APD_LOG_REQUEST_CRITERIA";
/// Switch (`"Y"` to enable) that appends `-sampling` / `-crawling` to the functionality.
pub const OTF_ENCODE_CRAWLING_SAMPLING: &str = "HOS_APD_LOG_REPORT_ENCODE_CRAWLING_SAMPLING";

// Separator tokens shared with the downstream log parsers.
// Changing any of them, or the line layout, requires bumping the log version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Separators {
    pub field: String,
    pub section: String,
    pub value: String,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            field: ";".to_string(),
            section: "|".to_string(),
            value: ",".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub log_version: u32,
    pub separators: Separators,
    pub request_criteria_variable: String,
    pub crawling_sampling_variable: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_version: 1,
            separators: Separators::default(),
            request_criteria_variable: OTF_LOG_REQUEST_CRITERIA.to_string(),
            crawling_sampling_variable: OTF_ENCODE_CRAWLING_SAMPLING.to_string(),
        }
    }
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ReportConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parsers split on the separators, so they must be non-empty and pairwise distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Separators {
            field,
            section,
            value,
        } = &self.separators;

        if field.is_empty() || section.is_empty() || value.is_empty() {
            return Err(ConfigError::InvalidFormat(
                "separators must not be empty".to_string(),
            ));
        }
        if field == section || field == value || section == value {
            return Err(ConfigError::InvalidFormat(format!(
                "separators must be distinct: field={:?} section={:?} value={:?}",
                field, section, value
            )));
        }
        Ok(())
    }
}

/// OTF switches resolved once per report, before any formatting happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    pub include_request_criteria: bool,
    pub encode_crawling_sampling: bool,
}

impl ReportOptions {
    pub fn resolve(config: &ReportConfig, otf: &dyn OtfVariables) -> Self {
        Self {
            include_request_criteria: otf.get_bool(&config.request_criteria_variable, false),
            encode_crawling_sampling: otf
                .get(&config.crawling_sampling_variable)
                .map_or(false, |value| value == "Y"),
        }
    }
}
