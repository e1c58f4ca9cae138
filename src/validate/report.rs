//! Validation report: the errors and warnings collected by one validation pass

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::config::Severity;

/// A single error or warning, with the manifest file it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub file: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{} [{}]", self.message, file),
            None => f.write_str(&self.message),
        }
    }
}

// The JSON report lists plain messages, so findings serialize as their message.
impl Serialize for Finding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message)
    }
}

impl<'de> Deserialize<'de> for Finding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let message = String::deserialize(deserializer)?;
        Ok(Finding {
            message,
            file: None,
        })
    }
}

/// Errors and warnings in the order they were found
///
/// A bundle is valid iff `errors` is empty once every check has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(default)]
    errors: Vec<Finding>,
    #[serde(default)]
    warnings: Vec<Finding>,
}

impl ValidationReport {
    pub fn error(&mut self, message: impl Into<String>, file: Option<&str>) {
        self.record(Severity::Error, message.into(), file);
    }

    pub fn warning(&mut self, message: impl Into<String>, file: Option<&str>) {
        self.record(Severity::Warning, message.into(), file);
    }

    /// Record a finding at a configurable severity
    pub fn record(&mut self, severity: Severity, message: impl Into<String>, file: Option<&str>) {
        let finding = Finding {
            message: message.into(),
            file: file.map(str::to_string),
        };
        let file = finding.file.as_deref().unwrap_or("-");
        match severity {
            Severity::Error => {
                debug!(severity = "error", file, "{}", finding.message);
                self.errors.push(finding);
            }
            Severity::Warning => {
                debug!(severity = "warning", file, "{}", finding.message);
                self.warnings.push(finding);
            }
        }
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|f| f.message.as_str()).collect()
    }

    pub fn warning_messages(&self) -> Vec<&str> {
        self.warnings.iter().map(|f| f.message.as_str()).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append another report's findings after this one's
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Serialize as `{"errors": [...], "warnings": [...]}`
    ///
    /// # Errors
    ///
    /// Returns `CourierError::IoError` if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
