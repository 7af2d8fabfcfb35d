//! Configuration issues reported by config validation.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `provider.base_url` is not an http(s) URL.
    InvalidBaseUrl,
    /// `provider.timeout_seconds` is zero.
    ZeroTimeout,
    /// `models.active` is empty: nothing can be created until a model is added.
    NoActiveModels,
    /// A model entry has an empty id.
    EmptyModelId,
    /// The same model id appears twice in `models.active`.
    DuplicateActiveModel,
    /// `session.autosave_ms` is zero, so every change writes to disk.
    AutosaveDisabled,
}

/// A detected issue in the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
