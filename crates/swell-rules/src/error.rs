//! Error types for rule loading and validation.

use thiserror::Error;

pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while loading or validating rule configurations.
///
/// All of these are configuration errors. A rule set that loads cleanly
/// can always be evaluated; the engine itself never rejects a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON rules: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("invalid TOML rules: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("unsupported rules file extension: {0}")]
    UnsupportedFormat(String),

    #[error("rule name must not be empty")]
    EmptyRuleName,

    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("rule '{0}' contains an empty condition group")]
    EmptyConditionGroup(String),

    #[error("unknown scaling profile: {0}")]
    UnknownProfile(String),
}
