//! Structured error types shared across nugen crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every non-event [`NugenError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (channel, energy, index, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Classification of a recoverable, event-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// No kinematic configuration was accepted within the retry budget.
    NoAvailablePhaseSpace,
    /// The hadronization collaborator returned no particles.
    HadronizationFailure,
    /// A decayer claimed a particle but produced no decay products.
    DecayFailure,
    /// The intranuclear cascade could not find a permitted outcome.
    CascadeExhausted,
}

impl FailureKind {
    /// Short stable label used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoAvailablePhaseSpace => "no-available-phase-space",
            FailureKind::HadronizationFailure => "hadronization-failure",
            FailureKind::DecayFailure => "decay-failure",
            FailureKind::CascadeExhausted => "cascade-exhausted",
        }
    }
}

/// Signal raised by a pipeline stage asking the driver to discard the event
/// and restart generation from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Human readable reason.
    pub reason: String,
    /// Whether the remaining stages must be skipped (always true for
    /// failures raised by the built-in stages).
    pub fast_forward: bool,
    /// Number of attempts spent before giving up, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<usize>,
}

impl EventFailure {
    /// Creates a fast-forwarding failure of the given kind.
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            fast_forward: true,
            attempts: None,
        }
    }

    /// Shorthand for [`FailureKind::NoAvailablePhaseSpace`].
    pub fn no_phase_space(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::NoAvailablePhaseSpace, reason)
    }

    /// Shorthand for [`FailureKind::HadronizationFailure`].
    pub fn hadronization(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::HadronizationFailure, reason)
    }

    /// Shorthand for [`FailureKind::DecayFailure`].
    pub fn decay(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::DecayFailure, reason)
    }

    /// Shorthand for [`FailureKind::CascadeExhausted`].
    pub fn cascade(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::CascadeExhausted, reason)
    }

    /// Records the number of attempts spent.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
        self
    }
}

impl Display for EventFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason, self.kind.as_str())?;
        if let Some(attempts) = self.attempts {
            write!(f, " after {attempts} attempts")?;
        }
        Ok(())
    }
}

/// Canonical error type for the nugen engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum NugenError {
    /// Missing or invalid parameter or sub-algorithm. Fatal at setup.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// Numerical degeneracy that could not be clamped.
    #[error("kinematics error: {0}")]
    Kinematics(ErrorInfo),
    /// Violation of the event record contract.
    #[error("event record error: {0}")]
    Record(ErrorInfo),
    /// Serialization and I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Recoverable event-level failure: discard the event and retry.
    #[error("event abandoned: {0}")]
    Event(EventFailure),
    /// The driver ran out of full-event attempts.
    #[error("generation exhausted: {0}")]
    Exhausted(ErrorInfo),
}

impl NugenError {
    /// Builds a configuration error.
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        NugenError::Config(ErrorInfo::new(code, message))
    }

    /// Builds an event record error.
    pub fn record(code: impl Into<String>, message: impl Into<String>) -> Self {
        NugenError::Record(ErrorInfo::new(code, message))
    }

    /// Builds a kinematics error.
    pub fn kinematics(code: impl Into<String>, message: impl Into<String>) -> Self {
        NugenError::Kinematics(ErrorInfo::new(code, message))
    }

    /// Returns the structured payload, if the variant carries one.
    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            NugenError::Config(info)
            | NugenError::Kinematics(info)
            | NugenError::Record(info)
            | NugenError::Serde(info)
            | NugenError::Exhausted(info) => Some(info),
            NugenError::Event(_) => None,
        }
    }

    /// Returns the event failure carried by recoverable errors.
    pub fn failure(&self) -> Option<&EventFailure> {
        match self {
            NugenError::Event(failure) => Some(failure),
            _ => None,
        }
    }

    /// True when the driver should restart the event instead of aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NugenError::Event(_))
    }
}

impl From<EventFailure> for NugenError {
    fn from(failure: EventFailure) -> Self {
        NugenError::Event(failure)
    }
}
