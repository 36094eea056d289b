//! Result and error types for Ensayar.
//!
//! Three failure families exist: assertion/locator failures (terminal for the
//! scenario they occur in), step registration errors (startup-time, never a
//! runtime concern), and driver/infrastructure errors. There are no retries
//! and no partial-failure recovery at this layer.

use thiserror::Error;

/// Result type for Ensayar operations
pub type EnsayarResult<T> = Result<T, EnsayarError>;

/// Errors that can occur in Ensayar
#[derive(Debug, Error)]
pub enum EnsayarError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched the selector
    #[error("No element matched selector {selector}")]
    ElementNotFound {
        /// Selector that failed to resolve
        selector: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// Step pattern registered twice
    #[error("Duplicate step pattern: {pattern}")]
    DuplicateStep {
        /// The offending pattern source
        pattern: String,
    },

    /// Step text matched more than one registered pattern
    #[error("Ambiguous step '{text}' matches: {patterns:?}")]
    AmbiguousStep {
        /// The step text
        text: String,
        /// All matching pattern sources
        patterns: Vec<String>,
    },

    /// Step text matched no registered pattern
    #[error("No step definition matches '{text}'")]
    UndefinedStep {
        /// The step text
        text: String,
    },

    /// Step pattern could not be compiled
    #[error("Invalid step pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern source
        pattern: String,
        /// Error message
        message: String,
    },

    /// Extracted placeholder value had the wrong type or index
    #[error("Step argument {index}: {message}")]
    Argument {
        /// Zero-based placeholder index
        index: usize,
        /// Error message
        message: String,
    },

    /// A step named a control the page does not expose
    #[error("No control named '{name}' on this page")]
    UnknownControl {
        /// The control name from the step text
        name: String,
    },

    /// Scenario file could not be parsed
    #[error("Scenario parse error at line {line}: {message}")]
    ScenarioParse {
        /// One-based line number
        line: usize,
        /// Error message
        message: String,
    },

    /// Fixture error (scenario setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnsayarError {
    /// Whether this error was raised at step registration time rather than
    /// while a scenario was running.
    #[must_use]
    pub const fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateStep { .. } | Self::InvalidPattern { .. }
        )
    }
}
