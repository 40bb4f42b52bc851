use thiserror::Error;

/// Errors raised while driving the SEI portal
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeiError {
    /// Failed to launch the browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Failed to connect to a running browser
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// Tab (window) creation, lookup or closing failed
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Navigation did not start or did not complete
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript evaluation failed inside the page
    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    /// A page snapshot could not be parsed
    #[error("Failed to parse page HTML: {0}")]
    DomParseFailed(String),

    /// A bounded wait on a frame, container or page signal expired
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// A workflow step could not find its target element within the wait budget
    #[error("Timed out waiting for element {0}")]
    ElementTimeout(String),

    /// An expected element, node, action or record is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// The current page is not the one the operation requires
    #[error("Wrong page state: expected '{expected}', found '{actual}'")]
    WrongPageState { expected: String, actual: String },

    /// A document or record type outside the allowed set
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// An argument outside its enumerated set of options
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// More than one tree node matched a label under the unique-match policy
    #[error("Label '{label}' matches {count} nodes")]
    AmbiguousMatch { label: String, count: usize },

    /// The unit picker has no control titled with the requested unit
    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    /// The listing page-size control could not be located
    #[error("Listing pagination control not found")]
    NoListingControl,

    /// A table row does not have the expected shape
    #[error("Invalid row: expected {expected} cells, found {found}")]
    InvalidRow { expected: usize, found: usize },

    /// A workflow failed for a reason other than the above
    #[error("Workflow '{workflow}' failed: {reason}")]
    WorkflowFailed { workflow: String, reason: String },

    /// Workflow parameters could not be deserialized
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SeiError {
    /// Whether this error comes from an expired bounded wait
    pub fn is_timeout(&self) -> bool {
        matches!(self, SeiError::Timeout(_) | SeiError::ElementTimeout(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SeiError>;
