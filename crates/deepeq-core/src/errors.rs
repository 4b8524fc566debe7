use crate::compare::model::ComparisonKind;
use crate::render::RenderedDiff;
use thiserror::Error;

/// Result type alias using DeepEqError
pub type Result<T> = std::result::Result<T, DeepEqError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and tests. `AssertionFailed` is the distinguished kind
/// carried by a failed comparison; every other kind is a usage error raised
/// synchronously at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Usage
    InvalidInput,
    InvalidOptions,

    // Heap construction
    NotAComposite,
    NotExtensible,
    NotConfigurable,

    // Outcome
    /// The comparison completed and the values are not equivalent
    AssertionFailed,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidOptions => "ERR_INVALID_OPTIONS",
            ExErrorKind::NotAComposite => "ERR_NOT_A_COMPOSITE",
            ExErrorKind::NotExtensible => "ERR_NOT_EXTENSIBLE",
            ExErrorKind::NotConfigurable => "ERR_NOT_CONFIGURABLE",
            ExErrorKind::AssertionFailed => "ERR_ASSERTION_FAILED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Everything a failed `assert` call reports besides its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    /// Caller message or the selected human message, with context appended
    pub message: String,
    /// Bounded side-by-side rendering of the whole comparison
    pub diff: RenderedDiff,
    /// Path of the deepest failing node (`actual.a[0]`)
    pub path: String,
    /// Kind of the deepest failing node
    pub kind: ComparisonKind,
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus context for
/// debugging. Assertion failures carry an [`AssertionFailure`].
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
    failure: Option<Box<AssertionFailure>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            message: String::new(),
            source: None,
            failure: None,
        }
    }

    /// Create the distinguished assertion failure error
    pub fn assertion_failed(failure: AssertionFailure) -> Self {
        Self::new(ExErrorKind::AssertionFailed)
            .with_op("assert")
            .with_path(failure.path.clone())
            .with_message(failure.message.clone())
            .with_failure(failure)
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add value path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    fn with_failure(mut self, failure: AssertionFailure) -> Self {
        self.failure = Some(Box::new(failure));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the value path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// True when this error reports a failed comparison rather than misuse
    pub fn is_assertion_failure(&self) -> bool {
        self.kind == ExErrorKind::AssertionFailed
    }

    /// Get the assertion failure details, if this is an assertion failure
    pub fn failure(&self) -> Option<&AssertionFailure> {
        self.failure.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_assertion_failure() {
            return write!(f, "{}", self.message);
        }
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Usage errors raised while building values, expectations or options
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeepEqError {
    /// Regular expression given to `matches` does not compile
    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A numeric combinator argument is NaN or infinite
    #[error("Argument `{argument}` must be a finite number, got {value}")]
    NonFiniteNumber { argument: String, value: f64 },

    /// `between` bounds are inverted
    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    /// `close_to` precision is out of range
    #[error("Invalid precision {precision}: must be at most {max}")]
    InvalidPrecision { precision: u32, max: u32 },

    /// `any` was given something that is not a constructor
    #[error("any() expects a constructor, got {found}")]
    InvalidConstructor { found: String },

    /// A rendering option has the wrong type or an unusable value
    #[error("Invalid option `{key}`: {reason}")]
    InvalidOption { key: String, reason: String },

    /// Heap operation targeted a primitive
    #[error("{op} expects a composite value, got {found}")]
    NotAComposite { op: String, found: String },

    /// Heap operation tried to add an attribute to a non-extensible composite
    #[error("Cannot define `{key}`: composite is not extensible")]
    NotExtensible { key: String },

    /// Heap operation tried to redefine a non-configurable attribute
    #[error("Cannot redefine non-configurable attribute `{key}`")]
    NotConfigurable { key: String },
}

/// Conversion from DeepEqError to ExError
impl From<DeepEqError> for ExError {
    fn from(err: DeepEqError) -> Self {
        let message = err.to_string();
        match err {
            DeepEqError::InvalidPattern { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("matches")
                .with_message(message),
            DeepEqError::NonFiniteNumber { .. } | DeepEqError::InvalidPrecision { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            DeepEqError::InvalidConstructor { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("any")
                .with_message(message),
            DeepEqError::InvalidRange { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("between")
                .with_message(message),
            DeepEqError::InvalidOption { .. } => {
                ExError::new(ExErrorKind::InvalidOptions).with_message(message)
            }
            DeepEqError::NotAComposite { op, .. } => ExError::new(ExErrorKind::NotAComposite)
                .with_op(op)
                .with_message(message),
            DeepEqError::NotExtensible { .. } => {
                ExError::new(ExErrorKind::NotExtensible).with_message(message)
            }
            DeepEqError::NotConfigurable { .. } => {
                ExError::new(ExErrorKind::NotConfigurable).with_message(message)
            }
        }
    }
}
