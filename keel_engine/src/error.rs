//! Error types for the Keel engine
//!
//! This module defines the error type shared by the asset pipeline,
//! the background executor and the GL framebuffer layer.

use std::fmt;

/// Result type for Keel engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reason reported by the GL driver when a framebuffer is not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBufferStatus {
    /// An attachment point is not framebuffer-attachment complete
    IncompleteAttachment,
    /// Attached images do not share the same dimensions
    IncompleteDimensions,
    /// No image is attached to the framebuffer
    MissingAttachment,
    /// The combination of internal formats is not supported
    Unsupported,
    /// Attachments disagree on their sample count
    MultisampleMismatch,
    /// Any other status code returned by the driver
    Unknown(u32),
}

impl fmt::Display for FrameBufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBufferStatus::IncompleteAttachment => write!(f, "incomplete attachment"),
            FrameBufferStatus::IncompleteDimensions => write!(f, "incomplete dimensions"),
            FrameBufferStatus::MissingAttachment => write!(f, "missing attachment"),
            FrameBufferStatus::Unsupported => write!(f, "unsupported combination of formats"),
            FrameBufferStatus::MultisampleMismatch => write!(f, "multisample mismatch"),
            FrameBufferStatus::Unknown(code) => write!(f, "unknown error {}", code),
        }
    }
}

/// Keel engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (GL driver, worker pool, ...)
    BackendError(String),

    /// Invalid resource or misuse of an API (unknown asset, wrong type, ...)
    InvalidResource(String),

    /// Initialization failed (engine, executor, subsystems)
    InitializationFailed(String),

    /// Framebuffer configuration rejected before any GPU allocation
    Configuration(String),

    /// Framebuffer allocated but reported incomplete (everything was released)
    IncompleteFrameBuffer(FrameBufferStatus),

    /// File system error
    Io(String),

    /// An asset could not be loaded
    LoadingFailed {
        /// Logical file name of the asset
        file_name: String,
        /// Description of the underlying failure
        message: String,
    },
}

impl Error {
    /// Wrap this error into a loading failure for `file_name`
    pub fn for_asset(self, file_name: &str, context: &str) -> Error {
        Error::LoadingFailed {
            file_name: file_name.to_string(),
            message: format!("{}: {}", context, self),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::IncompleteFrameBuffer(status) => {
                write!(f, "Frame buffer couldn't be constructed: {}", status)
            }
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
            Error::LoadingFailed { file_name, message } => {
                write!(f, "Couldn't load asset '{}': {}", file_name, message)
            }
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an error variant, logging it at ERROR severity first
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("keel::AssetManager", InvalidResource, "Asset not loaded: {}", name);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::keel::Error::$variant(message)
    }};
}

/// Log and return an error variant from the current function
///
/// # Example
///
/// ```ignore
/// engine_bail!("keel::FrameBufferBuilder", Configuration, "Multisample requires GLES 3.0+");
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
