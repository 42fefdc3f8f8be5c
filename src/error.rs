//! Error types for annotation statistics runs.

use thiserror::Error;

/// Main error type for a statistics scan.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested project does not exist in the catalog.
    #[error("Project ID={0} not found")]
    ProjectNotFound(u64),

    /// The project exists but does not hold images.
    #[error("Project {name:?} has type {kind:?}. Only image projects can be scanned")]
    WrongProjectKind { name: String, kind: String },

    /// Invalid configuration or schema.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An annotation references a class missing from the project schema.
    #[error("Image {image}: unknown object class {class:?}")]
    UnknownClass { class: String, image: u64 },

    /// Upstream catalog failure while listing or downloading.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Image encode/decode error
    #[error("Image processing error: {0}")]
    Image(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether a retry of the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

/// Specialized Result type for annostat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ProjectNotFound(502);
        assert_eq!(err.to_string(), "Project ID=502 not found");

        let err = Error::UnknownClass { class: "bus".into(), image: 7 };
        assert_eq!(err.to_string(), "Image 7: unknown object class \"bus\"");
    }

    #[test]
    fn test_only_fetch_errors_are_transient() {
        assert!(Error::Fetch("timeout".into()).is_transient());
        assert!(!Error::ProjectNotFound(1).is_transient());
        assert!(!Error::Config("bad".into()).is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
