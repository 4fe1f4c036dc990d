use std::path::PathBuf;

/// Why a display or presence check produced no data.
///
/// The boolean entry points on [`MetadataView`](crate::view::MetadataView)
/// collapse every variant to `false`; callers that need to tell a corrupt
/// file apart from a file without metadata use the `try_*` variants instead.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized image format")]
    UnrecognizedFormat,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
