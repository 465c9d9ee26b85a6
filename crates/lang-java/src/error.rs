use ktdsl_api::SignatureError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassReadError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Malformed class file {entry}: {message}")]
    ClassFormat { entry: String, message: String },
    #[error("Malformed signature in {entry}: {source}")]
    Signature {
        entry: String,
        #[source]
        source: SignatureError,
    },
}

pub type Result<T> = std::result::Result<T, ClassReadError>;
