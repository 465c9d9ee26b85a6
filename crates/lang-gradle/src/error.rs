use ktdsl_api::{BoxError, CompileError, SchemaError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClassPathError {
    #[error(
        "Cannot introspect the schema of project `{path}`: its classloader scope is not locked yet"
    )]
    PreconditionViolation { path: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to write accessors source {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile project accessors")]
    Compile(#[from] CompileError),

    #[error("Failed to materialize cache directory `{dir_name}`")]
    Cache {
        dir_name: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, ClassPathError>;
