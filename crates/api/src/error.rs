use std::path::PathBuf;

/// A single member could not be turned into an extension declaration.
#[derive(Debug, thiserror::Error)]
#[error("Failed to generate extension for {class}.{method}({}): {message}", .parameter_types.join(", "))]
pub struct ExtensionError {
    pub class: String,
    pub method: String,
    pub parameter_types: Vec<String>,
    pub message: String,
}

/// Malformed JVM generic signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid signature `{signature}` at offset {offset}: {reason}")]
pub struct SignatureError {
    pub signature: String,
    pub offset: usize,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Failed to launch compiler `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Compilation of {} failed ({status}):\n{diagnostics}", .output.display())]
    Failed {
        output: PathBuf,
        status: String,
        diagnostics: String,
    },
}
