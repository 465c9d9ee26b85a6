use crate::error::CompileError;
use std::path::{Path, PathBuf};

/// External Kotlin compiler.
pub trait KotlinCompiler: Send + Sync {
    /// Compiles `sources` against `classpath` into a single jar.
    fn compile_to_jar(
        &self,
        output_jar: &Path,
        sources: &[PathBuf],
        classpath: &[PathBuf],
    ) -> Result<(), CompileError>;
}
