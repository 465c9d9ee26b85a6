//! `kotlinc` process invocation.

use ktdsl_api::{CompileError, KotlinCompiler};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs an external `kotlinc`. The program can be overridden with the
/// `KOTLINC` environment variable.
pub struct KotlincCompiler {
    program: PathBuf,
}

impl KotlincCompiler {
    pub fn new() -> Self {
        let program = env::var_os("KOTLINC")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("kotlinc"));
        Self { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn launch_error(&self, source: io::Error) -> CompileError {
        CompileError::Launch {
            program: self.program.display().to_string(),
            source,
        }
    }
}

impl Default for KotlincCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl KotlinCompiler for KotlincCompiler {
    fn compile_to_jar(
        &self,
        output_jar: &Path,
        sources: &[PathBuf],
        classpath: &[PathBuf],
    ) -> Result<(), CompileError> {
        let mut command = Command::new(&self.program);
        command.arg("-d").arg(output_jar);
        if !classpath.is_empty() {
            let joined = env::join_paths(classpath)
                .map_err(|e| self.launch_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
            command.arg("-classpath").arg(joined);
        }
        command.args(sources);

        tracing::debug!("Running {:?}", command);
        let output = command.output().map_err(|e| self.launch_error(e))?;
        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(CompileError::Failed {
                output: output_jar.to_path_buf(),
                status: output.status.to_string(),
                diagnostics,
            });
        }
        if !diagnostics.trim().is_empty() {
            tracing::warn!("kotlinc reported:\n{}", diagnostics.trim_end());
        }
        Ok(())
    }
}
