//! `ktdsl.json` configuration of the extension generator.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KtdslError, Result};

pub const CONFIG_FILE_NAME: &str = "ktdsl.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Package prefixes whose classes are scanned.
    pub include: Vec<String>,
    /// Package prefixes excluded from scanning.
    pub exclude: Vec<String>,
    /// JSON documentation index, see `KDocIndex`.
    pub docs: Option<PathBuf>,
    /// Generated source file.
    pub output: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            include: vec!["org.gradle.api".to_string()],
            exclude: vec!["org.gradle.api.internal".to_string()],
            docs: None,
            output: PathBuf::from("GradleApiExtensions.kt"),
        }
    }
}

impl GeneratorConfig {
    /// Reads `path`. Relative paths inside the file are resolved against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: GeneratorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        if let Some(base) = path.parent() {
            config.output = base.join(&config.output);
            config.docs = config.docs.map(|docs| base.join(docs));
        }
        Ok(config)
    }

    /// Loads `ktdsl.json` from `dir` if present, the defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(prefix) = self
            .include
            .iter()
            .chain(&self.exclude)
            .find(|p| p.is_empty() || p.contains('/'))
        {
            return Err(KtdslError::Config(format!(
                "package prefix `{}` must be a non-empty dotted name",
                prefix
            )));
        }
        Ok(())
    }
}
