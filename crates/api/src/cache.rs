use std::path::{Path, PathBuf};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identifies a reusable cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKeySpec {
    pub prefix: String,
    pub components: Vec<String>,
}

impl CacheKeySpec {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            components: Vec::new(),
        }
    }

    pub fn with(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }

    /// The full key string the directory name is derived from.
    pub fn to_key_string(&self) -> String {
        let mut key = self.prefix.clone();
        for component in &self.components {
            key.push('\n');
            key.push_str(component);
        }
        key
    }
}

/// Directory-backed cache shared across builds.
///
/// Implementations guarantee that `populate` runs at most once per key, even
/// across concurrent callers, and that callers never observe a directory
/// whose population has not completed.
pub trait DirectoryCache: Send + Sync {
    fn cache_dir_for(
        &self,
        key: &CacheKeySpec,
        populate: &mut dyn FnMut(&Path) -> Result<(), BoxError>,
    ) -> Result<PathBuf, BoxError>;
}
