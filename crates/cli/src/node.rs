use ktdsl_api::models::{JvmType, ProjectSchema};
use ktdsl_api::{ProjectNode, SchemaError};
use ktdsl_gradle::classpath::{ACCESSORS_PROPERTY, LIVE_INTROSPECTION_VALUE};
use std::fs;
use std::path::{Path, PathBuf};

/// A project of a build on disk, outside of a running build.
///
/// Its schema comes from the build's snapshot. A schema dump taken after the
/// project was configured can stand in for live introspection.
pub struct SnapshotProject {
    root_dir: PathBuf,
    path: String,
    live_schema: Option<ProjectSchema<JvmType>>,
}

impl SnapshotProject {
    pub fn new(root_dir: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            path: path.into(),
            live_schema: None,
        }
    }

    pub fn with_live_schema_file(mut self, file: &Path) -> Result<Self, SchemaError> {
        let bytes = fs::read(file).map_err(|source| SchemaError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let schema = serde_json::from_slice(&bytes).map_err(|source| SchemaError::Json {
            path: file.to_path_buf(),
            source,
        })?;
        self.live_schema = Some(schema);
        Ok(self)
    }
}

impl ProjectNode for SnapshotProject {
    fn path(&self) -> &str {
        &self.path
    }

    fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn find_property(&self, name: &str) -> Option<String> {
        (name == ACCESSORS_PROPERTY && self.live_schema.is_some())
            .then(|| LIVE_INTROSPECTION_VALUE.to_string())
    }

    fn is_class_loader_scope_locked(&self) -> bool {
        true
    }

    fn introspect_schema(&self) -> ProjectSchema<JvmType> {
        self.live_schema.clone().unwrap_or_default()
    }
}
