use crate::models::{JvmType, ProjectSchema};
use std::path::{Path, PathBuf};

/// A configurable project of the host build.
pub trait ProjectNode: Send + Sync {
    /// Project path, `:` for the root project.
    fn path(&self) -> &str;

    /// Root directory of the whole build.
    fn root_dir(&self) -> &Path;

    fn find_property(&self, name: &str) -> Option<String>;

    /// Whether the project's classloader scope has been finalized.
    fn is_class_loader_scope_locked(&self) -> bool;

    /// Live introspection of the extensions and conventions currently
    /// attached to the project.
    fn introspect_schema(&self) -> ProjectSchema<JvmType>;
}

/// Identity of a project for memoization purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub root_dir: PathBuf,
    pub path: String,
}

impl NodeKey {
    pub fn of(node: &dyn ProjectNode) -> Self {
        Self {
            root_dir: node.root_dir().to_path_buf(),
            path: node.path().to_string(),
        }
    }
}
