//! Ahead-of-time project schema snapshot.
//!
//! The snapshot is a JSON object keyed by project path:
//! `{ ":app": { "extensions": { "java": "..." }, "conventions": {} } }`.

use ktdsl_api::SchemaError;
use ktdsl_api::models::MultiProjectSchema;
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the snapshot relative to the build root directory.
pub const PROJECT_SCHEMA_RESOURCE_PATH: &str = "gradle/project-schema.json";

pub fn snapshot_path(root_dir: &Path) -> PathBuf {
    root_dir.join(PROJECT_SCHEMA_RESOURCE_PATH)
}

/// Loads the snapshot of the build rooted at `root_dir`, `None` if the build
/// has none.
pub fn load_multi_project_schema(root_dir: &Path) -> Result<Option<MultiProjectSchema>, SchemaError> {
    let path = snapshot_path(root_dir);
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = fs::read(&path).map_err(|source| SchemaError::Io {
        path: path.clone(),
        source,
    })?;
    let schemas: MultiProjectSchema =
        serde_json::from_slice(&bytes).map_err(|source| SchemaError::Json {
            path: path.clone(),
            source,
        })?;
    tracing::debug!(
        "Loaded schema snapshot {} ({} projects)",
        path.display(),
        schemas.len()
    );
    Ok(Some(schemas))
}

/// Writes the snapshot of the build rooted at `root_dir` and returns its path.
pub fn write_multi_project_schema(
    root_dir: &Path,
    schemas: &MultiProjectSchema,
) -> Result<PathBuf, SchemaError> {
    let path = snapshot_path(root_dir);
    let io_error = |source| SchemaError::Io {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_vec_pretty(schemas).map_err(|source| SchemaError::Json {
        path: path.clone(),
        source,
    })?;

    // Write to a sibling file first so readers never see a partial snapshot.
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json).map_err(io_error)?;
    fs::rename(&temp_path, &path).map_err(io_error)?;
    Ok(path)
}
