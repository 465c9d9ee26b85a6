pub mod classpath;
pub mod compiler;
pub mod error;
pub mod fs_cache;
pub mod snapshot;

pub use classpath::{AccessorsClassPathResolver, cache_dir_name, cache_key_for};
pub use compiler::KotlincCompiler;
pub use error::{ClassPathError, Result};
pub use fs_cache::FsDirectoryCache;
pub use snapshot::{
    PROJECT_SCHEMA_RESOURCE_PATH, load_multi_project_schema, write_multi_project_schema,
};
