pub mod cache;
pub mod compiler;
pub mod error;
pub mod models;
pub mod project;

// Re-export commonly used types
pub use cache::{BoxError, CacheKeySpec, DirectoryCache};
pub use compiler::KotlinCompiler;
pub use error::{CompileError, ExtensionError, SchemaError, SignatureError};
pub use models::*;
pub use project::{NodeKey, ProjectNode};
