use clap::Args;
use ktdsl_api::ProjectNode;
use ktdsl_core::write_accessors_to;
use ktdsl_gradle::{
    AccessorsClassPathResolver, FsDirectoryCache, KotlincCompiler, cache_dir_name, cache_key_for,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::node::SnapshotProject;

#[derive(Args)]
pub struct ProjectArgs {
    /// Root directory of the build
    #[arg(value_name = "ROOT_DIR")]
    pub root: PathBuf,
    /// Project path
    #[arg(long, default_value = ":")]
    pub project: String,
    /// Compilation classpath entry, may be repeated
    #[arg(long, value_name = "PATH")]
    pub classpath: Vec<PathBuf>,
    /// JSON schema dump used when the snapshot has no entry for the project
    #[arg(long, value_name = "FILE")]
    pub live_schema: Option<PathBuf>,
    /// Accessors cache directory (default: ~/.ktdsl/accessors)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl ProjectArgs {
    fn node(&self) -> Result<SnapshotProject, Box<dyn std::error::Error>> {
        let node = SnapshotProject::new(&self.root, &self.project);
        Ok(match &self.live_schema {
            Some(file) => node.with_live_schema_file(file)?,
            None => node,
        })
    }

    fn cache(&self) -> FsDirectoryCache {
        self.cache_dir
            .clone()
            .map(FsDirectoryCache::new)
            .unwrap_or_default()
    }

    fn resolver(&self) -> AccessorsClassPathResolver {
        AccessorsClassPathResolver::new(Arc::new(self.cache()), Arc::new(KotlincCompiler::new()))
    }
}

pub fn run_accessors(args: ProjectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let node = args.node()?;
    let classpath = args.resolver().accessors_class_path_for(&node, &args.classpath)?;

    if classpath.is_empty() {
        println!("No schema available for project {}", node.path());
        return Ok(());
    }
    for bin in &classpath.bin {
        println!("bin: {}", bin.display());
    }
    for src in &classpath.src {
        println!("src: {}", src.display());
    }
    Ok(())
}

pub fn run_report(args: ProjectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let node = args.node()?;
    let Some(schema) = args.resolver().configured_project_schema_of(&node)? else {
        return Err(format!("No schema available for project {}", node.path()).into());
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let count = write_accessors_to(&mut out, &schema)?;
    out.flush()?;
    info!("Reported {} accessors for project {}", count, node.path());
    Ok(())
}

pub fn run_cache_key(args: ProjectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let node = args.node()?;
    let Some(schema) = args.resolver().configured_project_schema_of(&node)? else {
        return Err(format!("No schema available for project {}", node.path()).into());
    };

    let key = cache_key_for(&schema, &args.classpath);
    let dir_name = cache_dir_name(&key);
    let cached = args.cache().root().join(&dir_name).is_dir();
    println!("key:\n{}", key.to_key_string());
    println!("directory: {}", dir_name);
    println!("cached: {}", cached);
    Ok(())
}
