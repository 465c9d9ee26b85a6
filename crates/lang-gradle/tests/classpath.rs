use ktdsl_api::models::{JvmType, MultiProjectSchema, ProjectSchema};
use ktdsl_api::{CompileError, KotlinCompiler, ProjectNode};
use ktdsl_gradle::classpath::{ACCESSORS_JAR, ACCESSORS_PROPERTY, ACCESSORS_SOURCE};
use ktdsl_gradle::{
    AccessorsClassPathResolver, ClassPathError, FsDirectoryCache, write_multi_project_schema,
};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::tempdir;

struct MockNode {
    root_dir: PathBuf,
    path: String,
    properties: HashMap<String, String>,
    locked: bool,
    schema: ProjectSchema<JvmType>,
    introspections: AtomicUsize,
}

impl MockNode {
    fn new(root_dir: &Path, path: &str) -> Self {
        Self {
            root_dir: root_dir.to_path_buf(),
            path: path.to_string(),
            properties: HashMap::new(),
            locked: true,
            schema: ProjectSchema::default(),
            introspections: AtomicUsize::new(0),
        }
    }

    fn live(self, extensions: &[(&str, &str)]) -> Self {
        self.live_with(extensions, &[])
    }

    fn live_with(mut self, extensions: &[(&str, &str)], conventions: &[(&str, &str)]) -> Self {
        fn registry(pairs: &[(&str, &str)]) -> BTreeMap<String, JvmType> {
            pairs
                .iter()
                .map(|(n, t)| (n.to_string(), JvmType::plain(*t)))
                .collect()
        }
        self.properties
            .insert(ACCESSORS_PROPERTY.to_string(), "auto".to_string());
        self.schema = ProjectSchema::new(registry(extensions), registry(conventions));
        self
    }
}

impl ProjectNode for MockNode {
    fn path(&self) -> &str {
        &self.path
    }

    fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn find_property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn is_class_loader_scope_locked(&self) -> bool {
        self.locked
    }

    fn introspect_schema(&self) -> ProjectSchema<JvmType> {
        self.introspections.fetch_add(1, Ordering::SeqCst);
        self.schema.clone()
    }
}

#[derive(Default)]
struct CountingCompiler {
    calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl KotlinCompiler for CountingCompiler {
    fn compile_to_jar(
        &self,
        output_jar: &Path,
        sources: &[PathBuf],
        _classpath: &[PathBuf],
    ) -> Result<(), CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CompileError::Failed {
                output: output_jar.to_path_buf(),
                status: "exit status: 1".to_string(),
                diagnostics: "error: unresolved reference".to_string(),
            });
        }
        assert!(sources.iter().all(|s| s.is_file()));
        fs::write(output_jar, b"PK").unwrap();
        Ok(())
    }
}

struct Fixture {
    _cache_dir: tempfile::TempDir,
    cache: Arc<FsDirectoryCache>,
    compiler: Arc<CountingCompiler>,
}

impl Fixture {
    fn new() -> Self {
        let cache_dir = tempdir().unwrap();
        Self {
            cache: Arc::new(FsDirectoryCache::new(cache_dir.path())),
            _cache_dir: cache_dir,
            compiler: Arc::new(CountingCompiler::default()),
        }
    }

    fn resolver(&self) -> AccessorsClassPathResolver {
        AccessorsClassPathResolver::new(self.cache.clone(), self.compiler.clone())
    }

    fn compilations(&self) -> usize {
        self.compiler.calls.load(Ordering::SeqCst)
    }
}

#[test]
fn test_no_schema_yields_empty_classpath() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let node = MockNode::new(root.path(), ":");

    let classpath = fixture
        .resolver()
        .accessors_class_path_for(&node, &[])
        .unwrap();
    assert!(classpath.is_empty());
    assert_eq!(fixture.compilations(), 0);
    assert_eq!(node.introspections.load(Ordering::SeqCst), 0);
}

#[test]
fn test_live_schema_is_generated_and_compiled() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let node = MockNode::new(root.path(), ":app")
        .live(&[("java", "org.gradle.api.plugins.JavaPluginExtension")]);

    let classpath = fixture
        .resolver()
        .accessors_class_path_for(&node, &[PathBuf::from("/lib/gradle-api.jar")])
        .unwrap();

    assert_eq!(classpath.bin.len(), 1);
    assert_eq!(classpath.src.len(), 1);
    assert!(classpath.bin[0].ends_with(ACCESSORS_JAR));
    assert!(classpath.bin[0].is_file());
    let source = fs::read_to_string(classpath.src[0].join(ACCESSORS_SOURCE)).unwrap();
    assert!(source.contains("val Project.`java`: org.gradle.api.plugins.JavaPluginExtension"));
    assert_eq!(fixture.compilations(), 1);
}

#[test]
fn test_result_is_memoized_per_node() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let node = MockNode::new(root.path(), ":").live(&[("ext", "a.Ext")]);
    let resolver = fixture.resolver();

    let first = resolver.accessors_class_path_for(&node, &[]).unwrap();
    let second = resolver.accessors_class_path_for(&node, &[]).unwrap();
    assert_eq!(first, second);
    assert_eq!(node.introspections.load(Ordering::SeqCst), 1);
    assert_eq!(fixture.compilations(), 1);
}

#[test]
fn test_equal_schemas_compile_once() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let a = MockNode::new(root.path(), ":a").live(&[("one", "a.One"), ("two", "a.Two")]);
    let b = MockNode::new(root.path(), ":b").live(&[("two", "a.Two"), ("one", "a.One")]);

    let first = fixture
        .resolver()
        .accessors_class_path_for(&a, &[])
        .unwrap();
    // A fresh resolver stands in for a new build reusing the on-disk cache.
    let second = fixture
        .resolver()
        .accessors_class_path_for(&b, &[])
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fixture.compilations(), 1);
}

#[test]
fn test_extension_and_convention_of_same_name_compile_separately() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let extension_node = MockNode::new(root.path(), ":a").live_with(&[("foo", "a.T")], &[]);
    let convention_node = MockNode::new(root.path(), ":b").live_with(&[], &[("foo", "a.T")]);
    let resolver = fixture.resolver();

    let first = resolver
        .accessors_class_path_for(&extension_node, &[])
        .unwrap();
    let second = resolver
        .accessors_class_path_for(&convention_node, &[])
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(fixture.compilations(), 2);
    let source = fs::read_to_string(second.src[0].join(ACCESSORS_SOURCE)).unwrap();
    assert!(source.contains("convention.getPluginByName<a.T>(\"foo\")"));
    assert!(!source.contains("extensions.getByName"));
}

#[test]
fn test_concurrent_nodes_with_equal_schemas_compile_once() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let resolver = fixture.resolver();
    let nodes: Vec<MockNode> = (0..6)
        .map(|i| MockNode::new(root.path(), &format!(":p{}", i)).live(&[("shared", "a.Shared")]))
        .collect();

    std::thread::scope(|s| {
        for node in &nodes {
            let resolver = &resolver;
            s.spawn(move || resolver.accessors_class_path_for(node, &[]).unwrap());
        }
    });

    assert_eq!(fixture.compilations(), 1);
}

#[test]
fn test_unlocked_scope_is_a_precondition_violation() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let mut node = MockNode::new(root.path(), ":lib").live(&[("ext", "a.Ext")]);
    node.locked = false;

    let err = fixture
        .resolver()
        .accessors_class_path_for(&node, &[])
        .unwrap_err();
    match err {
        ClassPathError::PreconditionViolation { path } => assert_eq!(path, ":lib"),
        other => panic!("Expected precondition violation, got {:?}", other),
    }
    assert_eq!(node.introspections.load(Ordering::SeqCst), 0);
}

#[test]
fn test_live_introspection_requires_opt_in() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let mut node = MockNode::new(root.path(), ":").live(&[("ext", "a.Ext")]);
    node.properties
        .insert(ACCESSORS_PROPERTY.to_string(), "off".to_string());

    let classpath = fixture
        .resolver()
        .accessors_class_path_for(&node, &[])
        .unwrap();
    assert!(classpath.is_empty());
    assert_eq!(node.introspections.load(Ordering::SeqCst), 0);
}

#[test]
fn test_snapshot_takes_precedence_over_live_schema() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let mut schemas = MultiProjectSchema::new();
    schemas.insert(
        ":app".to_string(),
        ProjectSchema::from_entries(
            vec![("fromSnapshot".to_string(), "a.Snapshot".to_string())],
            vec![],
        ),
    );
    write_multi_project_schema(root.path(), &schemas).unwrap();

    let app = MockNode::new(root.path(), ":app").live(&[("fromLive", "a.Live")]);
    let other = MockNode::new(root.path(), ":other").live(&[("fromLive", "a.Live")]);
    let resolver = fixture.resolver();

    let schema = resolver.configured_project_schema_of(&app).unwrap().unwrap();
    assert!(schema.extensions.contains_key("fromSnapshot"));
    assert_eq!(app.introspections.load(Ordering::SeqCst), 0);

    // Projects missing from the snapshot fall back to live introspection.
    let schema = resolver
        .configured_project_schema_of(&other)
        .unwrap()
        .unwrap();
    assert_eq!(schema.extensions["fromLive"], "a.Live");
}

#[test]
fn test_compile_failure_propagates_and_is_retried() {
    let fixture = Fixture::new();
    let root = tempdir().unwrap();
    let node = MockNode::new(root.path(), ":").live(&[("ext", "a.Ext")]);
    let resolver = fixture.resolver();
    fixture.compiler.fail_next.store(true, Ordering::SeqCst);

    let err = resolver.accessors_class_path_for(&node, &[]).unwrap_err();
    assert!(matches!(err, ClassPathError::Compile(CompileError::Failed { .. })));
    let cause = std::error::Error::source(&err).unwrap();
    assert!(cause.to_string().contains("unresolved reference"));

    let classpath = resolver.accessors_class_path_for(&node, &[]).unwrap();
    assert!(classpath.bin[0].is_file());
    assert_eq!(fixture.compilations(), 2);
}
