use ktdsl_api::models::{ClassAccess, JvmType, MethodAccess, PrimitiveType, Variance};
use ktdsl_java::{ClassPathScanner, read_class};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const ACC_SYNTHETIC: u16 = 0x1000;

struct TestMethod<'a> {
    name: &'a str,
    descriptor: &'a str,
    signature: Option<&'a str>,
    access: u16,
}

/// Minimal class file writer: constant pool, methods and Signature
/// attributes only.
struct ClassBuilder {
    pool: Vec<Vec<u8>>,
}

impl ClassBuilder {
    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![1u8];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        self.pool.push(entry);
        self.pool.len() as u16
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut entry = vec![7u8];
        entry.extend_from_slice(&name_index.to_be_bytes());
        self.pool.push(entry);
        self.pool.len() as u16
    }

    fn signature_attribute(&mut self, signature: &str) -> Vec<u8> {
        let name = self.utf8("Signature");
        let value = self.utf8(signature);
        let mut out = Vec::new();
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&2u32.to_be_bytes());
        out.extend_from_slice(&value.to_be_bytes());
        out
    }
}

fn class_bytes(name: &str, access: u16, signature: Option<&str>, methods: &[TestMethod]) -> Vec<u8> {
    let mut builder = ClassBuilder { pool: Vec::new() };
    let this_class = builder.class(name);
    let super_class = builder.class("java/lang/Object");

    let mut method_bytes = Vec::new();
    for method in methods {
        let name_index = builder.utf8(method.name);
        let descriptor_index = builder.utf8(method.descriptor);
        method_bytes.extend_from_slice(&method.access.to_be_bytes());
        method_bytes.extend_from_slice(&name_index.to_be_bytes());
        method_bytes.extend_from_slice(&descriptor_index.to_be_bytes());
        match method.signature {
            Some(sig) => {
                let attribute = builder.signature_attribute(sig);
                method_bytes.extend_from_slice(&1u16.to_be_bytes());
                method_bytes.extend_from_slice(&attribute);
            }
            None => method_bytes.extend_from_slice(&0u16.to_be_bytes()),
        }
    }
    let class_attribute = signature.map(|sig| builder.signature_attribute(sig));

    let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
    out.extend_from_slice(&(builder.pool.len() as u16 + 1).to_be_bytes());
    for entry in &builder.pool {
        out.extend_from_slice(entry);
    }
    out.extend_from_slice(&access.to_be_bytes());
    out.extend_from_slice(&this_class.to_be_bytes());
    out.extend_from_slice(&super_class.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // interfaces
    out.extend_from_slice(&0u16.to_be_bytes()); // fields
    out.extend_from_slice(&(methods.len() as u16).to_be_bytes());
    out.extend_from_slice(&method_bytes);
    match class_attribute {
        Some(attribute) => {
            out.extend_from_slice(&1u16.to_be_bytes());
            out.extend_from_slice(&attribute);
        }
        None => out.extend_from_slice(&0u16.to_be_bytes()),
    }
    out
}

fn widget_container() -> Vec<u8> {
    class_bytes(
        "com/example/WidgetContainer",
        ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT,
        None,
        &[
            TestMethod {
                name: "configure",
                descriptor: "(Ljava/lang/String;Lorg/gradle/api/Action;)V",
                signature: Some("(Ljava/lang/String;Lorg/gradle/api/Action<-Lcom/example/Widget;>;)V"),
                access: ACC_PUBLIC | ACC_ABSTRACT,
            },
            TestMethod {
                name: "size",
                descriptor: "()I",
                signature: None,
                access: ACC_PUBLIC | ACC_ABSTRACT,
            },
        ],
    )
}

fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn test_read_class_with_generic_method_signature() {
    let class = read_class("com/example/WidgetContainer.class", widget_container()).unwrap();

    assert_eq!(class.name, "com.example.WidgetContainer");
    assert!(class.is_interface());
    assert!(!class.is_generic());
    assert_eq!(class.methods.len(), 2);

    let configure = &class.methods[0];
    assert_eq!(configure.name, "configure");
    assert!(configure.access.contains(MethodAccess::PUBLIC));
    assert_eq!(
        configure.signature.parameters,
        vec![
            JvmType::plain("java.lang.String"),
            JvmType::generic(
                "org.gradle.api.Action",
                vec![JvmType::Wildcard {
                    bound: Some((Variance::In, Box::new(JvmType::plain("com.example.Widget")))),
                }],
            ),
        ]
    );
    assert!(configure.signature.return_type.is_void());

    let size = &class.methods[1];
    assert!(size.signature.parameters.is_empty());
    assert_eq!(size.signature.return_type, JvmType::primitive(PrimitiveType::Int));
}

#[test]
fn test_read_generic_class() {
    let bytes = class_bytes(
        "com/example/Box",
        ACC_PUBLIC,
        Some("<T:Ljava/lang/Object;>Ljava/lang/Object;"),
        &[],
    );
    let class = read_class("com/example/Box.class", bytes).unwrap();
    assert!(class.is_generic());
    assert!(class.access.contains(ClassAccess::PUBLIC));
    assert_eq!(class.signature.unwrap().type_parameters[0].name, "T");
}

#[test]
fn test_mismatched_method_signature_falls_back_to_descriptor() {
    let bytes = class_bytes(
        "com/example/Outer$Inner",
        ACC_PUBLIC,
        None,
        &[TestMethod {
            name: "<init>",
            descriptor: "(Lcom/example/Outer;Ljava/util/List;)V",
            signature: Some("(Ljava/util/List<Ljava/lang/String;>;)V"),
            access: ACC_PUBLIC,
        }],
    );
    let class = read_class("com/example/Outer$Inner.class", bytes).unwrap();
    assert_eq!(class.source_name(), "com.example.Outer.Inner");
    assert_eq!(
        class.methods[0].erased_parameter_types(),
        vec!["com.example.Outer".to_string(), "java.util.List".to_string()]
    );
}

#[test]
fn test_scan_jar_filters_and_sorts() {
    let dir = tempdir().unwrap();
    let jar = dir.path().join("api.jar");
    write_jar(
        &jar,
        &[
            ("com/example/WidgetContainer.class", widget_container()),
            ("com/example/Hidden.class", class_bytes("com/example/Hidden", 0, None, &[])),
            (
                "com/example/Generated.class",
                class_bytes("com/example/Generated", ACC_PUBLIC | ACC_SYNTHETIC, None, &[]),
            ),
            ("com/example/Alpha.class", class_bytes("com/example/Alpha", ACC_PUBLIC, None, &[])),
            (
                "com/example/internal/Impl.class",
                class_bytes("com/example/internal/Impl", ACC_PUBLIC, None, &[]),
            ),
            ("com/example/Broken.class", b"garbage".to_vec()),
        ],
    );

    let classes = ClassPathScanner::new()
        .include(["com.example"])
        .exclude(["com.example.internal"])
        .scan(&[jar])
        .unwrap();
    let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["com.example.Alpha", "com.example.WidgetContainer"]);
}

#[test]
fn test_scan_jar_and_directory_deduplicates() {
    let dir = tempdir().unwrap();
    let jar = dir.path().join("api.jar");
    write_jar(&jar, &[("com/example/WidgetContainer.class", widget_container())]);

    let classes_dir = dir.path().join("classes");
    std::fs::create_dir_all(classes_dir.join("com/example")).unwrap();
    std::fs::write(classes_dir.join("com/example/WidgetContainer.class"), widget_container()).unwrap();

    let classes = ClassPathScanner::new().scan(&[jar, classes_dir]).unwrap();
    assert_eq!(classes.len(), 1);
}
