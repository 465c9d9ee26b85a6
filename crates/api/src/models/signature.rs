//! Signature model of compiled JVM classes.
//!
//! These are pure data types. Parsing lives in `ktdsl-java`, rendering to
//! Kotlin syntax in `ktdsl-core`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Universal top type, used as the bound of unbounded type parameters.
pub const OBJECT: &str = "java.lang.Object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    pub fn from_descriptor(c: char) -> Option<Self> {
        Some(match c {
            'Z' => Self::Boolean,
            'B' => Self::Byte,
            'C' => Self::Char,
            'S' => Self::Short,
            'I' => Self::Int,
            'J' => Self::Long,
            'F' => Self::Float,
            'D' => Self::Double,
            'V' => Self::Void,
            _ => return None,
        })
    }

    /// Java source keyword, as used in documentation lookup keys.
    pub fn java_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Void => "void",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variance {
    /// `? extends T`
    Out,
    /// `? super T`
    In,
}

/// A type as it appears in a JVM generic signature.
///
/// Qualified names are dotted binary names: nested classes keep their `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JvmType {
    Primitive { primitive: PrimitiveType },
    Plain { name: String },
    Generic {
        definition: String,
        arguments: Vec<JvmType>,
    },
    TypeVariable { name: String },
    Array { element: Box<JvmType> },
    /// Only valid as a type argument. `None` is the unbounded `?`.
    Wildcard {
        bound: Option<(Variance, Box<JvmType>)>,
    },
}

impl JvmType {
    pub fn plain(name: impl Into<String>) -> Self {
        JvmType::Plain { name: name.into() }
    }

    pub fn generic(definition: impl Into<String>, arguments: Vec<JvmType>) -> Self {
        JvmType::Generic {
            definition: definition.into(),
            arguments,
        }
    }

    pub fn type_variable(name: impl Into<String>) -> Self {
        JvmType::TypeVariable { name: name.into() }
    }

    pub fn array(element: JvmType) -> Self {
        JvmType::Array {
            element: Box::new(element),
        }
    }

    pub fn primitive(primitive: PrimitiveType) -> Self {
        JvmType::Primitive { primitive }
    }

    pub fn object() -> Self {
        Self::plain(OBJECT)
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self,
            JvmType::Primitive {
                primitive: PrimitiveType::Void
            }
        )
    }

    /// Qualified name of the class this type refers to, ignoring arguments.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            JvmType::Plain { name } => Some(name),
            JvmType::Generic { definition, .. } => Some(definition),
            _ => None,
        }
    }

    /// Type arguments of a parameterized type, empty for anything else.
    pub fn arguments(&self) -> &[JvmType] {
        match self {
            JvmType::Generic { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Erased Java source spelling, e.g. `java.util.List` or `int[]`.
    ///
    /// Type variables erase to the top type since the declaring bound is not
    /// known here.
    pub fn erased_java_name(&self) -> String {
        match self {
            JvmType::Primitive { primitive } => primitive.java_name().to_string(),
            JvmType::Plain { name } => name.replace('$', "."),
            JvmType::Generic { definition, .. } => definition.replace('$', "."),
            JvmType::TypeVariable { .. } | JvmType::Wildcard { .. } => OBJECT.to_string(),
            JvmType::Array { element } => format!("{}[]", element.erased_java_name()),
        }
    }
}

impl fmt::Display for JvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JvmType::Primitive { primitive } => f.write_str(primitive.java_name()),
            JvmType::Plain { name } => f.write_str(name),
            JvmType::Generic {
                definition,
                arguments,
            } => {
                write!(f, "{}<", definition)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            JvmType::TypeVariable { name } => f.write_str(name),
            JvmType::Array { element } => write!(f, "{}[]", element),
            JvmType::Wildcard { bound: None } => f.write_str("?"),
            JvmType::Wildcard {
                bound: Some((Variance::Out, ty)),
            } => write!(f, "? extends {}", ty),
            JvmType::Wildcard {
                bound: Some((Variance::In, ty)),
            } => write!(f, "? super {}", ty),
        }
    }
}

/// A generic type parameter declaration, e.g. `T extends Comparable<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    pub bound: JvmType,
}

impl TypeParameter {
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: JvmType::object(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.bound.class_name() == Some(OBJECT) && self.bound.arguments().is_empty()
    }
}

/// Declared type parameters of a class. Absent for non-generic classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: Option<JvmType>,
    pub interfaces: Vec<JvmType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<JvmType>,
    pub return_type: JvmType,
}

macro_rules! access_flags {
    ($name:ident { $($flag:ident = $bit:expr),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u16);

        impl $name {
            $(pub const $flag: $name = $name($bit);)*

            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

access_flags!(ClassAccess {
    PUBLIC = 0x0001,
    FINAL = 0x0010,
    INTERFACE = 0x0200,
    ABSTRACT = 0x0400,
    SYNTHETIC = 0x1000,
    ANNOTATION = 0x2000,
    ENUM = 0x4000,
});

access_flags!(MethodAccess {
    PUBLIC = 0x0001,
    PRIVATE = 0x0002,
    PROTECTED = 0x0004,
    STATIC = 0x0008,
    FINAL = 0x0010,
    SYNCHRONIZED = 0x0020,
    BRIDGE = 0x0040,
    VARARGS = 0x0080,
    NATIVE = 0x0100,
    ABSTRACT = 0x0400,
    SYNTHETIC = 0x1000,
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub signature: MethodSignature,
    pub access: MethodAccess,
}

impl MethodDescriptor {
    /// Erased Java parameter type names, used as documentation lookup keys.
    pub fn erased_parameter_types(&self) -> Vec<String> {
        self.signature
            .parameters
            .iter()
            .map(JvmType::erased_java_name)
            .collect()
    }
}

/// Everything the generators need to know about one compiled class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Dotted binary name, e.g. `org.gradle.api.Project` or `a.Outer$Inner`.
    pub name: String,
    pub access: ClassAccess,
    pub signature: Option<ClassSignature>,
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    /// A class is generic iff it declares at least one type parameter.
    pub fn is_generic(&self) -> bool {
        self.signature
            .as_ref()
            .is_some_and(|s| !s.type_parameters.is_empty())
    }

    pub fn is_interface(&self) -> bool {
        self.access.contains(ClassAccess::INTERFACE)
    }

    /// Kotlin/Java source spelling of the class name.
    pub fn source_name(&self) -> String {
        self.name.replace('$', ".")
    }
}
