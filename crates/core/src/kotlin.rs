//! Rendering of JVM types in Kotlin syntax.

use ktdsl_api::models::{JvmType, PrimitiveType, TypeParameter, Variance};

/// Java types with a dedicated Kotlin counterpart.
const MAPPED_TYPES: &[(&str, &str)] = &[
    ("java.lang.Object", "Any"),
    ("java.lang.String", "String"),
    ("java.lang.CharSequence", "CharSequence"),
    ("java.lang.Number", "Number"),
    ("java.lang.Boolean", "Boolean"),
    ("java.lang.Byte", "Byte"),
    ("java.lang.Character", "Char"),
    ("java.lang.Short", "Short"),
    ("java.lang.Integer", "Int"),
    ("java.lang.Long", "Long"),
    ("java.lang.Float", "Float"),
    ("java.lang.Double", "Double"),
    ("java.lang.Void", "Unit"),
    ("java.lang.Iterable", "kotlin.collections.Iterable"),
    ("java.util.Iterator", "kotlin.collections.MutableIterator"),
    ("java.util.Collection", "kotlin.collections.MutableCollection"),
    ("java.util.List", "kotlin.collections.MutableList"),
    ("java.util.Set", "kotlin.collections.MutableSet"),
    ("java.util.Map", "kotlin.collections.MutableMap"),
    ("java.util.Map$Entry", "kotlin.collections.MutableMap.MutableEntry"),
];

pub fn primitive_type_string(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "Boolean",
        PrimitiveType::Byte => "Byte",
        PrimitiveType::Char => "Char",
        PrimitiveType::Short => "Short",
        PrimitiveType::Int => "Int",
        PrimitiveType::Long => "Long",
        PrimitiveType::Float => "Float",
        PrimitiveType::Double => "Double",
        PrimitiveType::Void => "Unit",
    }
}

/// Kotlin spelling of a qualified class name.
pub fn class_name_string(name: &str) -> String {
    MAPPED_TYPES
        .iter()
        .find(|(java, _)| *java == name)
        .map(|(_, kotlin)| kotlin.to_string())
        .unwrap_or_else(|| name.replace('$', "."))
}

/// Kotlin spelling of a type, e.g. `kotlin.collections.MutableList<out Any>`.
pub fn kotlin_type_string(ty: &JvmType) -> String {
    match ty {
        JvmType::Primitive { primitive } => primitive_type_string(*primitive).to_string(),
        JvmType::Plain { name } => class_name_string(name),
        JvmType::Generic {
            definition,
            arguments,
        } => format!(
            "{}<{}>",
            class_name_string(definition),
            arguments
                .iter()
                .map(kotlin_type_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        JvmType::TypeVariable { name } => name.clone(),
        JvmType::Array { element } => match element.as_ref() {
            JvmType::Primitive { primitive } if *primitive != PrimitiveType::Void => {
                format!("{}Array", primitive_type_string(*primitive))
            }
            other => format!("Array<{}>", kotlin_type_string(other)),
        },
        JvmType::Wildcard { bound: None } => "*".to_string(),
        JvmType::Wildcard {
            bound: Some((Variance::Out, bound)),
        } => format!("out {}", kotlin_type_string(bound)),
        JvmType::Wildcard {
            bound: Some((Variance::In, bound)),
        } => format!("in {}", kotlin_type_string(bound)),
    }
}

/// `<T, U : Bound>`, or an empty string without type parameters.
pub fn type_parameters_string(type_parameters: &[TypeParameter]) -> String {
    if type_parameters.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = type_parameters
        .iter()
        .map(|tp| {
            if tp.is_unbounded() {
                tp.name.clone()
            } else {
                format!("{} : {}", tp.name, kotlin_type_string(&tp.bound))
            }
        })
        .collect();
    format!("<{}>", rendered.join(", "))
}
