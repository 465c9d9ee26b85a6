//! Kotlin extensions taking lambdas with receiver for host API methods whose
//! last parameter is a single-abstract-method callback such as `Action<T>`.

use ktdsl_api::models::{
    format_block, signature_key, ClassDescriptor, JvmType, KDocProvider, MethodAccess,
    MethodDescriptor, TypeParameter, OBJECT,
};
use ktdsl_api::ExtensionError;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::error::Result;
use crate::kotlin::{kotlin_type_string, type_parameters_string};
use crate::naming::{is_legal_name, quote};

pub const ACTION: &str = "org.gradle.api.Action";
pub const KOTLIN_FUNCTION1: &str = "kotlin.jvm.functions.Function1";

/// Name of the closure parameter replacing the callback.
const CLOSURE_PARAMETER: &str = "configuration";

pub const FILE_HEADER: &str = r#"/*
 * Copyright 2018 the original author or authors.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

package org.gradle.kotlin.dsl

import org.gradle.api.Action
"#;

/// A raw type in a host API signature that must be rendered star-projected.
struct RawTypeFixup {
    owner: &'static str,
    method: &'static str,
    raw_type: &'static str,
}

/// `Project.configure(Iterable, Action)` declares its first parameter without
/// a type argument.
const RAW_TYPE_FIXUPS: &[RawTypeFixup] = &[RawTypeFixup {
    owner: "org.gradle.api.Project",
    method: "configure",
    raw_type: "java.lang.Iterable",
}];

/// Callback interfaces recognized as single-abstract-method types, mapped to
/// the name of their abstract method.
#[derive(Debug, Clone)]
pub struct SamRegistry {
    callbacks: HashMap<String, String>,
}

impl Default for SamRegistry {
    fn default() -> Self {
        let mut callbacks = HashMap::new();
        callbacks.insert(ACTION.to_string(), "execute".to_string());
        Self { callbacks }
    }
}

impl SamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognizes `Action` plus every interface of `classes` shaped like it:
    /// one type parameter `T` and one abstract `void m(T)`.
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a ClassDescriptor>) -> Self {
        let mut registry = Self::default();
        for class in classes {
            if let Some(method) = callback_method(class) {
                tracing::debug!("Recognized callback type {}#{}", class.name, method);
                registry.callbacks.insert(class.name.clone(), method.to_string());
            }
        }
        registry
    }

    pub fn is_callback(&self, class_name: &str) -> bool {
        self.callbacks.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

fn callback_method(class: &ClassDescriptor) -> Option<&str> {
    if !class.is_interface() {
        return None;
    }
    let signature = class.signature.as_ref()?;
    let [TypeParameter { name: tv, .. }] = signature.type_parameters.as_slice() else {
        return None;
    };
    let mut abstract_methods = class.methods.iter().filter(|m| {
        m.access.contains(MethodAccess::ABSTRACT) && !m.access.contains(MethodAccess::STATIC)
    });
    let method = abstract_methods.next()?;
    if abstract_methods.next().is_some() {
        return None;
    }
    let takes_type_variable = matches!(
        method.signature.parameters.as_slice(),
        [JvmType::TypeVariable { name }] if name == tv
    );
    (takes_type_variable && method.signature.return_type.is_void()).then_some(method.name.as_str())
}

/// Outcome of generating the extensions of one class.
#[derive(Debug, Default)]
pub struct ClassReport {
    pub class: String,
    pub skipped_generic: bool,
    /// Methods using type variables they do not declare, e.g. those of an
    /// inner class of a generic class.
    pub skipped_unbound: usize,
    pub emitted: usize,
    pub failures: Vec<ExtensionError>,
}

/// Outcome of a whole generation sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub classes: usize,
    pub generic_classes: usize,
    pub unbound_methods: usize,
    pub declarations: usize,
    pub failures: Vec<ExtensionError>,
}

impl SweepReport {
    fn record(&mut self, report: ClassReport) {
        self.classes += 1;
        if report.skipped_generic {
            self.generic_classes += 1;
        }
        self.unbound_methods += report.skipped_unbound;
        self.declarations += report.emitted;
        self.failures.extend(report.failures);
    }
}

/// Writes action extensions to `sink`, one class at a time.
///
/// The file header is written on construction. Each declaration is rendered
/// completely before it reaches the sink.
pub struct ActionExtensionWriter<'d, W: Write> {
    sink: W,
    docs: Option<&'d dyn KDocProvider>,
    callbacks: SamRegistry,
}

impl<'d, W: Write> ActionExtensionWriter<'d, W> {
    pub fn new(mut sink: W, docs: Option<&'d dyn KDocProvider>) -> Result<Self> {
        sink.write_all(FILE_HEADER.as_bytes())?;
        Ok(Self {
            sink,
            docs,
            callbacks: SamRegistry::default(),
        })
    }

    pub fn with_callbacks(mut self, callbacks: SamRegistry) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn write_classes<'c>(
        &mut self,
        classes: impl IntoIterator<Item = &'c ClassDescriptor>,
    ) -> Result<SweepReport> {
        let mut sweep = SweepReport::default();
        for class in classes {
            let report = self.write_class(class)?;
            sweep.record(report);
        }
        tracing::info!(
            "Generated {} extensions from {} classes ({} generic skipped, {} unbound methods skipped, {} failed)",
            sweep.declarations,
            sweep.classes,
            sweep.generic_classes,
            sweep.unbound_methods,
            sweep.failures.len()
        );
        Ok(sweep)
    }

    /// Emits every extension of `class`. Only sink I/O errors are returned as
    /// `Err`; per-method failures are collected in the report.
    pub fn write_class(&mut self, class: &ClassDescriptor) -> Result<ClassReport> {
        let mut report = ClassReport {
            class: class.name.clone(),
            ..Default::default()
        };
        if class.is_generic() {
            tracing::debug!("Skipping generic class {}", class.name);
            report.skipped_generic = true;
            return Ok(report);
        }

        let mut generated = HashSet::new();
        for method in &class.methods {
            let Some(callback) = self.callback_parameter(class, method) else {
                continue;
            };
            if let Some(tv) = undeclared_type_variable(method) {
                tracing::debug!(
                    "Skipping {}.{}: type variable {} is not declared by the method",
                    class.name,
                    method.name,
                    tv
                );
                report.skipped_unbound += 1;
                continue;
            }
            let erased = method.erased_parameter_types();
            let leading_key = (method.name.clone(), erased[..erased.len() - 1].to_vec());
            if !generated.insert(leading_key) {
                tracing::debug!(
                    "Skipping {}.{}: clashes with an extension already generated",
                    class.name,
                    method.name
                );
                continue;
            }

            match self.extension_for(class, method, callback) {
                Ok(declaration) => {
                    self.sink.write_all(format!("\n{}\n", declaration).as_bytes())?;
                    report.emitted += 1;
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    report.failures.push(e);
                }
            }
        }
        Ok(report)
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// The callback parameter type, if `method` should get an extension.
    fn callback_parameter<'m>(
        &self,
        class: &ClassDescriptor,
        method: &'m MethodDescriptor,
    ) -> Option<&'m JvmType> {
        let access = method.access;
        if !access.contains(MethodAccess::PUBLIC)
            || access.contains(MethodAccess::STATIC)
            || access.contains(MethodAccess::SYNTHETIC)
            || access.contains(MethodAccess::BRIDGE)
            || method.name.starts_with('<')
            || !is_legal_name(&method.name)
        {
            return None;
        }
        let last = method.signature.parameters.last()?;
        let callback = last.class_name()?;
        if !self.callbacks.is_callback(callback) || last.arguments().len() != 1 {
            return None;
        }
        if has_closure_overload(class, method) {
            tracing::debug!(
                "Skipping {}.{}: a Kotlin function overload exists",
                class.name,
                method.name
            );
            return None;
        }
        Some(last)
    }

    fn extension_for(
        &self,
        class: &ClassDescriptor,
        method: &MethodDescriptor,
        callback: &JvmType,
    ) -> std::result::Result<String, ExtensionError> {
        let erased = method.erased_parameter_types();
        let fail = |message: String| ExtensionError {
            class: class.name.clone(),
            method: method.name.clone(),
            parameter_types: erased.clone(),
            message,
        };

        let key = signature_key(&class.name, &method.name, &erased);
        let kdoc = self.docs.and_then(|docs| docs.kdoc_for(&key));
        if let Some(kdoc) = kdoc {
            if kdoc.parameter_names.len() != erased.len() {
                return Err(fail(format!(
                    "documentation lists {} parameters ({}) but the method declares {}",
                    kdoc.parameter_names.len(),
                    kdoc.parameter_names.join(", "),
                    erased.len()
                )));
            }
        }

        let leading = &method.signature.parameters[..erased.len() - 1];
        let names = parameter_names(leading.len(), kdoc.map(|k| k.parameter_names.as_slice()));

        let owner = class.source_name();
        let receiver = kotlin_type_string(&closure_receiver(callback));
        let callback_type = format!(
            "{}<{}>",
            kotlin_type_string(&JvmType::plain(callback.class_name().unwrap_or(ACTION))),
            receiver
        );

        let mut parameters: Vec<String> = leading
            .iter()
            .zip(&names)
            .map(|(ty, name)| format!("{}: {}", quote(name), self.parameter_type(class, method, ty)))
            .collect();
        parameters.push(format!("{}: {}.() -> Unit", quote(CLOSURE_PARAMETER), receiver));

        let mut arguments: Vec<String> = names.iter().map(|n| quote(n)).collect();
        arguments.push(format!(
            "{} {{ it.{}() }}",
            callback_type,
            quote(CLOSURE_PARAMETER)
        ));

        let member = format!("{}.{}", owner, method.name);
        let notice = format!(
            "Kotlin extension function taking [kotlin.Function1] for [{member}].\n\n@see {member}"
        );
        let mut documented: Vec<String> = names.clone();
        documented.push(CLOSURE_PARAMETER.to_string());
        let doc = match kdoc {
            Some(kdoc) => kdoc.format(&documented, &notice),
            None => format_block("", &notice),
        };

        let type_parameters = type_parameters_string(&method.signature.type_parameters);
        let fun = if type_parameters.is_empty() {
            "fun".to_string()
        } else {
            format!("fun {}", type_parameters)
        };

        Ok(format!(
            "{doc}{fun} {owner}.{name}({parameters}): {ret} =\n    {name}({arguments})",
            name = quote(&method.name),
            parameters = parameters.join(", "),
            ret = kotlin_type_string(&method.signature.return_type),
            arguments = arguments.join(", "),
        ))
    }

    fn parameter_type(&self, class: &ClassDescriptor, method: &MethodDescriptor, ty: &JvmType) -> String {
        let rendered = kotlin_type_string(ty);
        if let JvmType::Plain { name } = ty {
            let is_fixup = RAW_TYPE_FIXUPS.iter().any(|f| {
                f.owner == class.name && f.method == method.name && f.raw_type == name
            });
            if is_fixup {
                return format!("{}<*>", rendered);
            }
        }
        rendered
    }
}

/// The class already declares `name(leading..., Function1)`.
fn has_closure_overload(class: &ClassDescriptor, method: &MethodDescriptor) -> bool {
    let params = &method.signature.parameters;
    let leading = &params[..params.len() - 1];
    class.methods.iter().any(|other| {
        let other_params = &other.signature.parameters;
        other.name == method.name
            && other_params.len() == params.len()
            && other_params.last().and_then(JvmType::class_name) == Some(KOTLIN_FUNCTION1)
            && other_params[..leading.len()]
                .iter()
                .zip(leading)
                .all(|(a, b)| a.erased_java_name() == b.erased_java_name())
    })
}

/// A type variable `method` mentions without declaring it.
fn undeclared_type_variable(method: &MethodDescriptor) -> Option<&str> {
    let signature = &method.signature;
    let declared = &signature.type_parameters;
    signature
        .parameters
        .iter()
        .chain(std::iter::once(&signature.return_type))
        .chain(declared.iter().map(|tp| &tp.bound))
        .find_map(|ty| free_type_variable(ty, declared))
}

fn free_type_variable<'t>(ty: &'t JvmType, declared: &[TypeParameter]) -> Option<&'t str> {
    match ty {
        JvmType::TypeVariable { name } => {
            (!declared.iter().any(|tp| tp.name == *name)).then_some(name.as_str())
        }
        JvmType::Generic { arguments, .. } => arguments
            .iter()
            .find_map(|arg| free_type_variable(arg, declared)),
        JvmType::Array { element } => free_type_variable(element, declared),
        JvmType::Wildcard {
            bound: Some((_, bound)),
        } => free_type_variable(bound, declared),
        JvmType::Wildcard { bound: None } | JvmType::Primitive { .. } | JvmType::Plain { .. } => {
            None
        }
    }
}

/// The receiver of the generated closure: the callback's type argument with
/// any variance stripped.
fn closure_receiver(callback: &JvmType) -> JvmType {
    match callback.arguments().first() {
        Some(JvmType::Wildcard { bound: None }) | None => JvmType::plain(OBJECT),
        Some(JvmType::Wildcard {
            bound: Some((_, bound)),
        }) => bound.as_ref().clone(),
        Some(other) => other.clone(),
    }
}

/// Names for the leading parameters. Documented names are used when they
/// are legal, distinct from the closure parameter and not already taken by
/// an earlier parameter.
fn parameter_names(count: usize, documented: Option<&[String]>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    used.insert(CLOSURE_PARAMETER.to_string());
    (0..count)
        .map(|i| {
            let mut name = documented
                .and_then(|names| names.get(i))
                .filter(|name| is_legal_name(name) && !used.contains(name.as_str()))
                .cloned()
                .unwrap_or_else(|| format!("arg{}", i));
            while used.contains(&name) {
                name.push('_');
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
