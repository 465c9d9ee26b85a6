//! Typed accessors for the extensions and conventions of a project schema.

use ktdsl_api::models::ProjectSchema;
use std::io::Write;

use crate::naming::{is_legal_name, quote, string_literal};

pub const ACCESSORS_HEADER: &str = r#"/*
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

import org.gradle.api.Project
import org.gradle.kotlin.dsl.*
"#;

/// Accessor blocks of `schema`, extensions first, each group name-sorted.
///
/// Conventions shadowed by an extension of the same name and names that are
/// not legal identifiers are left out.
pub fn accessors_for(schema: &ProjectSchema<String>) -> Vec<String> {
    let extensions = schema
        .extensions
        .iter()
        .filter_map(|(name, ty)| extension_accessor_for(name, ty));
    let conventions = schema
        .unshadowed_conventions()
        .filter_map(|(name, ty)| convention_accessor_for(name, ty));
    extensions.chain(conventions).collect()
}

/// Writes the complete accessors source file. Returns the number of
/// accessor pairs written.
pub fn write_accessors_to(sink: &mut impl Write, schema: &ProjectSchema<String>) -> std::io::Result<usize> {
    sink.write_all(ACCESSORS_HEADER.as_bytes())?;
    let accessors = accessors_for(schema);
    for accessor in &accessors {
        sink.write_all(b"\n")?;
        sink.write_all(accessor.as_bytes())?;
    }
    Ok(accessors.len())
}

fn extension_accessor_for(name: &str, ty: &str) -> Option<String> {
    if !is_legal_name(name) {
        tracing::debug!("Skipping extension `{}`: not a legal Kotlin identifier", name);
        return None;
    }
    let id = quote(name);
    let literal = string_literal(name);
    Some(format!(
        r#"/**
 * Retrieves the [{name}][{ty}] project extension.
 */
val Project.{id}: {ty} get() =
    extensions.getByName({literal}) as {ty}

/**
 * Configures the [{name}][{ty}] project extension.
 */
fun Project.{id}(configure: {ty}.() -> Unit): Unit =
    extensions.configure({literal}, configure)
"#
    ))
}

fn convention_accessor_for(name: &str, ty: &str) -> Option<String> {
    if !is_legal_name(name) {
        tracing::debug!("Skipping convention `{}`: not a legal Kotlin identifier", name);
        return None;
    }
    let id = quote(name);
    let literal = string_literal(name);
    Some(format!(
        r#"/**
 * Retrieves the [{name}][{ty}] project convention.
 */
val Project.{id}: {ty} get() =
    convention.getPluginByName<{ty}>({literal})

/**
 * Configures the [{name}][{ty}] project convention.
 */
fun Project.{id}(configure: {ty}.() -> Unit): Unit =
    configure(this.{id})
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(extensions: &[(&str, &str)], conventions: &[(&str, &str)]) -> ProjectSchema<String> {
        let owned = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
        };
        ProjectSchema::from_entries(owned(extensions), owned(conventions))
    }

    #[test]
    fn test_extension_accessor_shape() {
        let accessors = accessors_for(&schema(&[("java", "org.gradle.api.plugins.JavaPluginExtension")], &[]));
        assert_eq!(accessors.len(), 1);
        let accessor = &accessors[0];
        assert!(accessor.contains(
            "val Project.`java`: org.gradle.api.plugins.JavaPluginExtension get() =\n    extensions.getByName(\"java\") as org.gradle.api.plugins.JavaPluginExtension"
        ));
        assert!(accessor.contains(
            "fun Project.`java`(configure: org.gradle.api.plugins.JavaPluginExtension.() -> Unit): Unit =\n    extensions.configure(\"java\", configure)"
        ));
    }

    #[test]
    fn test_convention_accessor_shape() {
        let accessors = accessors_for(&schema(&[], &[("application", "ApplicationPluginConvention")]));
        assert_eq!(accessors.len(), 1);
        assert!(accessors[0].contains("convention.getPluginByName<ApplicationPluginConvention>(\"application\")"));
        assert!(accessors[0].contains("configure(this.`application`)"));
    }

    #[test]
    fn test_extension_wins_over_convention() {
        let accessors = accessors_for(&schema(&[("foo", "T")], &[("foo", "U")]));
        assert_eq!(accessors.len(), 1);
        assert!(accessors[0].contains("val Project.`foo`: T get()"));
        assert!(!accessors[0].contains("getPluginByName"));
        assert!(!accessors[0].contains("`foo`: U"));
    }

    #[test]
    fn test_illegal_names_are_skipped() {
        let s = schema(
            &[("a.b", "T"), ("good", "T"), ("class", "T")],
            &[("also/bad", "U"), ("fine", "U")],
        );
        let accessors = accessors_for(&s);
        assert_eq!(accessors.len(), 2);
        assert!(accessors[0].contains("`good`"));
        assert!(accessors[1].contains("`fine`"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = schema(&[("b", "B"), ("a", "A")], &[("c", "C")]);
        let b = schema(&[("a", "A"), ("b", "B")], &[("c", "C")]);
        let mut out_a = Vec::new();
        let mut out_b = Vec::new();
        assert_eq!(write_accessors_to(&mut out_a, &a).unwrap(), 3);
        write_accessors_to(&mut out_b, &b).unwrap();
        assert_eq!(out_a, out_b);
        let text = String::from_utf8(out_a).unwrap();
        assert!(text.starts_with(ACCESSORS_HEADER));
        assert!(text.find("`a`").unwrap() < text.find("`b`").unwrap());
    }

    #[test]
    fn test_dollar_in_name_is_escaped() {
        let accessors = accessors_for(&schema(&[("$ext", "T")], &[]));
        assert!(accessors[0].contains("getByName(\"\\$ext\")"));
    }
}
