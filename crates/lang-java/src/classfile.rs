//! Conversion of parsed class files into [`ClassDescriptor`]s.

use ktdsl_api::models::{ClassAccess, ClassDescriptor, MethodAccess, MethodDescriptor};
use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{ClassFile, ConstantPool};
use std::io::Cursor;

use crate::error::{ClassReadError, Result};
use crate::signature::{parse_class_signature, parse_method_signature};

/// Reads one compiled class. `entry` names the class file in errors.
pub fn read_class(entry: &str, bytes: Vec<u8>) -> Result<ClassDescriptor> {
    let class = ClassFile::from_bytes(&mut Cursor::new(bytes)).map_err(|e| {
        ClassReadError::ClassFormat {
            entry: entry.to_string(),
            message: format!("{e:?}"),
        }
    })?;
    JavaClassConverter { entry, class: &class }.convert()
}

struct JavaClassConverter<'a> {
    entry: &'a str,
    class: &'a ClassFile,
}

impl JavaClassConverter<'_> {
    fn convert(&self) -> Result<ClassDescriptor> {
        let name = self
            .class
            .class_name()
            .map_err(|e| self.format_error(format!("Failed to parse class name: {e:?}")))?
            .to_string()
            .replace('/', ".");

        let signature = match self.signature_of(&self.class.attributes)? {
            Some(raw) => Some(parse_class_signature(&raw).map_err(|source| {
                ClassReadError::Signature {
                    entry: self.entry.to_string(),
                    source,
                }
            })?),
            None => None,
        };

        let mut methods = Vec::with_capacity(self.class.methods.len());
        for method in &self.class.methods {
            let method_name = self.utf8(method.name_index)?;
            let descriptor = self.utf8(method.descriptor_index)?;
            let erased = parse_method_signature(&descriptor).map_err(|source| {
                ClassReadError::Signature {
                    entry: format!("{}#{}", self.entry, method_name),
                    source,
                }
            })?;

            // javac drops synthetic parameters from generic signatures, so a
            // signature that disagrees with the descriptor is not trusted.
            let signature = match self.signature_of(&method.attributes)? {
                Some(raw) => match parse_method_signature(&raw) {
                    Ok(generic) if generic.parameters.len() == erased.parameters.len() => generic,
                    Ok(_) => erased,
                    Err(source) => {
                        return Err(ClassReadError::Signature {
                            entry: format!("{}#{}", self.entry, method_name),
                            source,
                        });
                    }
                },
                None => erased,
            };

            methods.push(MethodDescriptor {
                name: method_name,
                signature,
                access: MethodAccess(method.access_flags.bits()),
            });
        }

        Ok(ClassDescriptor {
            name,
            access: ClassAccess(self.class.access_flags.bits()),
            signature,
            methods,
        })
    }

    fn pool(&self) -> &ConstantPool {
        &self.class.constant_pool
    }

    fn utf8(&self, index: u16) -> Result<String> {
        self.pool()
            .try_get_utf8(index)
            .map(|s| s.to_string())
            .map_err(|e| self.format_error(format!("Invalid constant pool entry {index}: {e:?}")))
    }

    fn signature_of(&self, attributes: &[Attribute]) -> Result<Option<String>> {
        for attribute in attributes {
            if let Attribute::Signature {
                signature_index, ..
            } = attribute
            {
                return self.utf8(*signature_index).map(Some);
            }
        }
        Ok(None)
    }

    fn format_error(&self, message: String) -> ClassReadError {
        ClassReadError::ClassFormat {
            entry: self.entry.to_string(),
            message,
        }
    }
}
