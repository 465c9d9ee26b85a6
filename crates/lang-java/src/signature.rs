//! Parser for JVM generic signatures (JVMS 4.7.9.1).
//!
//! Erased method descriptors are a subset of the method signature grammar, so
//! `parse_method_signature` accepts both.

use ktdsl_api::models::{ClassSignature, JvmType, MethodSignature, PrimitiveType, TypeParameter, Variance};
use ktdsl_api::SignatureError;

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature, SignatureError> {
    let mut p = SignatureParser::new(signature);
    let type_parameters = p.type_parameters()?;
    let super_class = p.class_type()?;
    let mut interfaces = Vec::new();
    while !p.at_end() {
        interfaces.push(p.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class: Some(super_class),
        interfaces,
    })
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature, SignatureError> {
    let mut p = SignatureParser::new(signature);
    let type_parameters = p.type_parameters()?;
    p.expect(b'(')?;
    let mut parameters = Vec::new();
    while p.peek() != Some(b')') {
        parameters.push(p.java_type()?);
    }
    p.expect(b')')?;
    let return_type = match p.peek() {
        Some(b'V') => {
            p.bump();
            JvmType::primitive(PrimitiveType::Void)
        }
        _ => p.java_type()?,
    };
    // Throws clauses carry nothing the generators need.
    while p.peek() == Some(b'^') {
        p.bump();
        p.reference_type()?;
    }
    p.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
    })
}

pub fn parse_field_signature(signature: &str) -> Result<JvmType, SignatureError> {
    let mut p = SignatureParser::new(signature);
    let ty = p.java_type()?;
    p.finish()?;
    Ok(ty)
}

struct SignatureParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, reason: impl Into<String>) -> SignatureError {
        SignatureError {
            signature: self.src.to_string(),
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn expect(&mut self, c: u8) -> Result<(), SignatureError> {
        match self.peek() {
            Some(found) if found == c => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(self.error(format!(
                "expected `{}`, found `{}`",
                c as char, found as char
            ))),
            None => Err(self.error(format!("expected `{}`, found end of input", c as char))),
        }
    }

    fn finish(&self) -> Result<(), SignatureError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    /// Reads an identifier up to (not including) any of `stops`.
    fn identifier(&mut self, stops: &[u8]) -> Result<&'a str, SignatureError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>, SignatureError> {
        let mut params = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(params);
        }
        self.bump();
        while self.peek() != Some(b'>') {
            if self.at_end() {
                return Err(self.error("unterminated type parameter list"));
            }
            params.push(self.type_parameter()?);
        }
        self.bump();
        if params.is_empty() {
            return Err(self.error("empty type parameter list"));
        }
        Ok(params)
    }

    fn type_parameter(&mut self) -> Result<TypeParameter, SignatureError> {
        let name = self.identifier(b":>")?.to_string();
        self.expect(b':')?;
        let mut bounds = Vec::new();
        // Class bound may be empty when only interface bounds follow.
        if !matches!(self.peek(), Some(b':') | Some(b'>')) {
            bounds.push(self.reference_type()?);
        }
        while self.peek() == Some(b':') {
            self.bump();
            bounds.push(self.reference_type()?);
        }
        let bound = bounds.into_iter().next().unwrap_or_else(JvmType::object);
        Ok(TypeParameter { name, bound })
    }

    fn java_type(&mut self) -> Result<JvmType, SignatureError> {
        match self.peek() {
            Some(c @ (b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D')) => {
                self.bump();
                PrimitiveType::from_descriptor(c as char)
                    .map(JvmType::primitive)
                    .ok_or_else(|| self.error("unknown base type"))
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<JvmType, SignatureError> {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => {
                self.bump();
                let name = self.identifier(b";")?.to_string();
                self.expect(b';')?;
                Ok(JvmType::type_variable(name))
            }
            Some(b'[') => {
                self.bump();
                Ok(JvmType::array(self.java_type()?))
            }
            Some(c) => Err(self.error(format!("unexpected `{}`", c as char))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn class_type(&mut self) -> Result<JvmType, SignatureError> {
        self.expect(b'L')?;
        let mut name = self.identifier(b"<.;")?.replace('/', ".");
        let mut arguments = self.type_arguments()?;
        // Nested classes: only the innermost arguments are kept.
        while self.peek() == Some(b'.') {
            self.bump();
            let inner = self.identifier(b"<.;")?;
            name.push('$');
            name.push_str(inner);
            arguments = self.type_arguments()?;
        }
        self.expect(b';')?;
        if arguments.is_empty() {
            Ok(JvmType::plain(name))
        } else {
            Ok(JvmType::generic(name, arguments))
        }
    }

    fn type_arguments(&mut self) -> Result<Vec<JvmType>, SignatureError> {
        let mut args = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(args);
        }
        self.bump();
        while self.peek() != Some(b'>') {
            let arg = match self.peek() {
                Some(b'*') => {
                    self.bump();
                    JvmType::Wildcard { bound: None }
                }
                Some(b'+') => {
                    self.bump();
                    JvmType::Wildcard {
                        bound: Some((Variance::Out, Box::new(self.reference_type()?))),
                    }
                }
                Some(b'-') => {
                    self.bump();
                    JvmType::Wildcard {
                        bound: Some((Variance::In, Box::new(self.reference_type()?))),
                    }
                }
                None => return Err(self.error("unterminated type argument list")),
                _ => self.reference_type()?,
            };
            args.push(arg);
        }
        self.bump();
        if args.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        Ok(args)
    }
}
