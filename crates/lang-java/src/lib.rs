//! Reads compiled JVM classes into the ktdsl signature model.

pub mod classfile;
pub mod error;
pub mod scanner;
pub mod signature;

pub use classfile::read_class;
pub use error::{ClassReadError, Result};
pub use scanner::ClassPathScanner;
pub use signature::{parse_class_signature, parse_field_signature, parse_method_signature};
