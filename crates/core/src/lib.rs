pub mod error;
pub mod logging;

pub mod accessors;
pub mod config;
pub mod extensions;
pub mod kotlin;
pub mod naming;

pub use accessors::{accessors_for, write_accessors_to};
pub use config::GeneratorConfig;
pub use error::{KtdslError, Result};
pub use extensions::{ActionExtensionWriter, ClassReport, SamRegistry, SweepReport};
pub use kotlin::kotlin_type_string;
pub use naming::is_legal_name;
