pub mod kdoc;
pub mod schema;
pub mod signature;

pub use kdoc::*;
pub use schema::*;
pub use signature::*;
