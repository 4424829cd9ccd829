pub mod document;
pub mod entry;
pub mod roster;

pub use document::*;
pub use entry::*;
pub use roster::*;
