//! Tree transforms
//!
//! - [`obfuscator`]: rename bindings to opaque names, extending an [`IdentifierMap`]
//! - [`deobfuscator`]: invert a map and restore original names
//! - [`dead_code`]: insert and strip top-level placeholder statements
//! - [`mapping`]: the bijective name table and its JSON document form
//! - [`names`]: injectable opaque-name generation
//!
//! All passes rewrite the tree in place.

pub mod dead_code;
pub mod deobfuscator;
pub mod mapping;
pub mod names;
pub mod obfuscator;

pub use dead_code::{insert_dead_code, is_dead_code, remove_dead_code};
pub use deobfuscator::{deobfuscate, Deobfuscator};
pub use mapping::{IdentifierMap, MappingError};
pub use names::{is_valid_identifier, NameSource, RandomNames, MIN_NAME_LENGTH};
pub use obfuscator::{obfuscate, Obfuscator};
