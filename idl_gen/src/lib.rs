//! Go binding generator for COM-style interfaces described in IDL.
//!
//! The parser lives elsewhere; this crate takes its AST (see `idl_types`),
//! lays out vtables, marshals method parameters into syscall argument words
//! and emits a single Go source file.

pub mod codegen;
pub mod error;
pub mod loader;

pub use codegen::{GeneratedSource, GoCodeGenerator, GoCodeGeneratorOptions};
pub use error::{GenError, GenResult};
