//! IDL AST Definitions
//!
//! This crate contains the node types produced by the IDL parser and consumed
//! by the binding generator. It provides pure data structures with serde
//! support so a parsed document can be handed over as YAML or JSON, without
//! any parsing or code generation logic.

pub mod ast;
pub mod attrs;

// Re-export commonly used types at the crate root
pub use ast::*;
pub use attrs::*;
