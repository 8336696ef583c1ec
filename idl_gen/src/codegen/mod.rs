pub mod format;
pub mod go;
pub mod go_gen;

pub use format::{FormatError, Gofmt, SourceFormatter, SyntaxCheck};
pub use go::{GeneratedSource, GoCodeGenerator, GoCodeGeneratorOptions};
