use crate::codegen::go_gen::imports::Imports;

/* Go reserved keywords that cannot be used as identifiers */
const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Text emitted for one declaration together with the imports it relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub source: String,
    pub imports: Imports,
}

impl Declaration {
    pub fn new(source: String, imports: Imports) -> Self {
        Self { source, imports }
    }
}

/* Escape Go keywords by suffixing an underscore */
pub fn escape_go_keyword(name: &str) -> String {
    if GO_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Quotes `text` as a Go interpreted string literal.
pub fn go_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
