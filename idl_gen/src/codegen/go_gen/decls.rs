/* Direct structural translations: enums, structs, typedefs and constants */

use crate::codegen::go_gen::helpers::{Declaration, escape_go_keyword, go_quote};
use crate::codegen::go_gen::imports::Imports;
use crate::codegen::go_gen::types::TypeMapper;
use idl_types::{ConstValue, ConstdefNode, EnumNode, ModuleConstantNode, StructNode, TypedefNode};
use std::fmt::Write;

/// An enum value whose implicit number Go cannot reproduce: it follows a
/// literal that is not a plain integer, so a bare name would repeat that
/// literal instead of incrementing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumGap {
    pub enum_name: String,
    pub value_name: String,
    pub after_literal: String,
}

/* Numbering state while walking an enum's values */
enum Sequence {
    /* inside an unbroken iota run: bare names keep counting */
    Iota,
    /* last literal was an integer; the next implicit value is known */
    Next(i64),
    /* last literal was an expression we cannot evaluate */
    Unknown(String),
}

/* Parses IDL integer literals: decimal, hex, optional sign and C suffixes */
fn parse_int_literal(literal: &str) -> Option<i64> {
    let trimmed = literal.trim().trim_end_matches(['u', 'U', 'l', 'L']);
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, trimmed),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

pub fn emit_enum(node: &EnumNode) -> (Declaration, Vec<EnumGap>) {
    let mut out = String::new();
    let mut gaps = Vec::new();

    writeln!(out, "type {} int", node.name).unwrap();
    if node.values.is_empty() {
        out.push('\n');
        return (Declaration::new(out, Imports::new()), gaps);
    }

    writeln!(out, "\nconst (").unwrap();
    let mut sequence = Sequence::Iota;
    for (i, value) in node.values.iter().enumerate() {
        let literal = value.value.trim();
        let name = escape_go_keyword(&value.name);

        if i == 0 && (literal.is_empty() || literal == "0") {
            writeln!(out, "\t{} {} = iota", name, node.name).unwrap();
            sequence = Sequence::Iota;
        } else if literal.is_empty() {
            match &sequence {
                Sequence::Iota => writeln!(out, "\t{}", name).unwrap(),
                Sequence::Next(next) => {
                    let next = *next;
                    writeln!(out, "\t{} {} = {}", name, node.name, next).unwrap();
                    sequence = match next.checked_add(1) {
                        Some(following) => Sequence::Next(following),
                        None => Sequence::Unknown(next.to_string()),
                    };
                }
                Sequence::Unknown(after) => {
                    gaps.push(EnumGap {
                        enum_name: node.name.clone(),
                        value_name: value.name.clone(),
                        after_literal: after.clone(),
                    });
                    writeln!(out, "\t{}", name).unwrap();
                }
            }
        } else {
            writeln!(out, "\t{} {} = {}", name, node.name, literal).unwrap();
            /* past i64::MAX the counter is unknown, same as an expression */
            sequence = match parse_int_literal(literal).and_then(|value| value.checked_add(1)) {
                Some(following) => Sequence::Next(following),
                None => Sequence::Unknown(literal.to_string()),
            };
        }
    }
    out.push_str(")\n\n");

    (Declaration::new(out, Imports::new()), gaps)
}

pub fn emit_struct(mapper: &TypeMapper, node: &StructNode) -> Declaration {
    let mut out = String::new();
    let mut imports = Imports::new();

    writeln!(out, "type {} struct {{", node.name).unwrap();
    for field in &node.fields {
        let mapped = mapper.map_declared(&field.type_name, field.indirections);
        writeln!(out, "\t{} {}", escape_go_keyword(&field.name), mapped.go).unwrap();
        imports.merge(mapped.imports);
    }
    out.push_str("}\n\n");

    for alias in node.aliases.iter().filter(|alias| **alias != node.name) {
        writeln!(out, "type {} = {}\n", alias, node.name).unwrap();
    }

    Declaration::new(out, imports)
}

pub fn emit_typedef(mapper: &TypeMapper, node: &TypedefNode) -> Declaration {
    let mapped = mapper.map_declared(&node.type_name, node.indirections);
    Declaration::new(format!("type {} {}\n\n", node.name, mapped.go), mapped.imports)
}

pub fn emit_constdef(mapper: &TypeMapper, node: &ConstdefNode) -> Declaration {
    let mapped = mapper.map_declared(&node.type_name, 0);

    /* GUID constants become parsed ole.GUID values */
    if mapped.base() == "ole.GUID" {
        if let ConstValue::Text(text) = &node.value {
            let guid = text.trim().trim_start_matches('{').trim_end_matches('}');
            return Declaration::new(
                format!("var {} = ole.NewGUID(\"{{{}}}\")\n\n", node.name, guid),
                mapper.imports_for("ole.NewGUID"),
            );
        }
    }

    let value = match &node.value {
        ConstValue::Integer(value) => value.to_string(),
        ConstValue::Text(text) => go_quote(text),
        ConstValue::Expr { expr } => expr.trim().to_string(),
    };

    /* Go constants must have a basic underlying type */
    let keyword = if mapped.indirections() > 0 || mapped.go.contains('.') || mapped.go == "struct{}" {
        "var"
    } else {
        "const"
    };

    Declaration::new(
        format!("{} {} {} = {}\n\n", keyword, node.name, mapped.go, value),
        mapped.imports,
    )
}

pub fn emit_module_constant(node: &ModuleConstantNode) -> Declaration {
    Declaration::new(
        format!("const {} = {}\n\n", node.name, node.value.trim()),
        Imports::new(),
    )
}

/// `var <prefix>_<name> = ole.NewGUID("{...}")` for interface, class and
/// library identifiers.
pub fn emit_guid_var(mapper: &TypeMapper, prefix: &str, name: &str, uuid: &str) -> Declaration {
    Declaration::new(
        format!("var {}_{} = ole.NewGUID(\"{{{}}}\")\n\n", prefix, name, uuid),
        mapper.imports_for("ole.NewGUID"),
    )
}
