/* Parameter marshaling
 *
 * Each parameter is turned into one or more uintptr argument words ("slots")
 * plus whatever conversion statements must run before the call.
 */

use crate::codegen::go_gen::helpers::escape_go_keyword;
use crate::codegen::go_gen::imports::{GoImport, Imports};
use crate::codegen::go_gen::types::{MappedType, TypeMapper, is_wide_text};
use crate::error::{GenError, GenResult};
use idl_types::{ParamAttributeKind, ParamNode};
use std::collections::BTreeSet;

/* Identifiers a stub body refers to: its own locals, the imported packages
 * and the shared encoder */
const RESERVED_LOCALS: &[&str] = &[
    "v",
    "hr",
    "log",
    "ole",
    "syscall",
    "unicode",
    "unsafe",
    "utf16Encoder",
    "wintypes",
];

/* Words in the binary form of a VARIANT */
pub const VARIANT_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marshaling {
    /// Multi-word tagged union passed by value, split into three words.
    Variant,
    /// Go bool widened to a 0/1 int local.
    Bool,
    /// Anything with at least one level of indirection.
    Pointer,
    /// Go string re-encoded as NUL-terminated UTF-16LE.
    WideText,
    /// Plain value reinterpreted as a word.
    Scalar,
}

impl Marshaling {
    pub fn slot_count(self) -> usize {
        match self {
            Marshaling::Variant => VARIANT_WORDS,
            _ => 1,
        }
    }

    /* Locals the conversion prelude declares for a parameter named `ident` */
    fn locals(self, ident: &str) -> Vec<String> {
        let suffixes: &[&str] = match self {
            Marshaling::Variant => &["words"],
            Marshaling::Bool => &["bool"],
            Marshaling::WideText => &["rawval", "err"],
            Marshaling::Pointer | Marshaling::Scalar => &[],
        };
        suffixes
            .iter()
            .map(|suffix| format!("{}_{}", ident, suffix))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshaledParam {
    pub ident: String,
    pub strategy: Marshaling,
    pub slots: Vec<String>,
    /* statements emitted ahead of the call, newline terminated */
    pub prelude: String,
    pub imports: Imports,
}

/* Go identifier for a parameter, clear of keywords and stub locals */
fn param_ident(name: &str) -> String {
    if RESERVED_LOCALS.contains(&name) {
        format!("{}_", name)
    } else {
        escape_go_keyword(name)
    }
}

/// Picks the marshaling strategy for a parameter whose type mapped to `mapped`.
fn classify(
    interface: &str,
    method: &str,
    param: &ParamNode,
    mapped: &MappedType,
) -> GenResult<Marshaling> {
    let indirections = param.indirections + mapped.indirections();

    if indirections == 0 && mapped.go == "VARIANT" {
        return Ok(Marshaling::Variant);
    }
    if indirections == 0 && mapped.go == "bool" {
        return Ok(Marshaling::Bool);
    }
    if indirections > 0 {
        return Ok(Marshaling::Pointer);
    }
    if mapped.go == "string" {
        if is_wide_text(&param.type_name) {
            return Ok(Marshaling::WideText);
        }
        return Err(GenError::UnsupportedConstruct {
            interface: interface.to_string(),
            method: method.to_string(),
            param: param.name.clone(),
            idl_type: param.type_name.clone(),
            go_type: mapped.go.clone(),
            reason: "Go string has no wide-text source encoding",
        });
    }
    Ok(Marshaling::Scalar)
}

/// Marshals a method's parameters in declared order. A parameter whose name
/// collides with an earlier parameter or with a local an earlier prelude
/// declares is suffixed with `_` until it is free.
pub fn marshal_params(
    mapper: &TypeMapper,
    interface: &str,
    method: &str,
    params: &[ParamNode],
) -> GenResult<Vec<MarshaledParam>> {
    let mut taken: BTreeSet<String> = RESERVED_LOCALS.iter().map(|name| name.to_string()).collect();
    params
        .iter()
        .map(|param| {
            let mapped = mapper.map(&param.type_name);
            let strategy = classify(interface, method, param, &mapped)?;

            let mut ident = param_ident(&param.name);
            while taken.contains(&ident)
                || strategy.locals(&ident).iter().any(|local| taken.contains(local))
            {
                ident.push('_');
            }
            taken.insert(ident.clone());
            taken.extend(strategy.locals(&ident));

            Ok(marshal_as(strategy, ident))
        })
        .collect()
}

fn marshal_as(strategy: Marshaling, ident: String) -> MarshaledParam {
    let mut imports = Imports::new();
    let mut prelude = String::new();
    let slots = match strategy {
        Marshaling::Variant => {
            imports.insert(GoImport::unsafe_pkg());
            prelude.push_str(&format!(
                "{ident}_words := (*[{VARIANT_WORDS}]uintptr)(unsafe.Pointer(&{ident}))\n"
            ));
            (0..VARIANT_WORDS)
                .map(|word| format!("{}_words[{}]", ident, word))
                .collect()
        }
        Marshaling::Bool => {
            prelude.push_str(&format!("var {ident}_bool int\n"));
            prelude.push_str(&format!("if {ident} {{\n\t{ident}_bool = 1\n}}\n"));
            vec![format!("uintptr({}_bool)", ident)]
        }
        Marshaling::Pointer => {
            imports.insert(GoImport::unsafe_pkg());
            vec![format!("uintptr(unsafe.Pointer({}))", ident)]
        }
        Marshaling::WideText => {
            imports.insert(GoImport::unsafe_pkg());
            imports.insert(GoImport::log());
            prelude.push_str(&format!(
                "{ident}_rawval, {ident}_err := utf16Encoder.Bytes(append([]byte({ident}), 0))\n"
            ));
            prelude.push_str(&format!(
                "if {ident}_err != nil {{\n\tlog.Fatalln(\"unable to utf-16 encode:\", {ident}_err)\n}}\n"
            ));
            vec![format!("uintptr(unsafe.Pointer(&{}_rawval[0]))", ident)]
        }
        Marshaling::Scalar => vec![format!("uintptr({})", ident)],
    };

    MarshaledParam {
        ident,
        strategy,
        slots,
        prelude,
        imports,
    }
}

/// Signature entry for a parameter: the `name type` pair, its direction
/// comment and the imports the declared type needs.
pub fn param_signature(
    mapper: &TypeMapper,
    param: &ParamNode,
    ident: &str,
) -> (String, String, Imports) {
    let declared = mapper.map_declared(&param.type_name, param.indirections);
    let decl = format!("{} {}", ident, declared.go);
    (decl, direction_comment(param), declared.imports)
}

/* Renders direction/sizing attributes, e.g. "[in, size_is(count)]" */
fn direction_comment(param: &ParamNode) -> String {
    let mut attrs: Vec<String> = param
        .attributes
        .iter()
        .filter_map(|attr| {
            let label = match attr.kind {
                ParamAttributeKind::In => "in",
                ParamAttributeKind::Out => "out",
                ParamAttributeKind::Retval => "retval",
                ParamAttributeKind::SizeIs => "size_is",
                ParamAttributeKind::LengthIs => "length_is",
                ParamAttributeKind::IidIs => "iid_is",
                ParamAttributeKind::Other => return None,
            };
            if attr.value.is_empty() {
                Some(label.to_string())
            } else {
                Some(format!("{}({})", label, attr.value))
            }
        })
        .collect();
    if param.array {
        attrs.push("array".to_string());
    }
    format!("[{}]", attrs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::go::GoCodeGeneratorOptions;
    use idl_types::ParamAttribute;

    fn mapper() -> TypeMapper {
        TypeMapper::new(&GoCodeGeneratorOptions::default())
    }

    fn marshal(param: ParamNode) -> GenResult<MarshaledParam> {
        marshal_params(&mapper(), "IFoo", "Bar", std::slice::from_ref(&param))
            .map(|mut params| params.remove(0))
    }

    #[test]
    fn bool_goes_through_int_local() {
        let m = marshal(ParamNode::new("flag", "BOOL", 0)).unwrap();
        assert_eq!(m.strategy, Marshaling::Bool);
        assert_eq!(m.slots, vec!["uintptr(flag_bool)"]);
        assert!(m.prelude.contains("var flag_bool int"));
        assert!(m.prelude.contains("flag_bool = 1"));
        assert!(m.imports.is_empty());
    }

    #[test]
    fn bool_pointer_is_a_pointer() {
        let m = marshal(ParamNode::new("enabled", "BOOL", 1)).unwrap();
        assert_eq!(m.strategy, Marshaling::Pointer);
        assert_eq!(m.slots, vec!["uintptr(unsafe.Pointer(enabled))"]);
    }

    #[test]
    fn variant_takes_three_slots() {
        let m = marshal(ParamNode::new("value", "VARIANT", 0)).unwrap();
        assert_eq!(m.strategy, Marshaling::Variant);
        assert_eq!(m.slots.len(), 3);
        assert_eq!(m.slots[2], "value_words[2]");
        assert!(m.imports.contains_path("unsafe"));

        let by_ref = marshal(ParamNode::new("value", "VARIANT", 1)).unwrap();
        assert_eq!(by_ref.slots.len(), 1);
    }

    #[test]
    fn mapped_pointer_types_count_as_indirection() {
        let m = marshal(ParamNode::new("riid", "REFIID", 0)).unwrap();
        assert_eq!(m.strategy, Marshaling::Pointer);
        let m = marshal(ParamNode::new("count", "UINT_PTR", 0)).unwrap();
        assert_eq!(m.strategy, Marshaling::Pointer);
    }

    #[test]
    fn wide_text_is_encoded_and_fatal_on_failure() {
        let m = marshal(ParamNode::new("path", "LPCWSTR", 0)).unwrap();
        assert_eq!(m.strategy, Marshaling::WideText);
        assert_eq!(m.slots, vec!["uintptr(unsafe.Pointer(&path_rawval[0]))"]);
        assert!(m.prelude.contains("utf16Encoder.Bytes(append([]byte(path), 0))"));
        assert!(m.prelude.contains("log.Fatalln"));
        assert!(m.imports.contains_path("log"));
        assert!(m.imports.contains_path("unsafe"));
    }

    #[test]
    fn string_without_wide_source_is_rejected() {
        let mut options = GoCodeGeneratorOptions::default();
        options.type_map.insert("LPSTR".to_string(), "string".to_string());
        let mapper = TypeMapper::new(&options);
        let err = marshal_params(&mapper, "IFoo", "SetName", &[ParamNode::new("name", "LPSTR", 0)])
            .unwrap_err();
        assert!(matches!(err, GenError::UnsupportedConstruct { .. }));
        assert!(err.to_string().contains("IFoo::SetName"));
    }

    #[test]
    fn scalars_are_reinterpreted() {
        let m = marshal(ParamNode::new("flags", "DWORD", 0)).unwrap();
        assert_eq!(m.strategy, Marshaling::Scalar);
        assert_eq!(m.slots, vec!["uintptr(flags)"]);
        assert!(m.prelude.is_empty());
    }

    #[test]
    fn identifiers_avoid_keywords_and_locals() {
        let m = marshal(ParamNode::new("type", "DWORD", 0)).unwrap();
        assert_eq!(m.slots, vec!["uintptr(type_)"]);
        let m = marshal(ParamNode::new("v", "DWORD", 0)).unwrap();
        assert_eq!(m.slots, vec!["uintptr(v_)"]);
    }

    fn idents(params: Vec<ParamNode>) -> Vec<String> {
        marshal_params(&mapper(), "IFoo", "Bar", &params)
            .unwrap()
            .into_iter()
            .map(|param| param.ident)
            .collect()
    }

    #[test]
    fn identifiers_avoid_imported_packages() {
        let names = idents(vec![
            ParamNode::new("log", "LPCWSTR", 0),
            ParamNode::new("unsafe", "DWORD", 0),
            ParamNode::new("syscall", "DWORD", 0),
            ParamNode::new("ole", "DWORD", 0),
            ParamNode::new("unicode", "DWORD", 0),
            ParamNode::new("utf16Encoder", "DWORD", 0),
        ]);
        assert_eq!(
            names,
            vec!["log_", "unsafe_", "syscall_", "ole_", "unicode_", "utf16Encoder_"]
        );

        let params = marshal_params(&mapper(), "IFoo", "Bar", &[ParamNode::new("log", "LPCWSTR", 0)])
            .unwrap();
        assert!(params[0].prelude.contains("append([]byte(log_), 0)"));
        assert!(params[0].prelude.contains("\tlog.Fatalln("));
    }

    #[test]
    fn prelude_locals_do_not_collide_with_parameters() {
        /* a later parameter named like an earlier local is renamed */
        let params = marshal_params(
            &mapper(),
            "IFoo",
            "Bar",
            &[
                ParamNode::new("flag", "BOOL", 0),
                ParamNode::new("flag_bool", "DWORD", 0),
            ],
        )
        .unwrap();
        assert_eq!(params[0].slots, vec!["uintptr(flag_bool)"]);
        assert_eq!(params[1].ident, "flag_bool_");
        assert_eq!(params[1].slots, vec!["uintptr(flag_bool_)"]);

        /* an earlier parameter claims the name a later local would use */
        assert_eq!(
            idents(vec![
                ParamNode::new("path_err", "DWORD", 0),
                ParamNode::new("path", "LPCWSTR", 0),
            ]),
            vec!["path_err", "path_"]
        );
        assert_eq!(
            idents(vec![
                ParamNode::new("value_words", "DWORD", 0),
                ParamNode::new("value", "VARIANT", 0),
            ]),
            vec!["value_words", "value_"]
        );

        /* locals only exist for strategies that declare them */
        assert_eq!(
            idents(vec![
                ParamNode::new("count_bool", "DWORD", 0),
                ParamNode::new("count", "DWORD", 0),
            ]),
            vec!["count_bool", "count"]
        );
    }

    #[test]
    fn duplicate_and_escaped_names_stay_distinct() {
        assert_eq!(
            idents(vec![
                ParamNode::new("v", "DWORD", 0),
                ParamNode::new("v_", "DWORD", 0),
                ParamNode::new("type", "DWORD", 0),
                ParamNode::new("type_", "DWORD", 0),
            ]),
            vec!["v_", "v__", "type_", "type__"]
        );
    }

    #[test]
    fn signature_carries_direction_comment() {
        let param = ParamNode::new("items", "DWORD", 1)
            .with_attribute(ParamAttribute::output())
            .with_attribute(ParamAttribute::new(ParamAttributeKind::SizeIs, "count"));
        let (decl, comment, _) = param_signature(&mapper(), &param, "items");
        assert_eq!(decl, "items *uint32");
        assert_eq!(comment, "[out, size_is(count)]");

        let mut array = ParamNode::new("data", "BYTE", 1).with_attribute(ParamAttribute::input());
        array.array = true;
        let (_, comment, _) = param_signature(&mapper(), &array, "data");
        assert_eq!(comment, "[in, array]");

        let (decl, comment, imports) =
            param_signature(&mapper(), &ParamNode::new("context", "void", 1), "context");
        assert_eq!(decl, "context unsafe.Pointer");
        assert_eq!(comment, "[]");
        assert!(imports.contains_path("unsafe"));
    }
}
