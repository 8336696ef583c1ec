/* Interface emission
 *
 * For each interface with methods:
 *   1. <Name>Vtbl  - parent vtable embedded first, one uintptr per method
 *   2. <Name>      - wrapper embedding the parent wrapper
 *   3. VTable()    - the one place the raw vtable pointer is reinterpreted
 *   4. one stub per method calling through the matching slot
 */

use crate::codegen::go_gen::helpers::{Declaration, escape_go_keyword};
use crate::codegen::go_gen::imports::{GoImport, Imports};
use crate::codegen::go_gen::layout::{VtableLayout, is_ole_interface};
use crate::codegen::go_gen::params::{MarshaledParam, marshal_params, param_signature};
use crate::codegen::go_gen::syscall::{CallPlan, plan_call};
use crate::codegen::go_gen::types::TypeMapper;
use crate::error::GenResult;
use idl_types::{InterfaceNode, MethodNode};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Marshaling decisions for one method, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodStub {
    pub name: String,
    /* Go identifier of the method and its vtable field */
    pub ident: String,
    pub params: Vec<MarshaledParam>,
    pub call: CallPlan,
}

impl MethodStub {
    pub fn slot_count(&self) -> usize {
        self.params.iter().map(|param| param.slots.len()).sum()
    }
}

/// Marshals every parameter of `method` and selects its call tier.
pub fn plan_method(
    mapper: &TypeMapper,
    interface: &str,
    method: &MethodNode,
    ident: String,
) -> GenResult<MethodStub> {
    let params = marshal_params(mapper, interface, &method.name, &method.params)?;

    let slots: Vec<String> = params
        .iter()
        .flat_map(|param| param.slots.iter().cloned())
        .collect();
    let call = plan_call(interface, &method.name, slots)?;

    Ok(MethodStub {
        name: method.name.clone(),
        ident,
        params,
        call,
    })
}

/* Members of the generated wrapper and its embedded go-ole handle */
const RESERVED_METHODS: &[&str] = &["VTable", "RawVTable"];

fn method_ident(name: &str) -> String {
    let ident = escape_go_keyword(name);
    if RESERVED_METHODS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Plans all methods of an interface, giving repeated names (propget/propput
/// pairs) distinct Go identifiers in declaration order. A `_N` suffix never
/// reuses a name some other method declares.
pub fn plan_methods(mapper: &TypeMapper, iface: &InterfaceNode) -> GenResult<Vec<MethodStub>> {
    let declared: BTreeSet<String> = iface
        .methods
        .iter()
        .map(|method| method_ident(&method.name))
        .collect();
    let mut used: BTreeSet<String> = BTreeSet::new();

    iface
        .methods
        .iter()
        .map(|method| {
            let base = method_ident(&method.name);
            let mut ident = base.clone();
            let mut count = 1;
            while used.contains(&ident) || (count > 1 && declared.contains(&ident)) {
                count += 1;
                ident = format!("{}_{}", base, count);
            }
            used.insert(ident.clone());
            plan_method(mapper, &iface.name, method, ident)
        })
        .collect()
}

/* Go type name for an interface, qualified when go-ole provides it */
fn interface_type(mapper: &TypeMapper, name: &str) -> (String, Imports) {
    if is_ole_interface(name) {
        let qualified = format!("ole.{}", name);
        let imports = mapper.imports_for(&qualified);
        (qualified, imports)
    } else {
        (name.to_string(), Imports::new())
    }
}

pub fn emit_interface(
    mapper: &TypeMapper,
    iface: &InterfaceNode,
    layout: &VtableLayout,
    stubs: &[MethodStub],
) -> Declaration {
    let mut out = String::new();
    let mut imports = Imports::new();
    let name = &iface.name;

    let (parent, parent_imports) = interface_type(mapper, &layout.parent);
    imports.merge(parent_imports);

    /* vtable layout */
    writeln!(out, "type {}Vtbl struct {{", name).unwrap();
    writeln!(out, "\t{}Vtbl", parent).unwrap();
    for stub in stubs {
        writeln!(out, "\t{} uintptr", stub.ident).unwrap();
    }
    out.push_str("}\n\n");

    /* wrapper */
    writeln!(out, "type {} struct {{", name).unwrap();
    writeln!(out, "\t{}", parent).unwrap();
    out.push_str("}\n\n");

    /* accessor */
    writeln!(out, "func (v *{}) VTable() *{}Vtbl {{", name, name).unwrap();
    writeln!(out, "\treturn (*{}Vtbl)(unsafe.Pointer(v.RawVTable))", name).unwrap();
    out.push_str("}\n\n");
    imports.insert(GoImport::unsafe_pkg());

    for (method, stub) in iface.methods.iter().zip(stubs) {
        let stub_decl = emit_method_stub(mapper, name, method, stub);
        out.push_str(&stub_decl.source);
        imports.merge(stub_decl.imports);
    }

    Declaration::new(out, imports)
}

fn emit_method_stub(
    mapper: &TypeMapper,
    interface: &str,
    method: &MethodNode,
    stub: &MethodStub,
) -> Declaration {
    let mut out = String::new();
    let mut imports = Imports::new();

    if method.params.is_empty() {
        writeln!(out, "func (v *{}) {}() error {{", interface, stub.ident).unwrap();
    } else {
        writeln!(out, "func (v *{}) {}(", interface, stub.ident).unwrap();
        for (param, marshaled) in method.params.iter().zip(&stub.params) {
            let (decl, comment, param_imports) = param_signature(mapper, param, &marshaled.ident);
            writeln!(out, "\t{}, // {}", decl, comment).unwrap();
            imports.merge(param_imports);
        }
        out.push_str(") error {\n");
    }

    for param in &stub.params {
        for line in param.prelude.lines() {
            writeln!(out, "\t{}", line).unwrap();
        }
        imports.merge(param.imports.clone());
    }

    /* only the first result word (the HRESULT) is meaningful */
    writeln!(out, "\thr, _, _ := syscall.{}(", stub.call.tier.function).unwrap();
    writeln!(out, "\t\tv.VTable().{},", stub.ident).unwrap();
    writeln!(out, "\t\t{},", stub.call.total_slots).unwrap();
    out.push_str("\t\tuintptr(unsafe.Pointer(v)),\n");
    for arg in &stub.call.args {
        writeln!(out, "\t\t{},", arg).unwrap();
    }
    out.push_str("\t)\n");
    out.push_str("\tif hr != 0 {\n\t\treturn ole.NewError(hr)\n\t}\n");
    out.push_str("\treturn nil\n}\n\n");

    imports.insert(GoImport::syscall());
    imports.insert(GoImport::unsafe_pkg());
    imports.merge(mapper.imports_for("ole.NewError"));

    Declaration::new(out, imports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::go::GoCodeGeneratorOptions;
    use crate::codegen::go_gen::layout::LayoutRegistry;
    use crate::codegen::go_gen::params::Marshaling;
    use crate::codegen::go_gen::syscall::{SYSCALL3, SYSCALL6};
    use crate::error::GenError;
    use idl_types::ParamNode;

    fn mapper() -> TypeMapper {
        TypeMapper::new(&GoCodeGeneratorOptions::default())
    }

    fn emit(registry: &mut LayoutRegistry, iface: &InterfaceNode) -> GenResult<Declaration> {
        let m = mapper();
        let layout = registry.register(iface).unwrap().clone();
        let stubs = plan_methods(&m, iface)?;
        Ok(emit_interface(&m, iface, &layout, &stubs))
    }

    #[test]
    fn root_parent_is_qualified_with_ole() {
        let iface = InterfaceNode::new("IFoo", None, vec![MethodNode::new("Reset", vec![])]);
        let decl = emit(&mut LayoutRegistry::new("IUnknown"), &iface).unwrap();
        assert!(decl.source.contains("type IFooVtbl struct {\n\tole.IUnknownVtbl\n\tReset uintptr\n}"));
        assert!(decl.source.contains("type IFoo struct {\n\tole.IUnknown\n}"));
        assert!(decl.source.contains("return (*IFooVtbl)(unsafe.Pointer(v.RawVTable))"));
        assert!(decl.source.contains("func (v *IFoo) Reset() error {"));
        assert!(decl.source.contains("syscall.Syscall(\n\t\tv.VTable().Reset,\n\t\t1,\n"));
        assert!(decl.imports.contains_path("github.com/go-ole/go-ole"));
        assert!(decl.imports.contains_path("syscall"));
        assert!(decl.imports.contains_path("unsafe"));
    }

    #[test]
    fn derived_interface_embeds_declared_parent() {
        let mut registry = LayoutRegistry::new("IUnknown");
        let base = InterfaceNode::new("IBase", None, vec![MethodNode::new("Ping", vec![])]);
        emit(&mut registry, &base).unwrap();
        let derived = InterfaceNode::new(
            "IDerived",
            Some("IBase"),
            vec![MethodNode::new("Open", vec![]), MethodNode::new("Close", vec![])],
        );
        let decl = emit(&mut registry, &derived).unwrap();
        assert!(decl
            .source
            .contains("type IDerivedVtbl struct {\n\tIBaseVtbl\n\tOpen uintptr\n\tClose uintptr\n}"));
        assert!(decl.source.contains("type IDerived struct {\n\tIBase\n}"));
        assert!(!decl.source.contains("Ping uintptr"));
    }

    #[test]
    fn bool_and_pointer_stub() {
        let iface = InterfaceNode::new(
            "IFoo",
            None,
            vec![MethodNode::new(
                "Bar",
                vec![
                    ParamNode::new("flag", "BOOL", 0),
                    ParamNode::new("count", "UINT_PTR", 1),
                ],
            )],
        );
        let stubs = plan_methods(&mapper(), &iface).unwrap();
        assert_eq!(stubs[0].slot_count(), 2);
        assert_eq!(stubs[0].call.total_slots, 3);
        assert_eq!(stubs[0].call.tier, SYSCALL3);
        assert_eq!(stubs[0].params[0].strategy, Marshaling::Bool);

        let decl = emit(&mut LayoutRegistry::new("IUnknown"), &iface).unwrap();
        let expected = "func (v *IFoo) Bar(\n\
                        \tflag bool, // []\n\
                        \tcount **int32, // []\n\
                        ) error {\n\
                        \tvar flag_bool int\n\
                        \tif flag {\n\
                        \t\tflag_bool = 1\n\
                        \t}\n\
                        \thr, _, _ := syscall.Syscall(\n\
                        \t\tv.VTable().Bar,\n\
                        \t\t3,\n\
                        \t\tuintptr(unsafe.Pointer(v)),\n\
                        \t\tuintptr(flag_bool),\n\
                        \t\tuintptr(unsafe.Pointer(count)),\n\
                        \t)\n\
                        \tif hr != 0 {\n\
                        \t\treturn ole.NewError(hr)\n\
                        \t}\n\
                        \treturn nil\n\
                        }\n";
        assert!(decl.source.contains(expected), "{}", decl.source);
    }

    #[test]
    fn variant_pushes_method_into_wider_tier() {
        let iface = InterfaceNode::new(
            "IProps",
            None,
            vec![MethodNode::new(
                "SetValue",
                vec![
                    ParamNode::new("key", "DWORD", 0),
                    ParamNode::new("value", "VARIANT", 0),
                ],
            )],
        );
        let stubs = plan_methods(&mapper(), &iface).unwrap();
        assert_eq!(stubs[0].slot_count(), 4);
        assert_eq!(stubs[0].call.total_slots, 5);
        assert_eq!(stubs[0].call.tier, SYSCALL6);
        assert_eq!(
            stubs[0].call.args,
            vec!["uintptr(key)", "value_words[0]", "value_words[1]", "value_words[2]", "0"]
        );
    }

    #[test]
    fn too_many_slots_is_fatal() {
        let params = (0..9)
            .map(|i| ParamNode::new(format!("p{}", i), "DWORD", 0))
            .collect();
        let iface = InterfaceNode::new("IWide", None, vec![MethodNode::new("Call", params)]);
        let err = plan_methods(&mapper(), &iface).unwrap_err();
        assert!(matches!(err, GenError::TooManySlots { required: 10, .. }));
    }

    #[test]
    fn repeated_method_names_get_distinct_idents() {
        let iface = InterfaceNode::new(
            "IItem",
            None,
            vec![
                MethodNode::new("Name", vec![ParamNode::new("out", "LPWSTR", 1)]),
                MethodNode::new("Name", vec![ParamNode::new("in", "LPCWSTR", 0)]),
            ],
        );
        let decl = emit(&mut LayoutRegistry::new("IUnknown"), &iface).unwrap();
        assert!(decl.source.contains("\tName uintptr\n\tName_2 uintptr\n"));
        assert!(decl.source.contains("func (v *IItem) Name_2("));
        assert!(decl.source.contains("v.VTable().Name_2,"));
        assert!(decl.imports.contains_path("log"));
    }

    #[test]
    fn dedup_suffix_skips_declared_names() {
        let iface = InterfaceNode::new(
            "IC",
            None,
            vec![
                MethodNode::new("N", vec![]),
                MethodNode::new("N", vec![]),
                MethodNode::new("N_2", vec![]),
            ],
        );
        let stubs = plan_methods(&mapper(), &iface).unwrap();
        let idents: Vec<&str> = stubs.iter().map(|stub| stub.ident.as_str()).collect();
        assert_eq!(idents, vec!["N", "N_3", "N_2"]);

        let decl = emit(&mut LayoutRegistry::new("IUnknown"), &iface).unwrap();
        assert_eq!(decl.source.matches("\tN_2 uintptr\n").count(), 1);
        assert_eq!(decl.source.matches("func (v *IC) N_2()").count(), 1);
    }

    #[test]
    fn wrapper_members_are_not_redeclared() {
        let iface = InterfaceNode::new(
            "IV",
            None,
            vec![MethodNode::new("VTable", vec![]), MethodNode::new("RawVTable", vec![])],
        );
        let decl = emit(&mut LayoutRegistry::new("IUnknown"), &iface).unwrap();
        assert!(decl.source.contains("\tVTable_ uintptr\n\tRawVTable_ uintptr\n"));
        assert_eq!(decl.source.matches("func (v *IV) VTable()").count(), 1);
        assert!(decl.source.contains("func (v *IV) RawVTable_() error {"));
    }

    #[test]
    fn parameters_never_shadow_packages_or_locals() {
        let iface = InterfaceNode::new(
            "IShadow",
            None,
            vec![MethodNode::new(
                "Set",
                vec![
                    ParamNode::new("log", "LPCWSTR", 0),
                    ParamNode::new("unsafe", "DWORD", 0),
                    ParamNode::new("flag", "BOOL", 0),
                    ParamNode::new("flag_bool", "DWORD", 0),
                ],
            )],
        );
        let decl = emit(&mut LayoutRegistry::new("IUnknown"), &iface).unwrap();
        let expected = "func (v *IShadow) Set(\n\
                        \tlog_ string, // []\n\
                        \tunsafe_ uint32, // []\n\
                        \tflag bool, // []\n\
                        \tflag_bool_ uint32, // []\n\
                        ) error {\n";
        assert!(decl.source.contains(expected), "{}", decl.source);
        assert!(decl.source.contains("\t\tlog.Fatalln(\"unable to utf-16 encode:\", log__err)\n"));
        assert!(decl.source.contains(
            "\t\tuintptr(unsafe.Pointer(v)),\n\
             \t\tuintptr(unsafe.Pointer(&log__rawval[0])),\n\
             \t\tuintptr(unsafe_),\n\
             \t\tuintptr(flag_bool),\n\
             \t\tuintptr(flag_bool_),\n"
        ));
    }
}
