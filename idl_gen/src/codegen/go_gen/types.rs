use crate::codegen::go::GoCodeGeneratorOptions;
use crate::codegen::go_gen::imports::{GoImport, Imports};
use std::collections::BTreeMap;

/* Built-in IDL synonyms. Names not listed pass through untouched and are
 * assumed to be declared elsewhere in the same package. */
const TYPE_MAP: &[(&str, &str)] = &[
    ("LONG", "int32"),
    ("DWORD", "uint32"),
    ("ULONG", "uint32"),
    ("BYTE", "byte"),
    ("LPWSTR", "string"),
    ("LPCWSTR", "string"),
    ("LPOLESTR", "string"),
    ("LPCOLESTR", "string"),
    ("GUID", "ole.GUID"),
    ("UINT_PTR", "*int32"),
    ("BOOL", "bool"),
    ("REFGUID", "*ole.GUID"),
    ("REFIID", "*ole.GUID"),
    ("REFCLSID", "*ole.GUID"),
    ("HWND", "wintypes.HWND"),
    ("HBITMAP", "wintypes.HBITMAP"),
    ("REFPROPERTYKEY", "wintypes.PROPERTYKEY"),
    ("PROPVARIANT", "uintptr"),
    ("VOID", "void"),
];

/* IDL names whose Go `string` form crosses the boundary as UTF-16 */
const WIDE_TEXT_TYPES: &[&str] = &["LPWSTR", "LPCWSTR", "LPOLESTR", "LPCOLESTR"];

pub fn is_wide_text(idl_type: &str) -> bool {
    WIDE_TEXT_TYPES.contains(&idl_type)
}

/// A Go type expression plus the packages it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub go: String,
    pub imports: Imports,
}

impl MappedType {
    /* Number of pointer levels already present in the mapped form */
    pub fn indirections(&self) -> usize {
        self.go.chars().take_while(|c| *c == '*').count()
    }

    /* Type name with the leading pointer markers removed */
    pub fn base(&self) -> &str {
        self.go.trim_start_matches('*')
    }
}

pub struct TypeMapper {
    table: BTreeMap<String, String>,
    packages: Vec<(&'static str, GoImport)>,
}

impl TypeMapper {
    pub fn new(options: &GoCodeGeneratorOptions) -> Self {
        let mut table: BTreeMap<String, String> = TYPE_MAP
            .iter()
            .map(|(idl, go)| (idl.to_string(), go.to_string()))
            .collect();
        /* Configured mappings win over the built-in table */
        for (idl, go) in &options.type_map {
            table.insert(idl.clone(), go.clone());
        }

        Self {
            table,
            packages: vec![
                ("ole.", GoImport::aliased("ole", &options.ole_path)),
                ("wintypes.", GoImport::aliased("wintypes", &options.wintypes_path)),
                ("unsafe.", GoImport::unsafe_pkg()),
            ],
        }
    }

    /// Resolves an IDL type name to its Go representation.
    pub fn map(&self, idl_type: &str) -> MappedType {
        let go = self
            .table
            .get(idl_type)
            .cloned()
            .unwrap_or_else(|| idl_type.to_string());
        let imports = self.imports_for(&go);
        MappedType { go, imports }
    }

    /// Maps a declared type with its own pointer depth applied, as used by
    /// struct fields and typedefs. `void` becomes `struct{}`, `void*` becomes
    /// `unsafe.Pointer`.
    pub fn map_declared(&self, idl_type: &str, indirections: usize) -> MappedType {
        let mapped = self.map(idl_type);
        if mapped.go == "void" {
            if indirections == 0 {
                return MappedType {
                    go: "struct{}".to_string(),
                    imports: Imports::new(),
                };
            }
            let go = format!("{}unsafe.Pointer", "*".repeat(indirections - 1));
            let imports = self.imports_for(&go);
            return MappedType { go, imports };
        }

        MappedType {
            go: format!("{}{}", "*".repeat(indirections), mapped.go),
            imports: mapped.imports,
        }
    }

    /// Imports needed by an arbitrary Go expression that starts with a
    /// package qualifier, e.g. `ole.NewGUID`.
    pub fn imports_for(&self, go: &str) -> Imports {
        let base = go.trim_start_matches('*');
        self.packages
            .iter()
            .filter(|(qualifier, _)| base.starts_with(qualifier))
            .map(|(_, import)| import.clone())
            .collect()
    }
}
