use crate::codegen::format::SourceFormatter;
use crate::codegen::go_gen::decls::{
    emit_constdef, emit_enum, emit_guid_var, emit_module_constant, emit_struct, emit_typedef,
};
use crate::codegen::go_gen::helpers::Declaration;
use crate::codegen::go_gen::imports::{GoImport, Imports, OLE_PATH, WINTYPES_PATH};
use crate::codegen::go_gen::interface::{MethodStub, emit_interface, plan_methods};
use crate::codegen::go_gen::layout::{LayoutRegistry, VtableLayout};
use crate::codegen::go_gen::types::TypeMapper;
use crate::error::{GenError, GenResult};
use idl_types::{IdlFile, InterfaceNode, Node, find_uuid};
use serde_derive::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const GENERATED_BANNER: &str = "// Code generated by idl-gen. DO NOT EDIT.\n\n";
const INTERFACE_RULE: &str = "/////////////////////////////////////////";
const UTF16_ENCODER: &str =
    "var utf16Encoder = unicode.UTF16(unicode.LittleEndian, unicode.IgnoreBOM).NewEncoder()\n";

/// Generator configuration. Every field has a default so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GoCodeGeneratorOptions {
    /* overrides the package named by the document */
    pub package_name: Option<String>,
    /* base interface for interfaces that name no parent */
    pub root_interface: String,
    pub ole_path: String,
    pub wintypes_path: String,
    /* emit IID_/CLSID_/LIBID_ variables from uuid attributes */
    pub emit_guids: bool,
    pub emit_banner: bool,
    /* extra IDL -> Go synonyms, applied over the built-in table */
    pub type_map: BTreeMap<String, String>,
}

impl Default for GoCodeGeneratorOptions {
    fn default() -> Self {
        Self {
            package_name: None,
            root_interface: "IUnknown".to_string(),
            ole_path: OLE_PATH.to_string(),
            wintypes_path: WINTYPES_PATH.to_string(),
            emit_guids: true,
            emit_banner: true,
            type_map: BTreeMap::new(),
        }
    }
}

/// Per-interface marshaling summary, kept for the analyze command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSummary {
    pub layout: VtableLayout,
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone)]
pub struct GeneratedSource {
    pub package: String,
    pub source: String,
    /* sorted import preamble, helper import included */
    pub imports: Vec<GoImport>,
    pub warnings: Vec<String>,
    pub interfaces: Vec<InterfaceSummary>,
}

pub struct GoCodeGenerator {
    options: GoCodeGeneratorOptions,
    mapper: TypeMapper,
}

impl GoCodeGenerator {
    pub fn new(options: GoCodeGeneratorOptions) -> Self {
        let mapper = TypeMapper::new(&options);
        Self { options, mapper }
    }

    pub fn options(&self) -> &GoCodeGeneratorOptions {
        &self.options
    }

    /// Runs one pass over the document and assembles the unformatted file.
    pub fn generate(&self, file: &IdlFile) -> GenResult<GeneratedSource> {
        let package = self.package_name(file);
        info!(
            package = %package,
            nodes = file.nodes.len(),
            "generating Go bindings"
        );

        let mut pass = GenerationPass::new(self);
        for node in &file.nodes {
            pass.visit(node)?;
        }

        let mut imports = pass.imports;
        imports.insert(GoImport::unicode());

        let mut source = String::new();
        if self.options.emit_banner {
            source.push_str(GENERATED_BANNER);
        }
        source.push_str(&format!("package {}\n\n", package));
        source.push_str(&imports.render());
        source.push('\n');
        source.push_str(UTF16_ENCODER);
        source.push('\n');
        source.push_str(pass.body.trim_end());
        source.push('\n');

        info!(
            interfaces = pass.interfaces.len(),
            imports = imports.len(),
            warnings = pass.warnings.len(),
            "generation finished"
        );

        Ok(GeneratedSource {
            package,
            source,
            imports: imports.iter().cloned().collect(),
            warnings: pass.warnings,
            interfaces: pass.interfaces,
        })
    }

    /// Generates and hands the buffer to `formatter`. A rejection carries the
    /// raw buffer so the caller can dump it.
    pub fn generate_formatted(
        &self,
        file: &IdlFile,
        formatter: &dyn SourceFormatter,
    ) -> GenResult<GeneratedSource> {
        let mut generated = self.generate(file)?;
        debug!(formatter = formatter.name(), "formatting generated source");
        match formatter.format(&generated.source) {
            Ok(formatted) => {
                generated.source = formatted;
                Ok(generated)
            }
            Err(source) => Err(GenError::Format {
                formatter: formatter.name().to_string(),
                source,
                raw: generated.source,
            }),
        }
    }

    fn package_name(&self, file: &IdlFile) -> String {
        let raw = self
            .options
            .package_name
            .as_deref()
            .or(file.package.as_deref())
            .unwrap_or("idl");
        go_package_name(raw)
    }
}

/* Lower-cased identifier usable in a Go package clause */
fn go_package_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'x');
    }
    name
}

/* Mutable state of a single generation run */
struct GenerationPass<'a> {
    generator: &'a GoCodeGenerator,
    registry: LayoutRegistry,
    body: String,
    imports: Imports,
    warnings: Vec<String>,
    interfaces: Vec<InterfaceSummary>,
}

impl<'a> GenerationPass<'a> {
    fn new(generator: &'a GoCodeGenerator) -> Self {
        Self {
            generator,
            registry: LayoutRegistry::new(&generator.options.root_interface),
            body: String::new(),
            imports: Imports::new(),
            warnings: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    fn push(&mut self, decl: Declaration) {
        self.body.push_str(&decl.source);
        self.imports.merge(decl.imports);
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    fn visit(&mut self, node: &Node) -> GenResult<()> {
        let generator = self.generator;
        let mapper = &generator.mapper;
        debug!(kind = node.kind_name(), name = node.name().unwrap_or(""), "visiting node");

        match node {
            Node::Import(import) => {
                debug!(files = ?import.files, "imports are resolved before generation");
            }
            Node::ImportLib(_) => {}
            Node::Interface(iface) => self.visit_interface(iface)?,
            Node::Enum(node) => {
                let (decl, gaps) = emit_enum(node);
                self.push(decl);
                for gap in gaps {
                    self.warn(format!(
                        "enum {}: value {} follows non-integer literal '{}' and repeats it instead of incrementing",
                        gap.enum_name, gap.value_name, gap.after_literal
                    ));
                }
            }
            Node::Struct(node) => self.push(emit_struct(mapper, node)),
            Node::Typedef(node) => self.push(emit_typedef(mapper, node)),
            Node::Constdef(node) => self.push(emit_constdef(mapper, node)),
            Node::ModuleConstant(node) => self.push(emit_module_constant(node)),
            Node::Library(library) => {
                self.body.push_str(&format!("// Library: {}\n\n", library.name));
                if let Some(uuid) = find_uuid(&library.attributes) {
                    if generator.options.emit_guids {
                        self.push(emit_guid_var(mapper, "LIBID", &library.name, uuid));
                    }
                }
                for child in &library.nodes {
                    self.visit(child)?;
                }
            }
            Node::Module(module) => {
                for child in &module.nodes {
                    self.visit(child)?;
                }
            }
            Node::CoClass(coclass) => {
                if let Some(uuid) = find_uuid(&coclass.attributes) {
                    if generator.options.emit_guids {
                        self.push(emit_guid_var(mapper, "CLSID", &coclass.name, uuid));
                    }
                }
            }
        }
        Ok(())
    }

    fn visit_interface(&mut self, iface: &InterfaceNode) -> GenResult<()> {
        let generator = self.generator;
        let mapper = &generator.mapper;

        let layout = match self.registry.register(iface) {
            Some(layout) => layout.clone(),
            None => {
                debug!(interface = %iface.name, "skipping interface without methods");
                return Ok(());
            }
        };
        if !layout.parent_known() {
            self.warn(format!(
                "interface {} extends {}, which is not declared in this document; assuming it is defined elsewhere in the package",
                iface.name, layout.parent
            ));
        }

        let stubs = plan_methods(mapper, iface)?;
        debug!(
            interface = %iface.name,
            parent = %layout.parent,
            methods = stubs.len(),
            "emitting vtable"
        );

        self.body
            .push_str(&format!("{}\n// {}\n\n", INTERFACE_RULE, iface.name));
        if let Some(uuid) = find_uuid(&iface.attributes) {
            if generator.options.emit_guids {
                self.push(emit_guid_var(mapper, "IID", &iface.name, uuid));
            }
        }
        let decl = emit_interface(mapper, iface, &layout, &stubs);
        self.push(decl);

        self.interfaces.push(InterfaceSummary {
            layout,
            methods: stubs,
        });
        Ok(())
    }
}
