use crate::attrs::{Attribute, ParamAttribute, ParamAttributeKind};
use serde_derive::{Deserialize, Serialize};

/// A parsed IDL document: an optional package name and the top-level nodes in
/// source order.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct IdlFile {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Node {
    Import(ImportNode),
    #[serde(rename = "importlib")]
    ImportLib(ImportLibNode),
    Interface(InterfaceNode),
    Enum(EnumNode),
    Struct(StructNode),
    Typedef(TypedefNode),
    Constdef(ConstdefNode),
    Library(LibraryNode),
    Module(ModuleNode),
    ModuleConstant(ModuleConstantNode),
    #[serde(rename = "coclass")]
    CoClass(CoClassNode),
}

impl Node {
    /* Declared name of the node, if the node kind carries one */
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Import(_) => None,
            Node::ImportLib(node) => Some(&node.filename),
            Node::Interface(node) => Some(&node.name),
            Node::Enum(node) => Some(&node.name),
            Node::Struct(node) => Some(&node.name),
            Node::Typedef(node) => Some(&node.name),
            Node::Constdef(node) => Some(&node.name),
            Node::Library(node) => Some(&node.name),
            Node::Module(node) => Some(&node.name),
            Node::ModuleConstant(node) => Some(&node.name),
            Node::CoClass(node) => Some(&node.name),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Import(_) => "import",
            Node::ImportLib(_) => "importlib",
            Node::Interface(_) => "interface",
            Node::Enum(_) => "enum",
            Node::Struct(_) => "struct",
            Node::Typedef(_) => "typedef",
            Node::Constdef(_) => "const",
            Node::Library(_) => "library",
            Node::Module(_) => "module",
            Node::ModuleConstant(_) => "module constant",
            Node::CoClass(_) => "coclass",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ImportNode {
    pub files: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ImportLibNode {
    pub filename: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceNode {
    pub name: String,
    /* None means the interface derives from the root base interface */
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /* Declaration order is vtable slot order */
    #[serde(default)]
    pub methods: Vec<MethodNode>,
}

impl InterfaceNode {
    pub fn new(name: impl Into<String>, parent: Option<&str>, methods: Vec<MethodNode>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            attributes: Vec::new(),
            methods,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ReturnNode {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub indirections: usize,
    #[serde(default)]
    pub array: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MethodNode {
    pub name: String,
    #[serde(default)]
    pub return_type: Option<ReturnNode>,
    #[serde(default)]
    pub params: Vec<ParamNode>,
}

impl MethodNode {
    pub fn new(name: impl Into<String>, params: Vec<ParamNode>) -> Self {
        Self {
            name: name.into(),
            return_type: Some(ReturnNode {
                type_name: "HRESULT".to_string(),
                indirections: 0,
                array: false,
            }),
            params,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ParamNode {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub indirections: usize,
    #[serde(default)]
    pub attributes: Vec<ParamAttribute>,
    #[serde(default)]
    pub array: bool,
}

impl ParamNode {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, indirections: usize) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            indirections,
            attributes: Vec::new(),
            array: false,
        }
    }

    pub fn with_attribute(mut self, attribute: ParamAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn has_attribute(&self, kind: ParamAttributeKind) -> bool {
        self.attributes.iter().any(|attr| attr.kind == kind)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumNode {
    pub name: String,
    pub values: Vec<EnumValueNode>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumValueNode {
    pub name: String,
    /* Literal text as written in the IDL; empty when omitted */
    #[serde(default)]
    pub value: String,
}

impl EnumValueNode {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructNode {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub fields: Vec<StructFieldNode>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructFieldNode {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub indirections: usize,
    #[serde(default)]
    pub attributes: Vec<ParamAttribute>,
}

impl StructFieldNode {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, indirections: usize) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            indirections,
            attributes: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypedefNode {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub indirections: usize,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl TypedefNode {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, indirections: usize) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            indirections,
            attributes: Vec::new(),
        }
    }
}

/// Value of a `const` declaration. Integers and quoted text are kept typed;
/// anything else (references to other constants, arithmetic) stays raw.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum ConstValue {
    Integer(i64),
    Text(String),
    Expr { expr: String },
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ConstdefNode {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: ConstValue,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct LibraryNode {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleNode {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleConstantNode {
    pub name: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct CoClassNode {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}
