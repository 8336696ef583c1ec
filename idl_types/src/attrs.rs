use serde_derive::{Deserialize, Serialize};

/* Attribute kinds that may decorate interfaces, libraries, coclasses and typedefs */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeKind {
    Uuid,
    Helpstring,
    Version,
    Object,
    Local,
    PointerDefault,
    Dual,
    Oleautomation,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Attribute {
    pub kind: AttributeKind,
    #[serde(default)]
    pub value: String,
}

impl Attribute {
    pub fn new(kind: AttributeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn uuid(value: impl Into<String>) -> Self {
        Self::new(AttributeKind::Uuid, value)
    }
}

/* Direction and sizing attributes on method parameters and struct fields */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum ParamAttributeKind {
    In,
    Out,
    Retval,
    SizeIs,
    LengthIs,
    IidIs,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ParamAttribute {
    pub kind: ParamAttributeKind,
    #[serde(default)]
    pub value: String,
}

impl ParamAttribute {
    pub fn new(kind: ParamAttributeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn input() -> Self {
        Self::new(ParamAttributeKind::In, "")
    }

    pub fn output() -> Self {
        Self::new(ParamAttributeKind::Out, "")
    }
}

/// Returns the value of the first attribute of `kind`, if any.
pub fn find_attribute(attributes: &[Attribute], kind: AttributeKind) -> Option<&str> {
    attributes
        .iter()
        .find(|attr| attr.kind == kind)
        .map(|attr| attr.value.as_str())
}

/// Returns the uuid attribute with surrounding braces and whitespace removed.
pub fn find_uuid(attributes: &[Attribute]) -> Option<&str> {
    find_attribute(attributes, AttributeKind::Uuid)
        .map(|uuid| uuid.trim().trim_start_matches('{').trim_end_matches('}'))
        .filter(|uuid| !uuid.is_empty())
}
