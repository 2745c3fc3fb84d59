//! Schema nodes produced by the converter chain.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::refs::{extract_simple_name, RefPointer};

/// JSON Schema type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Structural kind of a node, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Primitive,
    Object,
    Array,
    Reference,
}

/// XML rendering hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Xml {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,
}

/// A resolved schema.
///
/// `name` is set once the node is registered in a
/// [`ResolutionContext`](crate::ResolutionContext); it is not serialized since
/// the registry key carries it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(skip)]
    pub name: Option<String>,
    /// Raw pointer text. May be malformed or point outside the registry.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<Xml>,
}

impl SchemaNode {
    pub fn primitive(schema_type: SchemaType, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type),
            format: format.map(String::from),
            ..Self::default()
        }
    }

    /// An object node with no property mapping.
    pub fn object() -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            ..Self::default()
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn reference(pointer: &RefPointer) -> Self {
        Self {
            reference: Some(pointer.to_string()),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, node: SchemaNode) -> Self {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), node);
        self
    }

    pub fn kind(&self) -> SchemaKind {
        if self.reference.is_some() {
            return SchemaKind::Reference;
        }
        match self.schema_type {
            Some(SchemaType::Object) => SchemaKind::Object,
            Some(SchemaType::Array) => SchemaKind::Array,
            _ if self.properties.is_some() => SchemaKind::Object,
            _ => SchemaKind::Primitive,
        }
    }

    /// Parsed `$ref`, if present and well formed.
    pub fn ref_pointer(&self) -> Option<RefPointer> {
        self.reference.as_deref().and_then(extract_simple_name)
    }
}
