//! The type catalog: a declarative stand-in for runtime type reflection.
//!
//! A catalog lists named object types and their properties. Property types are
//! [`TypeHandle`]s naming a primitive, another catalog type, or an array of
//! either.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::schema::Xml;
use crate::types::{PrimitiveType, TypeHandle};

/// All object types known to a conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeCatalog {
    #[serde(default)]
    pub types: IndexMap<String, ObjectType>,
}

/// Declaration of one object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObjectType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registry name, when it differs from the declared type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<Xml>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDef>,
}

impl ObjectType {
    pub fn with_property(mut self, name: impl Into<String>, handle: TypeHandle) -> Self {
        self.properties.insert(name.into(), PropertyDef::Type(handle));
        self
    }
}

/// A property declaration: either just a type, or a type with per-site details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyDef {
    Type(TypeHandle),
    Detailed {
        #[serde(rename = "type")]
        handle: TypeHandle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl PropertyDef {
    pub fn handle(&self) -> &TypeHandle {
        match self {
            PropertyDef::Type(handle) | PropertyDef::Detailed { handle, .. } => handle,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            PropertyDef::Type(_) => None,
            PropertyDef::Detailed { description, .. } => description.as_deref(),
        }
    }
}

/// What a handle turned out to be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeShape<'a> {
    Primitive(PrimitiveType),
    Object(&'a str, &'a ObjectType),
    Array(&'a TypeHandle),
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, name: impl Into<String>, object: ObjectType) -> Self {
        self.types.insert(name.into(), object);
        self
    }

    /// Describe `handle`, or `None` if it names neither a primitive nor a catalog type.
    pub fn describe<'a>(&'a self, handle: &'a TypeHandle) -> Option<TypeShape<'a>> {
        match handle {
            TypeHandle::Array(items) => Some(TypeShape::Array(items)),
            TypeHandle::Named(name) => PrimitiveType::parse(name)
                .map(TypeShape::Primitive)
                .or_else(|| {
                    self.types
                        .get_key_value(name.as_str())
                        .map(|(declared, object)| TypeShape::Object(declared.as_str(), object))
                }),
        }
    }

    /// Check declarations that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if a type shadows a primitive or lists an unknown
    /// required property.
    pub fn validate(&self) -> Result<(), LoadError> {
        for (name, object) in &self.types {
            if PrimitiveType::parse(name).is_some() {
                return Err(LoadError::ReservedTypeName { name: name.clone() });
            }
            if let Some(property) = object
                .required
                .iter()
                .find(|required| !object.properties.contains_key(required.as_str()))
            {
                return Err(LoadError::UnknownRequiredProperty {
                    name: name.clone(),
                    property: property.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_resolves_each_shape() {
        let catalog = TypeCatalog::new().with_type(
            "Bar",
            ObjectType::default().with_property("foo", TypeHandle::named("string")),
        );

        let string = TypeHandle::named("string");
        assert_eq!(
            catalog.describe(&string),
            Some(TypeShape::Primitive(PrimitiveType::String))
        );

        let bar = TypeHandle::named("Bar");
        assert!(matches!(
            catalog.describe(&bar),
            Some(TypeShape::Object("Bar", _))
        ));

        let bars: TypeHandle = "Bar[]".parse().unwrap();
        assert_eq!(catalog.describe(&bars), Some(TypeShape::Array(&bar)));

        assert_eq!(catalog.describe(&TypeHandle::named("Money")), None);
    }

    #[test]
    fn deserializes_short_and_detailed_properties() {
        let catalog: TypeCatalog = serde_json::from_value(json!({
            "types": {
                "Order": {
                    "xml": { "name": "order" },
                    "properties": {
                        "id": "uuid",
                        "note": { "type": "string", "description": "free text" },
                        "lines": "Line[]"
                    }
                }
            }
        }))
        .unwrap();

        let order = &catalog.types["Order"];
        let keys: Vec<_> = order.properties.keys().cloned().collect();
        assert_eq!(keys, ["id", "note", "lines"]);
        assert_eq!(order.properties["note"].description(), Some("free text"));
        assert_eq!(
            order.properties["lines"].handle(),
            &"Line[]".parse::<TypeHandle>().unwrap()
        );
        assert_eq!(order.xml.as_ref().unwrap().name.as_deref(), Some("order"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = serde_json::from_value::<TypeCatalog>(json!({
            "types": { "Bar": { "propertys": {} } }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_reserved_names() {
        let catalog = TypeCatalog::new().with_type("string", ObjectType::default());
        assert!(matches!(
            catalog.validate(),
            Err(LoadError::ReservedTypeName { name }) if name == "string"
        ));
    }

    #[test]
    fn validate_rejects_unknown_required_property() {
        let catalog = TypeCatalog::new().with_type(
            "Bar",
            ObjectType {
                required: vec!["missing".into()],
                ..ObjectType::default()
            },
        );
        assert!(matches!(
            catalog.validate(),
            Err(LoadError::UnknownRequiredProperty { property, .. }) if property == "missing"
        ));
    }
}
