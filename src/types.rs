//! Type descriptors: what a converter is asked to resolve.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeHandleError;
use crate::schema::SchemaType;

/// Suffix marking an array handle (`"Bar[]"`).
const ARRAY_SUFFIX: &str = "[]";

/// Identifier of a source type.
///
/// Either a named type (`"Bar"`, `"string"`) or an array of another handle.
/// The textual form is the name with one `[]` suffix per array level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeHandle {
    Named(String),
    Array(Box<TypeHandle>),
}

impl TypeHandle {
    /// Create a named handle.
    pub fn named(name: impl Into<String>) -> Self {
        TypeHandle::Named(name.into())
    }

    /// Create an array handle with `items` as element type.
    pub fn array_of(items: TypeHandle) -> Self {
        TypeHandle::Array(Box::new(items))
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Named(name) => f.write_str(name),
            TypeHandle::Array(items) => write!(f, "{}{}", items, ARRAY_SUFFIX),
        }
    }
}

impl FromStr for TypeHandle {
    type Err = TypeHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(items) = trimmed.strip_suffix(ARRAY_SUFFIX) {
            return items
                .parse()
                .map(TypeHandle::array_of)
                .map_err(|_| TypeHandleError {
                    value: s.to_string(),
                    reason: "array element type is missing",
                });
        }
        if trimmed.is_empty() {
            return Err(TypeHandleError {
                value: s.to_string(),
                reason: "type name is empty",
            });
        }
        if trimmed.contains(['[', ']']) {
            return Err(TypeHandleError {
                value: s.to_string(),
                reason: "brackets are only allowed as a trailing []",
            });
        }
        Ok(TypeHandle::Named(trimmed.to_string()))
    }
}

impl TryFrom<String> for TypeHandle {
    type Error = TypeHandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeHandle> for String {
    fn from(handle: TypeHandle) -> Self {
        handle.to_string()
    }
}

/// The property a nested resolution request originates from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberContext {
    /// Name of the owning model as declared in the catalog.
    pub owner: String,
    /// Property name as declared in the catalog.
    pub property: String,
}

/// An immutable resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub handle: TypeHandle,
    pub member: Option<MemberContext>,
    /// Schema name override for named types.
    pub name: Option<String>,
    /// Description override for inline schemas.
    pub description: Option<String>,
}

impl TypeDescriptor {
    pub fn new(handle: TypeHandle) -> Self {
        Self {
            handle,
            member: None,
            name: None,
            description: None,
        }
    }

    /// Attach the owning property.
    pub fn with_member(mut self, owner: impl Into<String>, property: impl Into<String>) -> Self {
        self.member = Some(MemberContext {
            owner: owner.into(),
            property: property.into(),
        });
        self
    }

    /// Override the schema name a named type is registered under.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Descriptor for the element type of an array request, keeping the member context.
    pub fn items(&self, items: &TypeHandle) -> Self {
        Self {
            handle: items.clone(),
            member: self.member.clone(),
            name: None,
            description: None,
        }
    }
}

/// Built-in scalar types understood without a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Boolean,
    Integer,
    Long,
    Number,
    Float,
    Double,
    Date,
    DateTime,
    Uuid,
    Object,
}

impl PrimitiveType {
    /// Look up a primitive by its type name.
    ///
    /// Returns `None` for names that are not built in.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(PrimitiveType::String),
            "boolean" => Some(PrimitiveType::Boolean),
            "integer" => Some(PrimitiveType::Integer),
            "long" => Some(PrimitiveType::Long),
            "number" => Some(PrimitiveType::Number),
            "float" => Some(PrimitiveType::Float),
            "double" => Some(PrimitiveType::Double),
            "date" => Some(PrimitiveType::Date),
            "date-time" => Some(PrimitiveType::DateTime),
            "uuid" => Some(PrimitiveType::Uuid),
            "object" => Some(PrimitiveType::Object),
            _ => None,
        }
    }

    pub fn schema_type(&self) -> SchemaType {
        match self {
            PrimitiveType::String
            | PrimitiveType::Date
            | PrimitiveType::DateTime
            | PrimitiveType::Uuid => SchemaType::String,
            PrimitiveType::Boolean => SchemaType::Boolean,
            PrimitiveType::Integer | PrimitiveType::Long => SchemaType::Integer,
            PrimitiveType::Number | PrimitiveType::Float | PrimitiveType::Double => {
                SchemaType::Number
            }
            PrimitiveType::Object => SchemaType::Object,
        }
    }

    pub fn format(&self) -> Option<&'static str> {
        match self {
            PrimitiveType::Integer => Some("int32"),
            PrimitiveType::Long => Some("int64"),
            PrimitiveType::Float => Some("float"),
            PrimitiveType::Double => Some("double"),
            PrimitiveType::Date => Some("date"),
            PrimitiveType::DateTime => Some("date-time"),
            PrimitiveType::Uuid => Some("uuid"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named_handle() {
        let handle: TypeHandle = "Bar".parse().unwrap();
        assert_eq!(handle, TypeHandle::named("Bar"));
    }

    #[test]
    fn parse_nested_array_handle() {
        let handle: TypeHandle = "string[][]".parse().unwrap();
        assert_eq!(
            handle,
            TypeHandle::array_of(TypeHandle::array_of(TypeHandle::named("string")))
        );
        assert_eq!(handle.to_string(), "string[][]");
    }

    #[test]
    fn parse_rejects_empty_names() {
        assert!("".parse::<TypeHandle>().is_err());
        assert!("  ".parse::<TypeHandle>().is_err());
        assert!("[]".parse::<TypeHandle>().is_err());
    }

    #[test]
    fn parse_rejects_stray_brackets() {
        let err = "Bar[0]".parse::<TypeHandle>().unwrap_err();
        assert_eq!(err.value, "Bar[0]");
    }

    #[test]
    fn handle_deserializes_from_string() {
        let handle: TypeHandle = serde_json::from_str(r#""Bar[]""#).unwrap();
        assert_eq!(handle, TypeHandle::array_of(TypeHandle::named("Bar")));
        assert!(serde_json::from_str::<TypeHandle>(r#""""#).is_err());
    }

    #[test]
    fn items_descriptor_keeps_member() {
        let descriptor = TypeDescriptor::new("Bar[]".parse().unwrap())
            .with_member("Order", "bars")
            .with_description("all bars");
        let items = descriptor.items(&TypeHandle::named("Bar"));
        assert_eq!(items.member, descriptor.member);
        assert_eq!(items.description, None);
    }

    #[test]
    fn primitive_formats() {
        let long = PrimitiveType::parse("long").unwrap();
        assert_eq!(long.schema_type(), SchemaType::Integer);
        assert_eq!(long.format(), Some("int64"));
        assert_eq!(PrimitiveType::parse("string").unwrap().format(), None);
        assert_eq!(PrimitiveType::parse("Bar"), None);
    }
}
