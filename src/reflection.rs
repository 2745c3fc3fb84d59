//! The terminal producer: builds schemas from catalog declarations.

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::{ObjectType, TypeCatalog, TypeShape};
use crate::chain::{Chain, ModelConverter};
use crate::context::ResolutionContext;
use crate::error::ConvertError;
use crate::refs::RefPointer;
use crate::schema::SchemaNode;
use crate::types::{PrimitiveType, TypeDescriptor};

/// Resolves primitives, arrays and catalog object types without delegating.
///
/// Object types are registered under their schema name after all of their
/// properties have been resolved. Properties of object type become references
/// to the declared schema name; converters that rename schemas rewrite those
/// references along with the target.
pub struct ReflectionConverter {
    catalog: TypeCatalog,
}

impl ReflectionConverter {
    pub fn new(catalog: TypeCatalog) -> Self {
        Self { catalog }
    }

    fn resolve_primitive(primitive: PrimitiveType, descriptor: &TypeDescriptor) -> SchemaNode {
        let mut node = SchemaNode::primitive(primitive.schema_type(), primitive.format());
        node.description = descriptor.description.clone();
        node
    }

    fn resolve_object(
        &self,
        declared: &str,
        object: &ObjectType,
        descriptor: &TypeDescriptor,
        context: &mut ResolutionContext<'_>,
    ) -> Result<SchemaNode, ConvertError> {
        let mut properties = IndexMap::with_capacity(object.properties.len());
        for (key, property) in &object.properties {
            let mut member = TypeDescriptor::new(property.handle().clone()).with_member(declared, key);
            if let Some(description) = property.description() {
                member = member.with_description(description);
            }

            let node = self
                .resolve_member(&member, context)?
                .ok_or_else(|| unsupported_property(&member))?;
            properties.insert(key.clone(), node);
        }

        let mut node = SchemaNode::object();
        node.title = object.title.clone();
        node.description = object.description.clone();
        node.xml = object.xml.clone();
        node.required = object.required.clone();
        if !properties.is_empty() {
            node.properties = Some(properties);
        }

        let name = schema_name(declared, object, descriptor);
        node.name = Some(name.to_string());
        context.define_model(name, node.clone(), descriptor, None)?;
        Ok(node)
    }

    /// Schema for a property or array element.
    ///
    /// Named object types are resolved for their registry side effect and
    /// referenced by name; everything else is inlined.
    fn resolve_member(
        &self,
        member: &TypeDescriptor,
        context: &mut ResolutionContext<'_>,
    ) -> Result<Option<SchemaNode>, ConvertError> {
        let Some(TypeShape::Object(declared, object)) = self.catalog.describe(&member.handle) else {
            return context.resolve(member);
        };

        let resolved = context.resolve(member)?;
        if resolved.is_none() && !context.is_processing(&member.handle) {
            return Ok(None);
        }
        let pointer = RefPointer::schema(schema_name(declared, object, member));
        Ok(Some(SchemaNode::reference(&pointer)))
    }
}

fn unsupported_property(member: &TypeDescriptor) -> ConvertError {
    let (model, property) = member
        .member
        .as_ref()
        .map(|site| (site.owner.clone(), site.property.clone()))
        .unwrap_or_default();
    ConvertError::UnsupportedProperty {
        model,
        property,
        type_name: member.handle.to_string(),
    }
}

fn schema_name<'a>(declared: &'a str, object: &'a ObjectType, descriptor: &'a TypeDescriptor) -> &'a str {
    descriptor
        .name
        .as_deref()
        .or(object.schema_name.as_deref())
        .unwrap_or(declared)
}

impl ModelConverter for ReflectionConverter {
    fn name(&self) -> &str {
        "ReflectionConverter"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        context: &mut ResolutionContext<'_>,
        _chain: Chain<'_>,
    ) -> Result<Option<SchemaNode>, ConvertError> {
        match self.catalog.describe(&descriptor.handle) {
            Some(TypeShape::Primitive(primitive)) => {
                Ok(Some(Self::resolve_primitive(primitive, descriptor)))
            }
            Some(TypeShape::Array(items)) => {
                let element = descriptor.items(items);
                let node = self.resolve_member(&element, context)?.map(|items| {
                    let mut node = SchemaNode::array(items);
                    node.description = descriptor.description.clone();
                    node
                });
                Ok(node)
            }
            Some(TypeShape::Object(declared, object)) => self
                .resolve_object(declared, object, descriptor, context)
                .map(Some),
            None => {
                debug!(
                    handle = %descriptor.handle,
                    member = ?descriptor.member,
                    "type not found in catalog"
                );
                Ok(None)
            }
        }
    }
}
