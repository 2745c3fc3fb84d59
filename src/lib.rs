//! Schema Chain
//!
//! Resolve types into named JSON schemas through an ordered chain of model
//! converters.
//!
//! Each [`ModelConverter`] receives a request, the shared
//! [`ResolutionContext`] and a [`Chain`] cursor over the converters after it.
//! It may delegate to the rest of the chain and rewrite the result, answer the
//! request itself, or decline. Composite types resolve their property types
//! through the same context, so every named schema discovered along the way
//! ends up in one registry.
//!
//! # Example
//!
//! ```
//! use schema_chain::{load_catalog_str, Case, ModelConverters, NamingTransformer};
//! use serde_json::json;
//!
//! let catalog = load_catalog_str(r#"{
//!     "types": {
//!         "SnakeCaseModel": { "properties": { "bar": "Bar", "title": "string" } },
//!         "Bar": { "properties": { "foo": "string" } }
//!     }
//! }"#).unwrap();
//!
//! let mut converters = ModelConverters::new(catalog);
//! converters.add_converter(Box::new(NamingTransformer::new(Case::Snake)));
//!
//! let models = converters.read_all(&"SnakeCaseModel".parse().unwrap()).unwrap();
//! assert_eq!(
//!     serde_json::to_value(&models).unwrap(),
//!     json!({
//!         "bar": {
//!             "type": "object",
//!             "properties": { "foo": { "type": "string" } }
//!         },
//!         "snake_case_model": {
//!             "type": "object",
//!             "properties": {
//!                 "bar": { "$ref": "#/components/schemas/bar" },
//!                 "title": { "type": "string" }
//!             }
//!         }
//!     })
//! );
//! ```
//!
//! # Writing a converter
//!
//! | Role | Proceeds? | Returns |
//! |------|-----------|---------|
//! | Passthrough | yes | the delegate's node unchanged |
//! | Decorator | yes | the delegate's node, rewritten |
//! | Producer | no | its own node |
//! | Opt-out | no | `None` |
//!
//! A decorator that renames a registered schema must go through
//! [`ResolutionContext::define_model`] with the previous name, and must rewrite
//! references to renamed schemas the same way, so that the finished registry
//! has no dangling references.

mod catalog;
mod chain;
mod context;
mod error;
mod integrity;
mod loader;
mod naming;
mod reflection;
mod refs;
mod schema;
mod types;

pub use catalog::{ObjectType, PropertyDef, TypeCatalog, TypeShape};
pub use chain::{Chain, ModelConverter, ModelConverters, ResolvedSchema};
pub use context::{CollisionPolicy, ResolutionContext};
pub use error::{ConvertError, LoadError, TypeHandleError};
pub use integrity::{check_references, Diagnostic, IntegrityReport, Severity};
pub use loader::{is_url, load_catalog, load_catalog_auto, load_catalog_str};
pub use naming::{Case, NamingTransformer};
pub use reflection::ReflectionConverter;
pub use refs::{construct_ref, extract_simple_name, RefPointer, COMPONENTS_SCHEMAS};
pub use schema::{SchemaKind, SchemaNode, SchemaType, Xml};
pub use types::{MemberContext, PrimitiveType, TypeDescriptor, TypeHandle};

#[cfg(feature = "remote")]
pub use loader::load_catalog_url;
