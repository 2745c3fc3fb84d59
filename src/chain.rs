//! The converter chain.
//!
//! Converters run in registration order. Each one receives a [`Chain`] holding
//! the converters that have not run yet for the current request and decides
//! whether to [`proceed`](Chain::proceed) into it, post-process what comes
//! back, or answer on its own. The first registered converter is therefore the
//! outermost decorator of the final schema.

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::TypeCatalog;
use crate::context::{CollisionPolicy, ResolutionContext};
use crate::error::ConvertError;
use crate::integrity::check_references;
use crate::reflection::ReflectionConverter;
use crate::schema::SchemaNode;
use crate::types::{TypeDescriptor, TypeHandle};

/// A participant in schema resolution.
pub trait ModelConverter: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Resolve `descriptor`, optionally delegating to the rest of `chain`.
    ///
    /// Returning `Ok(None)` declines the request. A converter that proceeded
    /// and received `None` should return `None` as well.
    ///
    /// A named node may be edited and returned as is; the context stores it
    /// back under its name. Renaming goes through
    /// [`ResolutionContext::define_model`].
    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        context: &mut ResolutionContext<'_>,
        chain: Chain<'_>,
    ) -> Result<Option<SchemaNode>, ConvertError>;
}

/// One-shot cursor over the converters that have not run for a request.
pub struct Chain<'a> {
    remaining: &'a [Box<dyn ModelConverter>],
}

impl<'a> Chain<'a> {
    pub(crate) fn new(remaining: &'a [Box<dyn ModelConverter>]) -> Self {
        Self { remaining }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Invoke the next converter with the rest of the chain.
    ///
    /// Returns `Ok(None)` when no converters are left.
    pub fn proceed(
        self,
        descriptor: &TypeDescriptor,
        context: &mut ResolutionContext<'_>,
    ) -> Result<Option<SchemaNode>, ConvertError> {
        let Some((next, rest)) = self.remaining.split_first() else {
            debug!(handle = %descriptor.handle, "converter chain exhausted");
            return Ok(None);
        };
        debug!(converter = next.name(), handle = %descriptor.handle, "proceeding");
        next.resolve(descriptor, context, Chain::new(rest))
    }
}

/// Result of resolving a single root type.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSchema {
    /// The root node, `None` when no converter supports the root type.
    pub schema: Option<SchemaNode>,
    /// Every named schema discovered during the pass, in discovery order.
    pub referenced_schemas: IndexMap<String, SchemaNode>,
}

/// An ordered set of converters and the entry points that run them.
///
/// # Example
///
/// ```
/// use schema_chain::{load_catalog_str, Case, ModelConverters, NamingTransformer};
///
/// let catalog = load_catalog_str(r#"{
///     "types": {
///         "SnakeCaseModel": { "properties": { "bar": "Bar", "title": "string" } },
///         "Bar": { "properties": { "foo": "string" } }
///     }
/// }"#).unwrap();
///
/// let mut converters = ModelConverters::new(catalog);
/// converters.add_converter(Box::new(NamingTransformer::new(Case::Snake)));
///
/// let models = converters.read_all(&"SnakeCaseModel".parse().unwrap()).unwrap();
/// assert_eq!(models.keys().collect::<Vec<_>>(), ["bar", "snake_case_model"]);
/// ```
pub struct ModelConverters {
    converters: Vec<Box<dyn ModelConverter>>,
    has_terminal: bool,
    collision_policy: CollisionPolicy,
}

impl ModelConverters {
    /// Converters backed by `catalog`; the reflection converter always runs last.
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            converters: vec![Box::new(ReflectionConverter::new(catalog))],
            has_terminal: true,
            collision_policy: CollisionPolicy::default(),
        }
    }

    /// A chain with no reflection converter.
    pub fn empty() -> Self {
        Self {
            converters: Vec::new(),
            has_terminal: false,
            collision_policy: CollisionPolicy::default(),
        }
    }

    /// Set how the registry handles two types claiming the same schema name.
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Append a converter after the ones already added.
    pub fn add_converter(&mut self, converter: Box<dyn ModelConverter>) {
        let index = self.converters.len() - usize::from(self.has_terminal);
        self.converters.insert(index, converter);
    }

    /// Converter names in invocation order.
    pub fn converter_names(&self) -> Vec<&str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// A fresh context bound to this chain.
    pub fn context(&self) -> ResolutionContext<'_> {
        ResolutionContext::new(&self.converters, self.collision_policy)
    }

    /// Resolve `handle` and return every named schema discovered.
    ///
    /// An unsupported root yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError` if a converter fails, names collide under
    /// [`CollisionPolicy::Fail`], or a registered schema references a name
    /// that was never defined.
    pub fn read_all(&self, handle: &TypeHandle) -> Result<IndexMap<String, SchemaNode>, ConvertError> {
        let resolved = self.resolve_as_resolved_schema(&TypeDescriptor::new(handle.clone()))?;
        Ok(resolved.referenced_schemas)
    }

    /// Like [`read_all`](Self::read_all), but only the schemas defined by the
    /// root type itself.
    pub fn read(&self, handle: &TypeHandle) -> Result<IndexMap<String, SchemaNode>, ConvertError> {
        let mut context = self.context();
        context.resolve(&TypeDescriptor::new(handle.clone()))?;
        ensure_integrity(context.defined_models())?;
        Ok(context.into_models_defined_by(handle))
    }

    /// Resolve a descriptor, returning the root node along with the registry.
    pub fn resolve_as_resolved_schema(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<ResolvedSchema, ConvertError> {
        let mut context = self.context();
        let schema = context.resolve(descriptor)?;
        ensure_integrity(context.defined_models())?;
        Ok(ResolvedSchema {
            schema,
            referenced_schemas: context.into_models(),
        })
    }

    /// Resolve `handle` without checking references afterwards.
    pub fn read_all_unchecked(
        &self,
        handle: &TypeHandle,
    ) -> Result<IndexMap<String, SchemaNode>, ConvertError> {
        let mut context = self.context();
        context.resolve(&TypeDescriptor::new(handle.clone()))?;
        Ok(context.into_models())
    }
}

fn ensure_integrity(models: &IndexMap<String, SchemaNode>) -> Result<(), ConvertError> {
    let report = check_references(models);
    match report.first_dangling() {
        Some(diagnostic) => Err(ConvertError::DanglingReference {
            schema: diagnostic.schema.clone(),
            target: diagnostic.target.clone().unwrap_or_default(),
        }),
        None => Ok(()),
    }
}
