//! The resolution context: a run-scoped registry of named schemas.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::chain::{Chain, ModelConverter};
use crate::error::ConvertError;
use crate::schema::SchemaNode;
use crate::types::{TypeDescriptor, TypeHandle};

/// What to do when a schema name is claimed by a second, different type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Reject the definition with [`ConvertError::NameCollision`].
    #[default]
    Fail,
    /// Replace the existing entry; the last writer wins.
    Overwrite,
}

/// Registry and bookkeeping for one conversion run.
///
/// Created by [`ModelConverters::context`](crate::ModelConverters::context) and
/// passed by `&mut` to every converter. An entry is added by
/// [`define_model`](Self::define_model), moved by a rename, and replaced by the
/// final node its own type resolves to.
pub struct ResolutionContext<'a> {
    converters: &'a [Box<dyn ModelConverter>],
    collision_policy: CollisionPolicy,
    models: IndexMap<String, SchemaNode>,
    origins: HashMap<String, TypeHandle>,
    resolved: HashMap<TypeHandle, SchemaNode>,
    processing: HashSet<TypeHandle>,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(
        converters: &'a [Box<dyn ModelConverter>],
        collision_policy: CollisionPolicy,
    ) -> Self {
        Self {
            converters,
            collision_policy,
            models: IndexMap::new(),
            origins: HashMap::new(),
            resolved: HashMap::new(),
            processing: HashSet::new(),
        }
    }

    /// Resolve `descriptor` through the whole chain.
    ///
    /// A type that already resolved to a named schema during this run is
    /// answered from the cache. A type that is still being resolved further up
    /// the stack yields `None`; see [`is_processing`](Self::is_processing).
    ///
    /// When the chain returns a named node for a schema this type defined, the
    /// returned node becomes the registry entry. The registry and the cache
    /// therefore always hold the outermost converter's version.
    pub fn resolve(
        &mut self,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<SchemaNode>, ConvertError> {
        if let Some(node) = self.resolved.get(&descriptor.handle) {
            debug!(handle = %descriptor.handle, "resolved from cache");
            return Ok(Some(node.clone()));
        }
        if !self.processing.insert(descriptor.handle.clone()) {
            debug!(handle = %descriptor.handle, "recursive reference to a type in progress");
            return Ok(None);
        }

        let converters = self.converters;
        let result = Chain::new(converters).proceed(descriptor, self);
        self.processing.remove(&descriptor.handle);

        let node = result?;
        if let Some(node) = &node {
            if let Some(name) = &node.name {
                self.store_decorated(name, node, &descriptor.handle);
                self.resolved
                    .insert(descriptor.handle.clone(), node.clone());
            }
        }
        Ok(node)
    }

    /// Replace the entry `handle` registered as `name` with the node the chain
    /// finally returned, so decorators that edit without renaming are kept.
    fn store_decorated(&mut self, name: &str, node: &SchemaNode, handle: &TypeHandle) {
        if self.origins.get(name) != Some(handle) {
            return;
        }
        if let Some(entry) = self.models.get_mut(name) {
            if *entry != *node {
                debug!(name, handle = %handle, "registry entry updated by decorator");
                *entry = node.clone();
            }
        }
    }

    /// Whether `handle` is being resolved further up the current stack.
    pub fn is_processing(&self, handle: &TypeHandle) -> bool {
        self.processing.contains(handle)
    }

    /// Register `node` under `name`.
    ///
    /// When `previous_name` is given and differs from `name`, the old entry is
    /// removed and the new name takes its position in the registry. The
    /// node's own `name` is set to `name`.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::NameCollision` if `name` belongs to a different
    /// type and the policy is [`CollisionPolicy::Fail`].
    pub fn define_model(
        &mut self,
        name: &str,
        mut node: SchemaNode,
        descriptor: &TypeDescriptor,
        previous_name: Option<&str>,
    ) -> Result<(), ConvertError> {
        if let Some(existing) = self.origins.get(name) {
            if *existing != descriptor.handle {
                match self.collision_policy {
                    CollisionPolicy::Fail => {
                        return Err(ConvertError::NameCollision {
                            name: name.to_string(),
                            existing: existing.to_string(),
                            incoming: descriptor.handle.to_string(),
                        });
                    }
                    CollisionPolicy::Overwrite => {
                        warn!(
                            name,
                            existing = %existing,
                            incoming = %descriptor.handle,
                            "overwriting schema defined by another type"
                        );
                    }
                }
            }
        }

        node.name = Some(name.to_string());
        let slot = previous_name
            .filter(|previous| *previous != name)
            .and_then(|previous| {
                self.origins.remove(previous);
                self.models.shift_remove_full(previous)
            })
            .map(|(index, _, _)| index);

        match slot {
            Some(index) if !self.models.contains_key(name) => {
                debug!(name, previous = ?previous_name, "renamed schema");
                self.models.shift_insert(index, name.to_string(), node);
            }
            _ => {
                debug!(name, handle = %descriptor.handle, "defined schema");
                self.models.insert(name.to_string(), node);
            }
        }
        self.origins
            .insert(name.to_string(), descriptor.handle.clone());
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&SchemaNode> {
        self.models.get(name)
    }

    /// All registered schemas in discovery order.
    pub fn defined_models(&self) -> &IndexMap<String, SchemaNode> {
        &self.models
    }

    /// The type that defined the schema registered as `name`.
    pub fn origin(&self, name: &str) -> Option<&TypeHandle> {
        self.origins.get(name)
    }

    pub fn into_models(self) -> IndexMap<String, SchemaNode> {
        self.models
    }

    /// Registry entries defined by `handle` only.
    pub fn into_models_defined_by(self, handle: &TypeHandle) -> IndexMap<String, SchemaNode> {
        let origins = self.origins;
        self.models
            .into_iter()
            .filter(|(name, _)| origins.get(name) == Some(handle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;

    fn descriptor(name: &str) -> TypeDescriptor {
        TypeDescriptor::new(TypeHandle::named(name))
    }

    fn object() -> SchemaNode {
        SchemaNode::object().with_property("foo", SchemaNode::primitive(SchemaType::String, None))
    }

    #[test]
    fn define_and_lookup() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Fail);
        context
            .define_model("Bar", object(), &descriptor("Bar"), None)
            .unwrap();

        let node = context.lookup("Bar").unwrap();
        assert_eq!(node.name.as_deref(), Some("Bar"));
        assert!(context.lookup("Baz").is_none());
        assert_eq!(context.origin("Bar"), Some(&TypeHandle::named("Bar")));
    }

    #[test]
    fn rename_replaces_old_entry() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Fail);
        let bar = descriptor("Bar");
        context.define_model("Bar", object(), &bar, None).unwrap();
        context
            .define_model("bar", object(), &bar, Some("Bar"))
            .unwrap();

        assert!(context.lookup("Bar").is_none());
        assert_eq!(context.lookup("bar").unwrap().name.as_deref(), Some("bar"));
        assert_eq!(context.defined_models().len(), 1);
        assert!(context.origin("Bar").is_none());
    }

    #[test]
    fn rename_keeps_discovery_position() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Fail);
        context
            .define_model("First", object(), &descriptor("First"), None)
            .unwrap();
        context
            .define_model("Second", object(), &descriptor("Second"), None)
            .unwrap();
        context
            .define_model("first", object(), &descriptor("First"), Some("First"))
            .unwrap();

        let names: Vec<_> = context.defined_models().keys().cloned().collect();
        assert_eq!(names, ["first", "Second"]);
    }

    #[test]
    fn same_type_redefinition_is_not_a_collision() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Fail);
        context
            .define_model("Bar", SchemaNode::object(), &descriptor("Bar"), None)
            .unwrap();
        context
            .define_model("Bar", object(), &descriptor("Bar"), None)
            .unwrap();
        assert!(context.lookup("Bar").unwrap().properties.is_some());
    }

    #[test]
    fn collision_fails_by_default() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Fail);
        context
            .define_model("foo_bar", object(), &descriptor("FooBar"), None)
            .unwrap();
        let result = context.define_model("foo_bar", object(), &descriptor("Foo_Bar"), None);

        assert!(matches!(
            result,
            Err(ConvertError::NameCollision { ref existing, ref incoming, .. })
                if existing == "FooBar" && incoming == "Foo_Bar"
        ));
    }

    #[test]
    fn collision_overwrites_when_allowed() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Overwrite);
        context
            .define_model("foo_bar", object(), &descriptor("FooBar"), None)
            .unwrap();
        context
            .define_model("foo_bar", SchemaNode::object(), &descriptor("Foo_Bar"), None)
            .unwrap();

        assert_eq!(context.defined_models().len(), 1);
        assert!(context.lookup("foo_bar").unwrap().properties.is_none());
        assert_eq!(context.origin("foo_bar"), Some(&TypeHandle::named("Foo_Bar")));
    }

    #[test]
    fn rename_onto_overwritten_name_drops_previous_entry() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Overwrite);
        context
            .define_model("foo_bar", object(), &descriptor("FooBar"), None)
            .unwrap();
        context
            .define_model("Foo_Bar", object(), &descriptor("Foo_Bar"), None)
            .unwrap();
        context
            .define_model("foo_bar", object(), &descriptor("Foo_Bar"), Some("Foo_Bar"))
            .unwrap();

        let names: Vec<_> = context.defined_models().keys().cloned().collect();
        assert_eq!(names, ["foo_bar"]);
    }

    #[test]
    fn decorated_node_replaces_entry_of_its_own_type() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Fail);
        context
            .define_model("Bar", object(), &descriptor("Bar"), None)
            .unwrap();
        context
            .define_model("Root", object(), &descriptor("Root"), None)
            .unwrap();

        let mut decorated = context.lookup("Bar").unwrap().clone();
        decorated.title = Some("decorated".into());
        context.store_decorated("Bar", &decorated, &TypeHandle::named("Bar"));
        context.store_decorated("Root", &decorated, &TypeHandle::named("Bar"));

        assert_eq!(context.lookup("Bar").unwrap().title.as_deref(), Some("decorated"));
        assert!(context.lookup("Root").unwrap().title.is_none());
        let names: Vec<_> = context.defined_models().keys().cloned().collect();
        assert_eq!(names, ["Bar", "Root"]);
    }

    #[test]
    fn into_models_defined_by_filters_on_origin() {
        let mut context = ResolutionContext::new(&[], CollisionPolicy::Fail);
        context
            .define_model("Bar", object(), &descriptor("Bar"), None)
            .unwrap();
        context
            .define_model("Root", object(), &descriptor("Root"), None)
            .unwrap();

        let models = context.into_models_defined_by(&TypeHandle::named("Root"));
        assert_eq!(models.keys().collect::<Vec<_>>(), ["Root"]);
    }
}
