//! Reference pointers between named schemas.
//!
//! A pointer is written `{namespace}/{simple_name}`, for example
//! `#/components/schemas/Bar`. Converters that rename schemas split a pointer,
//! rewrite the simple name and join it back.

use std::fmt;

/// Namespace of pointers into the schema registry.
pub const COMPONENTS_SCHEMAS: &str = "#/components/schemas";

/// A parsed `{namespace}/{simple_name}` pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefPointer {
    pub namespace: String,
    pub simple_name: String,
}

impl RefPointer {
    pub fn new(namespace: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            simple_name: simple_name.into(),
        }
    }

    /// Pointer to a registry entry.
    pub fn schema(simple_name: impl Into<String>) -> Self {
        Self::new(COMPONENTS_SCHEMAS, simple_name)
    }

    /// Whether this pointer targets the schema registry.
    pub fn is_local_schema(&self) -> bool {
        self.namespace == COMPONENTS_SCHEMAS
    }

    /// Same namespace, new simple name.
    pub fn with_simple_name(&self, simple_name: impl Into<String>) -> Self {
        Self::new(self.namespace.clone(), simple_name)
    }
}

impl fmt::Display for RefPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&construct_ref(&self.namespace, &self.simple_name))
    }
}

/// Join a namespace and a simple name into pointer text.
pub fn construct_ref(namespace: &str, simple_name: &str) -> String {
    format!("{}/{}", namespace, simple_name)
}

/// Split pointer text at its last `/`.
///
/// Returns `None` when there is no `/` or the simple name is blank; such
/// pointers are opaque and must be left untouched.
pub fn extract_simple_name(reference: &str) -> Option<RefPointer> {
    let (namespace, simple_name) = reference.rsplit_once('/')?;
    if simple_name.trim().is_empty() {
        return None;
    }
    Some(RefPointer::new(namespace, simple_name))
}
