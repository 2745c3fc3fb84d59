//! Naming-convention converter.
//!
//! [`NamingTransformer`] rewrites property keys, registered schema names and
//! the references between them into a target case. It is the reference
//! example of a decorating converter: it proceeds first, then rewrites what
//! the rest of the chain produced, keeping the registry in step through
//! [`ResolutionContext::define_model`].

use indexmap::IndexMap;
use tracing::debug;

use crate::chain::{Chain, ModelConverter};
use crate::context::ResolutionContext;
use crate::error::ConvertError;
use crate::schema::SchemaNode;
use crate::types::TypeDescriptor;

/// Target naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    /// `snake_case_model`
    Snake,
    /// `kebab-case-model`
    Kebab,
}

impl Case {
    fn separator(&self) -> char {
        match self {
            Case::Snake => '_',
            Case::Kebab => '-',
        }
    }

    /// Convert `input` to this case.
    ///
    /// A separator goes before the start of every run of uppercase letters and
    /// every run of digits, unless it would lead the string or already follows
    /// a `_` or `-`; the result is lowercased. Existing separators are kept, so
    /// `a_1_b` stays `a_1_b` in kebab case. Blank input is returned as is.
    /// Converting an already converted string is a no-op.
    pub fn apply(&self, input: &str) -> String {
        if input.trim().is_empty() {
            return input.to_string();
        }

        let separator = self.separator();
        let mut output = String::with_capacity(input.len() + 4);
        let mut previous: Option<char> = None;
        for c in input.chars() {
            if let Some(prev) = previous {
                let starts_run = (c.is_uppercase() && !prev.is_uppercase())
                    || (c.is_ascii_digit() && !prev.is_ascii_digit());
                if starts_run && !is_separator(prev) {
                    output.push(separator);
                }
            }
            output.extend(c.to_lowercase());
            previous = Some(c);
        }
        output
    }
}

fn is_separator(c: char) -> bool {
    c == '_' || c == '-'
}

/// Rewrites names produced by the rest of the chain into a [`Case`].
#[derive(Debug, Clone)]
pub struct NamingTransformer {
    case: Case,
}

impl NamingTransformer {
    pub fn new(case: Case) -> Self {
        Self { case }
    }

    /// Rewrite the simple name of `node`'s own reference, and of references
    /// nested in its array items.
    ///
    /// Pointers that do not split into a namespace and a non-blank simple name
    /// are left untouched.
    fn rewrite_references(&self, node: &mut SchemaNode) {
        if let Some(pointer) = node.ref_pointer() {
            let renamed = pointer.with_simple_name(self.case.apply(&pointer.simple_name));
            node.reference = Some(renamed.to_string());
        }
        if let Some(items) = node.items.as_deref_mut() {
            self.rewrite_references(items);
        }
    }
}

impl ModelConverter for NamingTransformer {
    fn name(&self) -> &str {
        "NamingTransformer"
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        context: &mut ResolutionContext<'_>,
        chain: Chain<'_>,
    ) -> Result<Option<SchemaNode>, ConvertError> {
        let Some(mut node) = chain.proceed(descriptor, context)? else {
            return Ok(None);
        };

        if let Some(properties) = node.properties.take() {
            let mut renamed = IndexMap::with_capacity(properties.len());
            for (key, mut property) in properties {
                self.rewrite_references(&mut property);
                let converted = self.case.apply(&key);
                if renamed.insert(converted.clone(), property).is_some() {
                    debug!(key = %key, converted = %converted, "property keys collapsed");
                }
            }
            node.properties = Some(renamed);

            for required in &mut node.required {
                *required = self.case.apply(required);
            }
        }
        self.rewrite_references(&mut node);

        if let Some(previous) = node.name.clone() {
            let name = self.case.apply(&previous);
            context.define_model(&name, node.clone(), descriptor, Some(&previous))?;
            node.name = Some(name);
        }

        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversions() {
        let cases = [
            ("SnakeCaseModel", "snake_case_model"),
            ("snakeCaseModel", "snake_case_model"),
            ("bar", "bar"),
            ("field1", "field_1"),
            ("field12Name", "field_12_name"),
            ("userID", "user_id"),
            ("HTTPCode", "httpcode"),
            ("A1B", "a_1_b"),
            ("already_snake", "already_snake"),
        ];
        for (input, expected) in cases {
            assert_eq!(Case::Snake.apply(input), expected, "{input}");
        }
    }

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(Case::Kebab.apply("SnakeCaseModel"), "snake-case-model");
        assert_eq!(Case::Kebab.apply("version2"), "version-2");
    }

    #[test]
    fn blank_input_is_unchanged() {
        assert_eq!(Case::Snake.apply(""), "");
        assert_eq!(Case::Snake.apply("   "), "   ");
    }

    #[test]
    fn existing_separators_of_either_style_are_kept() {
        assert_eq!(Case::Kebab.apply("a_1_b"), "a_1_b");
        assert_eq!(Case::Kebab.apply("snake_Case"), "snake_case");
        assert_eq!(Case::Snake.apply("kebab-Case-2"), "kebab-case-2");
        assert_eq!(Case::Snake.apply("a-1-b"), "a-1-b");
    }

    #[test]
    fn leading_separator_in_input_is_kept() {
        assert_eq!(Case::Snake.apply("_Private"), "_private");
    }

    #[test]
    fn conversion_is_idempotent() {
        let inputs = [
            "SnakeCaseModel",
            "field12Name",
            "userID",
            "x9Y",
            "a_1_b",
            "_leading",
            "ÉtéModel",
        ];
        for case in [Case::Snake, Case::Kebab] {
            for input in inputs {
                let once = case.apply(input);
                assert_eq!(case.apply(&once), once, "{case:?} {input}");
            }
        }
    }
}
