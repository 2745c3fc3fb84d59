//! Reference integrity of a finished registry.
//!
//! Checks every `$ref` held by a registered schema:
//! - pointers into `#/components/schemas` must name a registered schema
//! - malformed pointers are reported but left alone
//! - pointers into other namespaces are external and reported as such

use indexmap::IndexMap;
use serde::Serialize;

use crate::refs::extract_simple_name;
use crate::schema::SchemaNode;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding about one reference.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// Registry name of the schema holding the reference.
    pub schema: String,
    /// JSON path to the reference within that schema (e.g., "/properties/bar/$ref")
    pub path: String,
    /// Simple name the reference points to, when it could be extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub message: String,
}

/// Result of checking a registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub schemas_checked: usize,
    pub references_checked: usize,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl IntegrityReport {
    /// Returns true if no reference dangles.
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    /// First dangling reference, if any.
    pub fn first_dangling(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|d| d.severity == Severity::Error)
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Check every reference held by the schemas in `models`.
pub fn check_references(models: &IndexMap<String, SchemaNode>) -> IntegrityReport {
    let mut report = IntegrityReport {
        schemas_checked: models.len(),
        ..IntegrityReport::default()
    };
    for (name, node) in models {
        check_node(node, name, "", models, &mut report);
    }
    report
}

fn check_node(
    node: &SchemaNode,
    schema: &str,
    path: &str,
    models: &IndexMap<String, SchemaNode>,
    report: &mut IntegrityReport,
) {
    if let Some(reference) = &node.reference {
        report.references_checked += 1;
        check_single_ref(reference, schema, &format!("{}/$ref", path), models, report);
    }

    if let Some(items) = &node.items {
        check_node(items, schema, &format!("{}/items", path), models, report);
    }

    if let Some(properties) = &node.properties {
        for (key, property) in properties {
            let child_path = format!("{}/properties/{}", path, escape_pointer(key));
            check_node(property, schema, &child_path, models, report);
        }
    }
}

fn check_single_ref(
    reference: &str,
    schema: &str,
    path: &str,
    models: &IndexMap<String, SchemaNode>,
    report: &mut IntegrityReport,
) {
    let Some(pointer) = extract_simple_name(reference) else {
        report.push(Diagnostic {
            severity: Severity::Warning,
            code: "W001".to_string(),
            schema: schema.to_string(),
            path: path.to_string(),
            target: None,
            message: format!("malformed reference left as is: {}", reference),
        });
        return;
    };

    if !pointer.is_local_schema() {
        report.push(Diagnostic {
            severity: Severity::Warning,
            code: "W002".to_string(),
            schema: schema.to_string(),
            path: path.to_string(),
            target: Some(pointer.simple_name),
            message: format!("external reference not checked: {}", reference),
        });
        return;
    }

    if !models.contains_key(&pointer.simple_name) {
        report.push(Diagnostic {
            severity: Severity::Error,
            code: "E001".to_string(),
            schema: schema.to_string(),
            path: path.to_string(),
            message: format!("reference to undefined schema: {}", reference),
            target: Some(pointer.simple_name),
        });
    }
}

/// Escape a key for use in a JSON Pointer (RFC 6901).
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
