//! Error types for catalog loading and schema conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a type catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Catalog errors (exit code 2)
    #[error("invalid catalog JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("type name \"{name}\" is reserved for a primitive type")]
    ReservedTypeName { name: String },

    #[error("type \"{name}\" lists \"{property}\" as required but declares no such property")]
    UnknownRequiredProperty { name: String, property: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors raised by converters or by the resolution context during a pass.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("property {model}.{property} has type \"{type_name}\" which no converter supports")]
    UnsupportedProperty {
        model: String,
        property: String,
        type_name: String,
    },

    #[error("schema name \"{name}\" is already defined by type \"{existing}\", cannot define it for \"{incoming}\"")]
    NameCollision {
        name: String,
        existing: String,
        incoming: String,
    },

    #[error("schema \"{schema}\" references \"{target}\" which is not defined")]
    DanglingReference { schema: String, target: String },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::DanglingReference { .. } => 1,
            _ => 2,
        }
    }
}

/// A type handle that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type handle \"{value}\": {reason}")]
pub struct TypeHandleError {
    pub value: String,
    pub reason: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("types.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = LoadError::ReservedTypeName {
            name: "string".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn convert_error_exit_codes() {
        let err = ConvertError::DanglingReference {
            schema: "snake_case_model".into(),
            target: "Bar".into(),
        };
        assert_eq!(err.exit_code(), 1);

        let err = ConvertError::NameCollision {
            name: "foo_bar".into(),
            existing: "FooBar".into(),
            incoming: "Foo_Bar".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unsupported_property_display() {
        let err = ConvertError::UnsupportedProperty {
            model: "Order".into(),
            property: "total".into(),
            type_name: "Money".into(),
        };
        assert_eq!(
            err.to_string(),
            "property Order.total has type \"Money\" which no converter supports"
        );
    }
}
