//! Type catalog loading from various sources.
//!
//! Handles loading catalogs from files, strings, and HTTP URLs.

use std::path::Path;

use crate::catalog::TypeCatalog;
use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a catalog from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// `LoadError::InvalidJson` if the file isn't a valid catalog, or a
/// validation error from [`TypeCatalog::validate`].
pub fn load_catalog(path: &Path) -> Result<TypeCatalog, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_catalog_str(&content)
}

/// Load a catalog from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't a valid catalog.
pub fn load_catalog_str(content: &str) -> Result<TypeCatalog, LoadError> {
    let catalog: TypeCatalog =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;
    catalog.validate()?;
    Ok(catalog)
}

/// Load a catalog from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the response
/// status is not a success, or `LoadError::InvalidJson` if the body isn't a
/// valid catalog.
#[cfg(feature = "remote")]
pub fn load_catalog_url(url: &str) -> Result<TypeCatalog, LoadError> {
    let network_error = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    load_catalog_str(&body)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a catalog from a file path or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_catalog_auto(source: &str) -> Result<TypeCatalog, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_catalog_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_catalog(Path::new(source))
    }
}
