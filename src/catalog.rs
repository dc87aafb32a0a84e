//! # City Catalog
//! Static, ordered list of tracked cities, loaded once at startup.
//!
//! Source document shape:
//! ```json
//! { "List": [ { "CityCode": "1248991", "CityName": "Colombo", "Temp": "33.0", "Status": "Clouds" } ] }
//! ```
//! Only `CityCode` (the provider's city id) and `CityName` are consumed.
//!
//! Loading fails open: [`CityCatalog::load`] logs the problem and hands back
//! an empty catalog so the service still starts.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{error, info, warn};

use crate::error::CatalogLoadError;

pub const DEFAULT_CITIES_PATH: &str = "config/cities.json";

/// A tracked city. `id` is the upstream provider's city id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
}

impl City {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CityListDoc {
    #[serde(rename = "List", default)]
    list: Option<Vec<RawCity>>,
}

#[derive(Debug, Deserialize)]
struct RawCity {
    #[serde(rename = "CityCode")]
    code: RawCode,
    #[serde(rename = "CityName")]
    name: String,
}

// Codes are strings in the shipped document, but plain numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(u64),
}

/// Immutable, ordered city list.
#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    cities: Vec<City>,
}

impl CityCatalog {
    pub fn from_cities(cities: Vec<City>) -> Self {
        Self { cities }
    }

    /// Load from a JSON file, falling back to an empty catalog on any error.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(catalog) => {
                if catalog.is_empty() {
                    warn!(path = %path.display(), "no cities found in city list");
                } else {
                    info!(path = %path.display(), count = catalog.len(), "loaded city list");
                }
                catalog
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load city list; continuing with none");
                Self::default()
            }
        }
    }

    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse the document body. One bad code rejects the whole document.
    pub fn parse(content: &str) -> Result<Self, CatalogLoadError> {
        let doc: CityListDoc = serde_json::from_str(content)?;
        let raw = doc.list.unwrap_or_default();

        let mut cities = Vec::with_capacity(raw.len());
        for r in raw {
            let id = match r.code {
                RawCode::Number(n) => n,
                RawCode::Text(s) => {
                    s.trim()
                        .parse::<u64>()
                        .map_err(|_| CatalogLoadError::InvalidCode {
                            code: s.clone(),
                            name: r.name.clone(),
                        })?
                }
            };
            cities.push(City { id, name: r.name });
        }
        Ok(Self { cities })
    }

    /// Cities in document order.
    pub fn list(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
