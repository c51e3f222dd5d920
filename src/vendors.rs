use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{RemitError, Result};

pub const DEFAULT_VENDOR_ID: i64 = 254499;
pub const DEFAULT_VENDOR_NAME: &str = "Vendlite";
pub const UNKNOWN_VENDOR: &str = "Unknown";

/// Vendor ID to display name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorMap {
    names: BTreeMap<i64, String>,
}

/// A mapping ready for use, plus the warning to surface if the configured
/// text had to be replaced by the default.
#[derive(Debug, Clone)]
pub struct ResolvedVendors {
    pub map: VendorMap,
    pub warning: Option<String>,
}

impl VendorMap {
    pub fn default_mapping() -> Self {
        let mut names = BTreeMap::new();
        names.insert(DEFAULT_VENDOR_ID, DEFAULT_VENDOR_NAME.to_string());
        Self { names }
    }

    /// Strict parse of a JSON object such as `{"254499": "Vendlite"}`.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RemitError::MappingParse(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| RemitError::MappingParse("expected a JSON object".to_string()))?;
        let mut names = BTreeMap::new();
        for (key, name) in obj {
            let id: i64 = key.trim().parse().map_err(|_| {
                RemitError::MappingParse(format!("vendor ID {key:?} is not an integer"))
            })?;
            let name = name.as_str().ok_or_else(|| {
                RemitError::MappingParse(format!("name for vendor {id} must be a string"))
            })?;
            names.insert(id, name.to_string());
        }
        Ok(Self { names })
    }

    /// `None` selects the default mapping and blank text an empty one. Text
    /// that fails to parse degrades to the default with a warning.
    pub fn resolve(text: Option<&str>) -> ResolvedVendors {
        let Some(text) = text else {
            return ResolvedVendors {
                map: Self::default_mapping(),
                warning: None,
            };
        };
        if text.trim().is_empty() {
            return ResolvedVendors {
                map: Self::default(),
                warning: None,
            };
        }
        match Self::parse(text) {
            Ok(map) => ResolvedVendors { map, warning: None },
            Err(e) => Self::fallback(e),
        }
    }

    /// Same as `resolve` for a mapping already held as JSON (from settings).
    pub fn resolve_value(value: &Value) -> ResolvedVendors {
        match Self::from_value(value) {
            Ok(map) => ResolvedVendors { map, warning: None },
            Err(e) => Self::fallback(e),
        }
    }

    fn fallback(err: RemitError) -> ResolvedVendors {
        let warning =
            format!("{err}. Using default mapping ({DEFAULT_VENDOR_ID}: {DEFAULT_VENDOR_NAME}).");
        tracing::debug!(error = %err, "vendor mapping replaced by default");
        ResolvedVendors {
            map: Self::default_mapping(),
            warning: Some(warning),
        }
    }

    pub fn name_for(&self, vendor_id: Option<i64>) -> String {
        match vendor_id {
            Some(id) => self
                .names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            None => UNKNOWN_VENDOR.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        let obj = self
            .names
            .iter()
            .map(|(id, name)| (id.to_string(), Value::String(name.clone())))
            .collect();
        Value::Object(obj)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&i64, &String)> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
