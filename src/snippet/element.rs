//! Layout elements and their data bags

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value data carried by a layout element
///
/// Snippet fields are stored here under their field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementData(BTreeMap<String, String>);

impl ElementData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Load a flat TOML table of string values
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize as a flat TOML table
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ElementData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A layout element instance
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element type identifier, e.g. `Snippet`
    pub type_id: String,
    /// Toolbox category the element type belongs to
    pub category: String,
    pub data: ElementData,
}

impl Element {
    pub fn new(type_id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            category: category.into(),
            data: ElementData::new(),
        }
    }

    pub fn with_data(mut self, data: ElementData) -> Self {
        self.data = data;
        self
    }
}

/// Creates element instances by type id
pub trait ElementFactory {
    fn activate(&self, type_id: &str) -> Element;
}

/// Activates elements with a fixed category per type id
#[derive(Debug, Clone)]
pub struct DefaultElementFactory {
    categories: BTreeMap<String, String>,
    fallback_category: String,
}

impl DefaultElementFactory {
    pub fn new(fallback_category: impl Into<String>) -> Self {
        Self {
            categories: BTreeMap::new(),
            fallback_category: fallback_category.into(),
        }
    }

    /// Register the category for one element type
    pub fn with_category(mut self, type_id: impl Into<String>, category: impl Into<String>) -> Self {
        self.categories.insert(type_id.into(), category.into());
        self
    }
}

impl ElementFactory for DefaultElementFactory {
    fn activate(&self, type_id: &str) -> Element {
        let category = self
            .categories
            .get(type_id)
            .unwrap_or(&self.fallback_category);
        Element::new(type_id, category.clone())
    }
}
