//! Wire bundle of converted resources.
//!
//! A [`Bundle`] is the serialisable form of one conversion's output: a FHIR `collection`
//! bundle whose entries carry `fullUrl = Kind/token`.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::resource::Resource;
use crate::{FhirError, FhirResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Collection,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: Resource,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    resource_type: &'static str,
    #[serde(rename = "type")]
    bundle_type: BundleType,
    total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entry: Vec<BundleEntry>,
}

impl Bundle {
    pub fn collection(resources: Vec<Resource>) -> Self {
        let entry: Vec<BundleEntry> = resources
            .into_iter()
            .map(|resource| BundleEntry {
                full_url: resource.id().to_string(),
                resource,
            })
            .collect();
        Self {
            resource_type: "Bundle",
            bundle_type: BundleType::Collection,
            total: entry.len(),
            entry,
        }
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entry
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().map(|entry| &entry.resource)
    }

    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    /// Render the bundle as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidJson`] if serialisation fails.
    pub fn render_json(&self, pretty: bool) -> FhirResult<String> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    /// Render the bundle as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidYaml`] if serialisation fails.
    pub fn render_yaml(&self) -> FhirResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Every literal reference whose target has no entry in this bundle.
    ///
    /// References are collected from the rendered resources, so nested elements (participants,
    /// reactions, sections, ...) are covered without per-type traversal.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if a resource cannot be rendered.
    pub fn dangling_references(&self) -> FhirResult<Vec<String>> {
        let known: BTreeSet<&str> = self.entry.iter().map(|e| e.full_url.as_str()).collect();
        let mut dangling = BTreeSet::new();

        for entry in &self.entry {
            let value = serde_json::to_value(&entry.resource).map_err(|e| {
                FhirError::Translation(format!("failed to render {}: {e}", entry.full_url))
            })?;
            let mut references = Vec::new();
            collect_references(&value, &mut references);
            for reference in references {
                if !known.contains(reference.as_str()) {
                    dangling.insert(reference);
                }
            }
        }

        Ok(dangling.into_iter().collect())
    }
}

fn collect_references(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("reference", serde_json::Value::String(target)) => out.push(target.clone()),
                    _ => collect_references(child, out),
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}
