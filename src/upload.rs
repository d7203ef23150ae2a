//! Uploaded data: file-name checks and conversion of a generated feature
//! collection into risk records.
//!
//! Shapefile parsing itself happens in the remote generate service; this
//! side only accepts a `.zip` and reads back the JSON it produces.

use crate::error::{Result, RiskError};
use crate::indicators::all_keys;
use crate::types::{AuxValue, RiskRecord};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

const FAKE_PATH_PREFIX: &str = "c:\\fakepath\\";

/// Validate an uploaded file name and derive the layer name from it.
pub fn layer_name_for_upload(file_name: &str) -> Result<String> {
    let lower = file_name.to_lowercase();
    if !lower.contains(".zip") {
        return Err(RiskError::UnsupportedUpload(file_name.to_string()));
    }
    let stem = lower.split('.').next().unwrap_or_default();
    let name = stem.replace(FAKE_PATH_PREFIX, "");
    Ok(name)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    feature_collection: FeatureCollection,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    layers: Vec<CollectionLayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionLayer {
    layer_definition: LayerDefinition,
    feature_set: FeatureSetJson,
}

#[derive(Debug, Deserialize)]
struct LayerDefinition {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FeatureSetJson {
    #[serde(default)]
    features: Vec<FeatureJson>,
}

#[derive(Debug, Deserialize)]
struct FeatureJson {
    #[serde(default)]
    attributes: Map<String, Value>,
}

/// One layer read back from the generate service.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedLayer {
    pub name: String,
    pub records: Vec<RiskRecord>,
    pub skipped: usize,
    pub duplicate_ids: usize,
}

/// Parse the generate service response. Features without an id or with
/// indicator values outside [0, 1] are skipped and counted. Within a layer
/// the first feature for an id is kept and later ones are counted as
/// duplicates.
pub fn parse_feature_collection(json: &str) -> Result<Vec<UploadedLayer>> {
    let response: GenerateResponse = serde_json::from_str(json)?;
    if response.feature_collection.layers.is_empty() {
        return Err(RiskError::MalformedUpload(
            "feature collection has no layers".to_string(),
        ));
    }
    let layers = response
        .feature_collection
        .layers
        .into_iter()
        .map(|layer| {
            let mut records = Vec::new();
            let mut skipped = 0usize;
            let mut duplicate_ids = 0usize;
            let mut seen: HashSet<String> = HashSet::new();
            for feature in &layer.feature_set.features {
                let Some(r) = record_from_attributes(&feature.attributes) else {
                    skipped += 1;
                    continue;
                };
                if !seen.insert(r.region_id.clone()) {
                    warn!(
                        layer = %layer.layer_definition.name,
                        region_id = %r.region_id,
                        "duplicate region id skipped"
                    );
                    duplicate_ids += 1;
                    continue;
                }
                records.push(r);
            }
            if skipped > 0 {
                warn!(layer = %layer.layer_definition.name, skipped, "uploaded features skipped");
            }
            info!(layer = %layer.layer_definition.name, features = records.len(), "loaded");
            UploadedLayer {
                name: layer.layer_definition.name,
                records,
                skipped,
                duplicate_ids,
            }
        })
        .collect();
    Ok(layers)
}

fn number(attrs: &Map<String, Value>, key: &str) -> Option<f64> {
    match attrs.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => crate::util::parse_f64_safe(Some(s.as_str())),
        _ => None,
    }
}

fn text(attrs: &Map<String, Value>, key: &str) -> String {
    match attrs.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn count(attrs: &Map<String, Value>, key: &str) -> u64 {
    number(attrs, key)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u64)
        .unwrap_or(0)
}

fn record_from_attributes(attrs: &Map<String, Value>) -> Option<RiskRecord> {
    let region_id = text(attrs, "ID_2");
    if region_id.is_empty() {
        return None;
    }
    let auxiliary: BTreeMap<String, AuxValue> = all_keys()
        .map(|key| (key.to_string(), AuxValue::from_option(number(attrs, key))))
        .collect();
    let record = RiskRecord {
        region_name: text(attrs, "NAME_2"),
        parent_name: text(attrs, "NAME_1"),
        hazard: number(attrs, "Hazard")?,
        vulnerability: number(attrs, "Vulnerabil")?,
        exposure: number(attrs, "Exposure")?,
        risk: number(attrs, "Risk")?,
        population: count(attrs, "Population"),
        male: count(attrs, "Male"),
        female: count(attrs, "Female"),
        households: count(attrs, "Households"),
        auxiliary,
        region_id,
    };
    record.validate().ok()?;
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_zip_files_are_accepted() {
        assert_eq!(
            layer_name_for_upload("C:\\fakepath\\Districts.zip").unwrap(),
            "districts"
        );
        assert_eq!(layer_name_for_upload("roads.ZIP").unwrap(), "roads");
        assert!(matches!(
            layer_name_for_upload("roads.geojson"),
            Err(RiskError::UnsupportedUpload(_))
        ));
    }

    #[test]
    fn parses_generated_collection() {
        let json = r#"{
          "featureCollection": {
            "layers": [{
              "layerDefinition": { "name": "districts", "fields": [] },
              "featureSet": { "features": [
                { "attributes": { "ID_2": 7, "NAME_2": "Herat", "NAME_1": "West",
                                  "Hazard": 0.4, "Vulnerabil": 0.3, "Exposure": 0.2, "Risk": 0.35,
                                  "Population": 52000, "Households": 8000, "Hz1": 0.7 } },
                { "attributes": { "ID_2": "8", "Hazard": 2.0, "Vulnerabil": 0.3, "Exposure": 0.2, "Risk": 0.35 } },
                { "attributes": { "NAME_2": "No id" } }
              ] }
            }]
          }
        }"#;
        let layers = parse_feature_collection(json).unwrap();
        assert_eq!(layers.len(), 1);
        let layer = &layers[0];
        assert_eq!(layer.name, "districts");
        assert_eq!(layer.records.len(), 1);
        assert_eq!(layer.skipped, 2);
        assert_eq!(layer.duplicate_ids, 0);
        let r = &layer.records[0];
        assert_eq!(r.region_id, "7");
        assert_eq!(r.population, 52_000);
        assert_eq!(r.aux("Hz1"), AuxValue::Value(0.7));
        assert_eq!(r.aux("Hz2"), AuxValue::NoData);
    }

    #[test]
    fn repeated_ids_keep_the_first_feature() {
        let json = r#"{
          "featureCollection": {
            "layers": [{
              "layerDefinition": { "name": "districts" },
              "featureSet": { "features": [
                { "attributes": { "ID_2": "7", "NAME_2": "Herat", "Hazard": 0.4, "Vulnerabil": 0.3, "Exposure": 0.2, "Risk": 0.35 } },
                { "attributes": { "ID_2": 7, "NAME_2": "Herat copy", "Hazard": 0.9, "Vulnerabil": 0.9, "Exposure": 0.9, "Risk": 0.9 } },
                { "attributes": { "ID_2": "9", "NAME_2": "Kabul", "Hazard": 0.1, "Vulnerabil": 0.1, "Exposure": 0.1, "Risk": 0.1 } }
              ] }
            }]
          }
        }"#;
        let layers = parse_feature_collection(json).unwrap();
        let layer = &layers[0];
        assert_eq!(layer.records.len(), 2);
        assert_eq!(layer.duplicate_ids, 1);
        assert_eq!(layer.skipped, 0);
        assert_eq!(layer.records[0].region_name, "Herat");
        assert_eq!(layer.records[1].region_id, "9");
    }

    #[test]
    fn empty_collection_is_malformed() {
        let json = r#"{ "featureCollection": { "layers": [] } }"#;
        assert!(matches!(
            parse_feature_collection(json),
            Err(RiskError::MalformedUpload(_))
        ));
        assert!(matches!(
            parse_feature_collection("not json"),
            Err(RiskError::Json(_))
        ));
    }
}
