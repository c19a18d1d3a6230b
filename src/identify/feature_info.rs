use serde::Deserialize;
use serde_json::{Map, Value};

/// Properties shown before the "show more attributes" button.
pub const MAX_INITIAL_PROPERTIES: usize = 15;
/// Above this many properties the popup switches to two per row.
pub const COMPACT_THRESHOLD: usize = 10;
/// String values longer than this are truncated.
pub const MAX_VALUE_CHARS: usize = 50;

/// GeoJSON answer of a GetFeatureInfo request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<Value>,
    /// Attribute table in server order.
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Full(String),
    /// Long string shown as `preview...` with an inline expander.
    Truncated { preview: String, full: String },
}

impl DisplayValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) if s.chars().count() > MAX_VALUE_CHARS => DisplayValue::Truncated {
                preview: s.chars().take(MAX_VALUE_CHARS).collect(),
                full: s.clone(),
            },
            Value::String(s) => DisplayValue::Full(s.clone()),
            other => DisplayValue::Full(other.to_string()),
        }
    }

    pub fn full(&self) -> &str {
        match self {
            DisplayValue::Full(value) => value,
            DisplayValue::Truncated { full, .. } => full,
        }
    }
}

/// One attribute row of the popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub name: String,
    pub value: DisplayValue,
}

fn is_shown(name: &str, value: &Value) -> bool {
    name != "bbox" && !value.is_null() && value.as_str() != Some("")
}

/// Everything the popup renders for one identify answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupModel {
    pub title: String,
    pub compact: bool,
    pub initial: Vec<PropertyEntry>,
    pub remainder: Vec<PropertyEntry>,
}

impl PopupModel {
    /// Layout the first feature of `collection`. `None` when there is no feature.
    pub fn from_collection(title: &str, collection: &FeatureCollection) -> Option<Self> {
        let feature = collection.features.first()?;
        let mut entries: Vec<PropertyEntry> = feature
            .properties
            .iter()
            .flatten()
            .filter(|(name, value)| is_shown(name, value))
            .map(|(name, value)| PropertyEntry {
                name: name.clone(),
                value: DisplayValue::from_json(value),
            })
            .collect();

        let compact = entries.len() > COMPACT_THRESHOLD;
        let remainder = if entries.len() > MAX_INITIAL_PROPERTIES {
            entries.split_off(MAX_INITIAL_PROPERTIES)
        } else {
            Vec::new()
        };

        Some(Self {
            title: title.to_string(),
            compact,
            initial: entries,
            remainder,
        })
    }

    /// Group entries into table rows: two per row when compact, else one.
    pub fn rows<'a>(&self, entries: &'a [PropertyEntry]) -> Vec<&'a [PropertyEntry]> {
        let per_row = if self.compact { 2 } else { 1 };
        entries.chunks(per_row).collect()
    }

    pub fn has_more(&self) -> bool {
        !self.remainder.is_empty()
    }

    pub fn show_more_label(&self) -> String {
        format!("Show {} more attributes", self.remainder.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(properties: Value) -> FeatureCollection {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "id": "mines.1", "properties": properties }]
        }))
        .unwrap()
    }

    fn numbered(n: usize) -> Value {
        let mut map = Map::new();
        for i in 0..n {
            map.insert(format!("attr_{i:02}"), json!(i));
        }
        Value::Object(map)
    }

    #[test]
    fn test_empty_collection_has_no_popup() {
        let empty: FeatureCollection =
            serde_json::from_str(r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        assert!(PopupModel::from_collection("Mines", &empty).is_none());
    }

    #[test]
    fn test_filters_bbox_null_and_empty() {
        let model = PopupModel::from_collection(
            "Mines",
            &collection(json!({
                "name": "Korkino",
                "bbox": [1, 2, 3, 4],
                "owner": null,
                "note": "",
                "depth": 480,
                "active": false
            })),
        )
        .unwrap();

        let names: Vec<_> = model.initial.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["name", "depth", "active"]);
        assert_eq!(model.initial[1].value, DisplayValue::Full("480".to_string()));
        assert_eq!(model.initial[2].value, DisplayValue::Full("false".to_string()));
        assert!(!model.compact);
        assert!(!model.has_more());
    }

    #[test]
    fn test_compact_layout_above_ten() {
        let model = PopupModel::from_collection("Kilns", &collection(numbered(10))).unwrap();
        assert!(!model.compact);
        assert_eq!(model.rows(&model.initial).len(), 10);

        let model = PopupModel::from_collection("Kilns", &collection(numbered(11))).unwrap();
        assert!(model.compact);
        let rows = model.rows(&model.initial);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5].len(), 1);
    }

    #[test]
    fn test_more_than_fifteen_splits_remainder() {
        let model = PopupModel::from_collection("Railway", &collection(numbered(20))).unwrap();
        assert_eq!(model.initial.len(), 15);
        assert_eq!(model.remainder.len(), 5);
        assert_eq!(model.remainder[0].name, "attr_15");
        assert_eq!(model.show_more_label(), "Show 5 more attributes");

        let model = PopupModel::from_collection("Railway", &collection(numbered(15))).unwrap();
        assert_eq!(model.initial.len(), 15);
        assert!(!model.has_more());
    }

    #[test]
    fn test_long_strings_are_truncated() {
        let long = "x".repeat(51);
        let exact = "y".repeat(50);
        let model = PopupModel::from_collection(
            "Quarries",
            &collection(json!({ "long": long, "exact": exact })),
        )
        .unwrap();

        match &model.initial[0].value {
            DisplayValue::Truncated { preview, full } => {
                assert_eq!(preview.len(), 50);
                assert_eq!(full, &long);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
        assert_eq!(model.initial[1].value, DisplayValue::Full(exact));
    }

    #[test]
    fn test_only_first_feature_is_used() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "features": [
                { "properties": { "name": "first" } },
                { "properties": { "name": "second" } }
            ]
        }))
        .unwrap();
        let model = PopupModel::from_collection("Chimneys", &collection).unwrap();
        assert_eq!(model.initial.len(), 1);
        assert_eq!(model.initial[0].value.full(), "first");
    }
}
