use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Signal;
use crate::utils::format_number;

/// Placeholder shown for a metric the snapshot did not provide.
pub const MISSING_VALUE: &str = "—";

/// Score used when the snapshot carries no risk state at all.
const DEFAULT_SCORE: f64 = 50.0;

/// The full dashboard snapshot.
///
/// The four top-level sections are optional on the wire. A missing or
/// `null` section is replaced with a neutral default so a
/// partially-populated document still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default = "default_last_updated", deserialize_with = "deserialize_last_updated")]
    pub last_updated_utc: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_state: RiskState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<Region>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub geo: Geo,
}

fn default_last_updated() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Helper to treat an explicit null like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_last_updated<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_last_updated))
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_SCORE))
}

impl Dashboard {
    /// Parse a snapshot body, filling defaults for missing sections.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Region ids that appear more than once, in first-seen order.
    pub fn duplicate_region_ids(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut dupes: Vec<&str> = Vec::new();
        for region in &self.regions {
            let id = region.id.as_str();
            if seen.contains(&id) {
                if !dupes.contains(&id) {
                    dupes.push(id);
                }
            } else {
                seen.push(id);
            }
        }
        dupes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskState {
    #[serde(default = "default_score", deserialize_with = "deserialize_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub drivers: Vec<Driver>,
}

fn default_score() -> f64 {
    DEFAULT_SCORE
}

impl Default for RiskState {
    fn default() -> Self {
        Self {
            score: DEFAULT_SCORE,
            label: "Neutral".to_string(),
            drivers: Vec::new(),
        }
    }
}

impl RiskState {
    /// The provided label, or one derived from the score when it is empty.
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            crate::view::risk_label(self.score).to_string()
        } else {
            self.label.clone()
        }
    }

    pub fn display_score(&self) -> String {
        format_number(self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub value: MetricValue,
    #[serde(default)]
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verdict: Verdict,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocks: Vec<Block>,
}

impl Region {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Free-text categorical labels for a region's macro regime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cycle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inflation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub financial: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Producer rows built from driver records carry `name` instead.
    #[serde(default, alias = "name", deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default)]
    pub value: MetricValue,
    #[serde(default)]
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub gpr: Metric,
    #[serde(default, deserialize_with = "null_as_default")]
    pub epu: Metric,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hotspots: Vec<Hotspot>,
}

/// A single indicator reading with its signal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default)]
    pub value: MetricValue,
    #[serde(default)]
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub signal: Signal,
}

/// Indicator value: the source emits either numbers or preformatted text.
/// `null` (series unavailable) reads as the missing-value placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Text(MISSING_VALUE.to_string())
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de;

        struct MetricValueVisitor;

        impl<'de> de::Visitor<'de> for MetricValueVisitor {
            type Value = MetricValue;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number, string or null")
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
                Ok(MetricValue::Number(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(MetricValue::Number(v as f64))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(MetricValue::Number(v as f64))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(MetricValue::Text(v.to_string()))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(MetricValue::default())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(MetricValue::default())
            }
        }

        deserializer.deserialize_any(MetricValueVisitor)
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Number(n) => f.write_str(&format_number(*n)),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_snapshot() {
        let json = r#"{
            "last_updated_utc": "2024-03-01T06:00:00Z",
            "risk_state": {
                "score": 58,
                "label": "Neutral",
                "drivers": [{"name": "VIX", "value": 17.2, "signal": "amber"}]
            },
            "regions": [{
                "id": "US",
                "name": "United States",
                "verdict": {"cycle": "Late", "inflation": "Sticky", "financial": "Tight"},
                "blocks": [{
                    "title": "Growth",
                    "items": [{"key": "ISM", "value": "49.1", "signal": "red"}]
                }]
            }],
            "geo": {
                "gpr": {"value": 112, "signal": "amber"},
                "epu": {"value": "n/a", "signal": "neutral"},
                "hotspots": [{"name": "Red Sea", "signal": "red"}]
            }
        }"#;

        let dashboard = Dashboard::from_slice(json.as_bytes())
            .expect("Failed to parse dashboard test JSON");
        assert_eq!(dashboard.last_updated_utc, "2024-03-01T06:00:00Z");
        assert_eq!(dashboard.risk_state.score, 58.0);
        assert_eq!(dashboard.risk_state.drivers[0].value.to_string(), "17.2");
        assert_eq!(dashboard.regions[0].verdict.inflation, "Sticky");
        assert_eq!(dashboard.regions[0].blocks[0].items[0].signal, Signal::Red);
        assert_eq!(dashboard.geo.gpr.value.to_string(), "112");
        assert_eq!(dashboard.geo.epu.value.to_string(), "n/a");
        assert_eq!(dashboard.geo.hotspots[0].name, "Red Sea");
    }

    #[test]
    fn test_missing_sections_get_defaults() {
        let dashboard = Dashboard::from_slice(b"{}").expect("Failed to parse empty document");

        assert!(!dashboard.last_updated_utc.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&dashboard.last_updated_utc).is_ok());
        assert_eq!(dashboard.risk_state.score, 50.0);
        assert_eq!(dashboard.risk_state.label, "Neutral");
        assert!(dashboard.risk_state.drivers.is_empty());
        assert!(dashboard.regions.is_empty());
        assert_eq!(dashboard.geo.gpr.value.to_string(), "—");
        assert_eq!(dashboard.geo.gpr.signal, Signal::Neutral);
        assert_eq!(dashboard.geo.epu.value.to_string(), "—");
        assert!(dashboard.geo.hotspots.is_empty());
    }

    #[test]
    fn test_partial_nested_sections() {
        let json = r#"{"risk_state": {"score": 80}, "regions": [{"id": "EU"}], "geo": {"hotspots": []}}"#;
        let dashboard = Dashboard::from_slice(json.as_bytes()).expect("Failed to parse partial JSON");

        assert_eq!(dashboard.risk_state.label, "");
        assert_eq!(dashboard.risk_state.display_label(), "Risk-off");
        assert_eq!(dashboard.regions[0].display_name(), "EU");
        assert!(dashboard.regions[0].blocks.is_empty());
        assert_eq!(dashboard.geo.gpr, Metric::default());
    }

    #[test]
    fn test_display_label_keeps_provided_label() {
        let state = RiskState {
            score: 90.0,
            label: "Calm".to_string(),
            drivers: vec![],
        };
        assert_eq!(state.display_label(), "Calm");
    }

    #[test]
    fn test_duplicate_region_ids() {
        let json = r#"{"regions": [{"id": "US"}, {"id": "EU"}, {"id": "US"}, {"id": "US"}]}"#;
        let dashboard = Dashboard::from_slice(json.as_bytes()).expect("Failed to parse regions");
        assert_eq!(dashboard.duplicate_region_ids(), vec!["US"]);
        assert_eq!(dashboard.region("EU").map(|r| r.id.as_str()), Some("EU"));
        assert!(dashboard.region("JP").is_none());
    }

    #[test]
    fn test_null_sections_get_defaults() {
        let json = r#"{"geo": null, "risk_state": null, "regions": null, "last_updated_utc": null}"#;
        let dashboard = Dashboard::from_slice(json.as_bytes()).expect("Failed to parse null sections");

        assert!(chrono::DateTime::parse_from_rfc3339(&dashboard.last_updated_utc).is_ok());
        assert_eq!(dashboard.risk_state, RiskState::default());
        assert!(dashboard.regions.is_empty());
        assert_eq!(dashboard.geo, Geo::default());
    }

    #[test]
    fn test_null_nested_fields_get_defaults() {
        let json = r#"{
            "risk_state": {"score": null, "label": null, "drivers": [{"name": "VIX", "value": null, "signal": null}]},
            "regions": [{"id": "US", "name": null, "verdict": null, "blocks": [{"title": null, "items": null}]}],
            "geo": {"gpr": null, "epu": {"value": null}, "hotspots": null}
        }"#;
        let dashboard = Dashboard::from_slice(json.as_bytes()).expect("Failed to parse null fields");

        assert_eq!(dashboard.risk_state.score, 50.0);
        assert_eq!(dashboard.risk_state.drivers[0].value.to_string(), "—");
        assert_eq!(dashboard.risk_state.drivers[0].signal, Signal::Neutral);
        assert_eq!(dashboard.regions[0].display_name(), "US");
        assert!(dashboard.regions[0].blocks[0].items.is_empty());
        assert_eq!(dashboard.geo.gpr, Metric::default());
        assert_eq!(dashboard.geo.epu.value.to_string(), "—");
        assert!(dashboard.geo.hotspots.is_empty());
    }

    #[test]
    fn test_driver_shaped_items_and_nameless_rows() {
        let json = r#"{
            "risk_state": {"drivers": [{"value": 3.2, "signal": "green"}]},
            "regions": [{"id": "US", "blocks": [{"title": "Rates", "items": [
                {"name": "US10Y", "value": 4.1, "delta": 0.01, "signal": "amber"},
                {"value": "n/a"}
            ]}]}],
            "geo": {"hotspots": [{"signal": "red"}]}
        }"#;
        let dashboard = Dashboard::from_slice(json.as_bytes()).expect("Failed to parse producer rows");

        let items = &dashboard.regions[0].blocks[0].items;
        assert_eq!(items[0].key, "US10Y");
        assert_eq!(items[0].value.to_string(), "4.1");
        assert_eq!(items[0].signal, Signal::Amber);
        assert_eq!(items[1].key, "");
        assert_eq!(dashboard.risk_state.drivers[0].name, "");
        assert_eq!(dashboard.geo.hotspots[0].name, "");
    }

    #[test]
    fn test_unparsable_document() {
        assert!(Dashboard::from_slice(b"<html>not json</html>").is_err());
        assert!(Dashboard::from_slice(br#"{"regions": 5}"#).is_err());
    }
}
