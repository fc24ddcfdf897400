use crate::hash::fingerprint;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const OVERVIEW_KEY: &str = "overview";
pub const BUILDING_COMPARISON_KEY: &str = "buildingComparison";
pub const CATEGORY_COST_BREAKDOWN_KEY: &str = "categoryCostBreakdown";
pub const CAPITAL_FORECAST_KEY: &str = "capitalForecast";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSnapshot {
    #[serde(with = "iso_millis")]
    timestamp: DateTime<Utc>,
    data_hash: String,
    portfolio_metrics: Map<String, Value>,
    building_data: Vec<Value>,
    uniformat_data: Vec<Value>,
    capital_forecast_data: Vec<Value>,
}

impl DataSnapshot {
    pub fn build(dashboard: &Value) -> Self {
        Self::build_at(dashboard, Utc::now())
    }

    /// The fingerprint covers the whole dashboard payload, including keys the
    /// snapshot does not keep, so `has_changed` must be given the same full
    /// payload shape.
    pub fn build_at(dashboard: &Value, captured_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: captured_at.trunc_subsecs(3),
            data_hash: fingerprint(dashboard),
            portfolio_metrics: object_field(dashboard, OVERVIEW_KEY),
            building_data: array_field(dashboard, BUILDING_COMPARISON_KEY),
            uniformat_data: array_field(dashboard, CATEGORY_COST_BREAKDOWN_KEY),
            capital_forecast_data: array_field(dashboard, CAPITAL_FORECAST_KEY),
        }
    }

    pub fn has_changed(&self, current: &Value) -> bool {
        fingerprint(current) != self.data_hash
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data_hash(&self) -> &str {
        &self.data_hash
    }

    pub fn portfolio_metrics(&self) -> &Map<String, Value> {
        &self.portfolio_metrics
    }

    pub fn building_data(&self) -> &[Value] {
        &self.building_data
    }

    pub fn uniformat_data(&self) -> &[Value] {
        &self.uniformat_data
    }

    pub fn capital_forecast_data(&self) -> &[Value] {
        &self.capital_forecast_data
    }
}

fn object_field(dashboard: &Value, key: &str) -> Map<String, Value> {
    match dashboard.get(key) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

fn array_field(dashboard: &Value, key: &str) -> Vec<Value> {
    match dashboard.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", text, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn sample_dashboard() -> Value {
        json!({
            "overview": {"portfolioFCI": 12.5},
            "buildingComparison": [{"id": 1}],
            "categoryCostBreakdown": [],
            "capitalForecast": [],
        })
    }

    #[test]
    fn test_build_extracts_dashboard_sections() {
        let snapshot = DataSnapshot::build(&sample_dashboard());

        assert_eq!(snapshot.portfolio_metrics()["portfolioFCI"], json!(12.5));
        assert_eq!(snapshot.building_data().len(), 1);
        assert!(snapshot.uniformat_data().is_empty());
        assert!(snapshot.capital_forecast_data().is_empty());
        assert!(!snapshot.data_hash().is_empty());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot = DataSnapshot::build(&json!({"overview": null, "capitalForecast": "n/a"}));

        assert!(snapshot.portfolio_metrics().is_empty());
        assert!(snapshot.building_data().is_empty());
        assert!(snapshot.uniformat_data().is_empty());
        assert!(snapshot.capital_forecast_data().is_empty());

        let empty = DataSnapshot::build(&Value::Null);
        assert!(empty.portfolio_metrics().is_empty());
        assert_eq!(empty.data_hash(), fingerprint(&Value::Null));
    }

    #[test]
    fn test_hash_covers_entire_payload() {
        let mut dashboard = sample_dashboard();
        let narrow = DataSnapshot::build(&dashboard);

        dashboard["lastSyncedBy"] = json!("assessor-7");
        let wide = DataSnapshot::build(&dashboard);

        assert_eq!(narrow.portfolio_metrics(), wide.portfolio_metrics());
        assert_eq!(narrow.building_data(), wide.building_data());
        assert_ne!(narrow.data_hash(), wide.data_hash());
        assert_eq!(wide.data_hash(), fingerprint(&dashboard));
    }

    #[test]
    fn test_has_changed() {
        let original = sample_dashboard();
        let snapshot = DataSnapshot::build(&original);

        assert!(!snapshot.has_changed(&original));
        assert!(!snapshot.has_changed(&sample_dashboard()));

        let mut updated = sample_dashboard();
        updated["capitalForecast"] = json!([{"year": 2026, "cost": 150000}]);
        assert!(snapshot.has_changed(&updated));

        let mut renumbered = sample_dashboard();
        renumbered["buildingComparison"][0]["id"] = json!(2);
        assert!(snapshot.has_changed(&renumbered));
    }

    #[test]
    fn test_timestamp_is_capture_moment() {
        let captured_at = Utc
            .from_utc_datetime(
                &NaiveDate::from_ymd_opt(2025, 3, 4)
                    .unwrap()
                    .and_hms_nano_opt(14, 7, 9, 123_456_789)
                    .unwrap(),
            );
        let snapshot = DataSnapshot::build_at(&sample_dashboard(), captured_at);

        assert_eq!(snapshot.timestamp(), captured_at.trunc_subsecs(3));
        assert_eq!(snapshot.timestamp().timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_json_shape() {
        let captured_at = Utc.with_ymd_and_hms(2025, 3, 4, 14, 7, 0).unwrap();
        let snapshot = DataSnapshot::build_at(&sample_dashboard(), captured_at);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["timestamp"], json!("2025-03-04T14:07:00.000Z"));
        assert_eq!(value["dataHash"], json!(snapshot.data_hash()));
        assert_eq!(value["portfolioMetrics"], json!({"portfolioFCI": 12.5}));
        assert_eq!(value["buildingData"], json!([{"id": 1}]));
        assert_eq!(value["uniformatData"], json!([]));
        assert_eq!(value["capitalForecastData"], json!([]));

        let decoded: DataSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_timestamp_accepts_offsets() {
        let text = r#"{
            "timestamp": "2025-03-04T09:07:00.250-05:00",
            "dataHash": "abc",
            "portfolioMetrics": {},
            "buildingData": [],
            "uniformatData": [],
            "capitalForecastData": []
        }"#;

        let snapshot: DataSnapshot = serde_json::from_str(text).unwrap();
        assert_eq!(
            snapshot.timestamp(),
            Utc.with_ymd_and_hms(2025, 3, 4, 14, 7, 0).unwrap() + chrono::Duration::milliseconds(250)
        );
    }
}
