//! Result records and short configuration identifiers

use super::kind::PredictorKind;
use crate::config::PredictorParams;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Fields never part of the short configuration string
const SHORT_CONFIG_EXCLUDED: [&str; 2] = ["scale_x", "name"];

/// One row of the global result collection.
///
/// Holds `predictor` (short name), `predictor_conf` (short configuration) and
/// every configuration field except `scale_x`. Keys iterate in sorted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(BTreeMap<String, Value>);

impl ResultRecord {
    pub(crate) fn new(kind: PredictorKind, params: &PredictorParams) -> Self {
        let mut fields = config_fields(params);
        fields.remove("scale_x");
        fields.insert("predictor".to_string(), json!(kind.short_name()));
        fields.insert("predictor_conf".to_string(), json!(short_config(kind, params)));
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Short name of the predictor type
    pub fn predictor(&self) -> Option<&str> {
        self.get("predictor").and_then(Value::as_str)
    }

    /// Short configuration identifier
    pub fn predictor_conf(&self) -> Option<&str> {
        self.get("predictor_conf").and_then(Value::as_str)
    }

    /// Add or replace a field, e.g. predictions gathered by the caller
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

/// Configuration fields by their full names
fn config_fields(params: &PredictorParams) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("degree".to_string(), json!(params.degree));
    fields.insert("epsilon".to_string(), json!(params.epsilon));
    fields.insert("max_tree_depth".to_string(), json!(params.max_tree_depth));
    fields.insert("alpha".to_string(), json!(params.alpha));
    fields.insert("scale_x".to_string(), json!(params.scale_x));
    if let Some(name) = &params.name {
        fields.insert("name".to_string(), json!(name));
    }
    fields
}

/// Abbreviate a snake_case key to the first letter of each word
pub fn abbreviate_key(key: &str) -> String {
    key.split('_').filter_map(|word| word.chars().next()).collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `{short_name}_{k1}{v1}_{k2}{v2}...` with abbreviated keys in sorted order,
/// e.g. `PRP_a0.1_d2_e0.1_mtd2`
pub fn short_config(kind: PredictorKind, params: &PredictorParams) -> String {
    let entries: BTreeMap<String, String> = config_fields(params)
        .into_iter()
        .filter(|(key, _)| !SHORT_CONFIG_EXCLUDED.contains(&key.as_str()))
        .map(|(key, value)| (abbreviate_key(&key), render_value(&value)))
        .collect();

    let encoded: Vec<String> = entries
        .into_iter()
        .map(|(key, value)| format!("{}{}", key, value))
        .collect();

    format!("{}_{}", kind.short_name(), encoded.join("_"))
}
