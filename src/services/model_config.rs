//! Model configuration parsing.
//!
//! The configuration blob is owned by the training stack; this core only
//! guarantees a non-empty model name and a well-formed schema for the model
//! families it knows about. Unrecognized names fall back to an opaque
//! parameter map and pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CoreError, CoreResult};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LstmConfig {
    pub hidden_size: u32,
    pub num_layers: u32,
    pub dropout: f64,
    pub learning_rate: f64,
    pub batch_size: u32,
    pub epochs: u32,
    pub time_steps: u32,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            hidden_size: 64,
            num_layers: 2,
            dropout: 0.5,
            learning_rate: 0.0001,
            batch_size: 32,
            epochs: 100,
            time_steps: 60,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArimaConfig {
    pub p: u32,
    pub d: u32,
    pub q: u32,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self { p: 5, d: 1, q: 0 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProphetConfig {
    pub changepoint_prior_scale: f64,
    pub seasonality_mode: String,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
}

impl Default for ProphetConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: 0.05,
            seasonality_mode: "additive".to_string(),
            yearly_seasonality: true,
            weekly_seasonality: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegressionConfig {
    pub fit_intercept: bool,
    pub n_lags: u32,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            n_lags: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RandomForestConfig {
    pub n_estimators: u32,
    pub max_depth: Option<u32>,
    pub n_lags: u32,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            n_lags: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct XgboostConfig {
    pub num_boost_round: u32,
    pub early_stopping_rounds: u32,
    pub n_lags: u32,
}

impl Default for XgboostConfig {
    fn default() -> Self {
        Self {
            num_boost_round: 100,
            early_stopping_rounds: 10,
            n_lags: 5,
        }
    }
}

/// Model configuration keyed by model name, with typed schemas for the
/// model families the training stack ships.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelConfig {
    Lstm(LstmConfig),
    Arima(ArimaConfig),
    Prophet(ProphetConfig),
    Regression(RegressionConfig),
    RandomForest(RandomForestConfig),
    Xgboost(XgboostConfig),
    Opaque {
        model_name: String,
        params: serde_json::Map<String, Value>,
    },
}

impl ModelConfig {
    /// Parses and validates a raw configuration blob. Fails with
    /// `Validation` when the blob is not an object, the model name is
    /// missing or empty, or a known model's fields have the wrong shape.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::validation("Model config must be a JSON object"))?;

        let model_name = obj
            .get("model_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if model_name.is_empty() {
            return Err(CoreError::validation(
                "Model config must include a non-empty model_name",
            ));
        }

        let parsed = match model_name {
            "lstm" => serde_json::from_value(value.clone()).map(ModelConfig::Lstm),
            "arima" => serde_json::from_value(value.clone()).map(ModelConfig::Arima),
            "prophet" => serde_json::from_value(value.clone()).map(ModelConfig::Prophet),
            "regression" | "regression_time_series" => {
                serde_json::from_value(value.clone()).map(ModelConfig::Regression)
            }
            "random_forest" | "random_forest_time_series" => {
                serde_json::from_value(value.clone()).map(ModelConfig::RandomForest)
            }
            "xgboost" | "xgboost_time_series" => {
                serde_json::from_value(value.clone()).map(ModelConfig::Xgboost)
            }
            _ => {
                let mut params = obj.clone();
                params.remove("model_name");
                return Ok(ModelConfig::Opaque {
                    model_name: model_name.to_string(),
                    params,
                });
            }
        };

        parsed.map_err(|e| {
            CoreError::validation(format!("Invalid {} configuration: {}", model_name, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_model_gets_typed_schema() {
        let config = ModelConfig::from_value(&json!({
            "model_name": "lstm",
            "epochs": 50,
            "hidden_size": 128,
        }))
        .expect("valid config");

        match config {
            ModelConfig::Lstm(lstm) => {
                assert_eq!(lstm.epochs, 50);
                assert_eq!(lstm.hidden_size, 128);
                // Unspecified fields take the model family defaults
                assert_eq!(lstm.num_layers, 2);
            }
            other => panic!("expected lstm config, got {:?}", other),
        }
    }

    #[test]
    fn test_time_series_variants_share_schema() {
        let config = ModelConfig::from_value(&json!({
            "model_name": "xgboost_time_series",
            "n_lags": 12,
        }))
        .expect("valid config");
        assert!(matches!(config, ModelConfig::Xgboost(x) if x.n_lags == 12));
    }

    #[test]
    fn test_unknown_model_falls_back_to_opaque() {
        let config = ModelConfig::from_value(&json!({
            "model_name": "transformer",
            "heads": 8,
        }))
        .expect("valid config");

        match config {
            ModelConfig::Opaque { model_name, params } => {
                assert_eq!(model_name, "transformer");
                assert_eq!(params.get("heads"), Some(&json!(8)));
                assert!(!params.contains_key("model_name"));
            }
            other => panic!("expected opaque config, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_or_empty_model_name_is_rejected() {
        assert!(ModelConfig::from_value(&json!({ "epochs": 100 })).is_err());
        assert!(ModelConfig::from_value(&json!({ "model_name": "  " })).is_err());
        assert!(ModelConfig::from_value(&json!("lstm")).is_err());
    }

    #[test]
    fn test_malformed_known_schema_is_rejected() {
        let err = ModelConfig::from_value(&json!({
            "model_name": "lstm",
            "epochs": "lots",
        }))
        .expect_err("bad field type should fail");
        assert!(err.message().contains("lstm"));
    }
}
