use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

const STOCK_FREQUENCIES: &[&str] = &["daily", "weekly", "monthly", "annually"];
const CRYPTO_FREQUENCIES: &[&str] = &["1min", "5min", "15min", "1hour", "4hour", "1day"];

/// Parameters of an ad-hoc market-data fetch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchParams {
    pub data_type: String,
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub frequency: String,
}

/// Input validation and sanitization
pub struct ValidationService;

impl ValidationService {
    /// Sanitize and validate project name
    pub fn validate_project_name(name: &str) -> CoreResult<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(CoreError::validation("Project name cannot be empty"));
        }

        if trimmed.len() > 100 {
            return Err(CoreError::validation(
                "Project name is too long (max 100 characters)",
            ));
        }

        let sanitized = trimmed
            .chars()
            .filter(|c| c.is_alphanumeric() || " -_().".contains(*c))
            .collect::<String>();

        if sanitized.trim().is_empty() {
            return Err(CoreError::validation(
                "Project name contains only invalid characters",
            ));
        }

        Ok(sanitized)
    }

    /// Validate the file name of an upload intent. The name becomes the
    /// suffix of the storage key, so path separators are rejected outright.
    pub fn validate_file_name(file_name: &str) -> CoreResult<String> {
        let trimmed = file_name.trim();

        if trimmed.is_empty() {
            return Err(CoreError::validation("File name cannot be empty"));
        }

        if trimmed.len() > 255 {
            return Err(CoreError::validation(
                "File name is too long (max 255 characters)",
            ));
        }

        if trimmed.contains('/') || trimmed.contains('\\') || trimmed.contains("..") {
            return Err(CoreError::validation(
                "File name may not contain path separators",
            ));
        }

        Ok(trimmed.to_string())
    }

    /// Validate fetch parameters: symbol format per data type, ISO dates with
    /// start ≤ end and end not in the future, and a frequency allowed for
    /// the data type. Returns the cleaned parameters (symbol lowercased).
    pub fn validate_fetch_params(params: &FetchParams) -> CoreResult<FetchParams> {
        let symbol = params.symbol.trim().to_lowercase();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(CoreError::validation(format!(
                "Invalid symbol format: {}. Use only letters, numbers, and underscores",
                params.symbol
            )));
        }

        let allowed_frequencies: &[&str] = match params.data_type.as_str() {
            "stock" => {
                if symbol.len() > 10 {
                    return Err(CoreError::validation(format!(
                        "Stock symbol too long: {}. Maximum 10 characters allowed",
                        symbol
                    )));
                }
                STOCK_FREQUENCIES
            }
            "crypto" => {
                if symbol.len() < 6 || symbol.len() > 10 {
                    return Err(CoreError::validation(format!(
                        "Crypto symbol format invalid: {}. Should be 6-10 characters (e.g. btcusd)",
                        symbol
                    )));
                }
                CRYPTO_FREQUENCIES
            }
            other => {
                return Err(CoreError::validation(format!(
                    "Unsupported data type: {}",
                    other
                )))
            }
        };

        if !allowed_frequencies.contains(&params.frequency.as_str()) {
            return Err(CoreError::validation(format!(
                "Frequency {} is not supported for {} data",
                params.frequency, params.data_type
            )));
        }

        let start = parse_iso_date("start_date", &params.start_date)?;
        let end = parse_iso_date("end_date", &params.end_date)?;
        if start > end {
            return Err(CoreError::validation(
                "start_date must not be after end_date",
            ));
        }
        if end > Utc::now().date_naive() {
            return Err(CoreError::validation("end_date must not be in the future"));
        }

        Ok(FetchParams {
            data_type: params.data_type.clone(),
            symbol,
            start_date: params.start_date.clone(),
            end_date: params.end_date.clone(),
            frequency: params.frequency.clone(),
        })
    }
}

fn parse_iso_date(field: &str, value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CoreError::validation(format!("{} must be a YYYY-MM-DD date", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_params() -> FetchParams {
        FetchParams {
            data_type: "stock".to_string(),
            symbol: "AAPL".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-06-30".to_string(),
            frequency: "daily".to_string(),
        }
    }

    #[test]
    fn test_project_name_rules() {
        assert_eq!(
            ValidationService::validate_project_name("  Alpha ").expect("valid name"),
            "Alpha"
        );
        assert!(ValidationService::validate_project_name("").is_err());
        assert!(ValidationService::validate_project_name("   ").is_err());
        assert!(ValidationService::validate_project_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_file_name_rejects_path_separators() {
        assert!(ValidationService::validate_file_name("data.csv").is_ok());
        assert!(ValidationService::validate_file_name("../etc/passwd").is_err());
        assert!(ValidationService::validate_file_name("a/b.csv").is_err());
        assert!(ValidationService::validate_file_name("").is_err());
    }

    #[test]
    fn test_fetch_params_happy_path_lowercases_symbol() {
        let cleaned =
            ValidationService::validate_fetch_params(&stock_params()).expect("valid params");
        assert_eq!(cleaned.symbol, "aapl");
    }

    #[test]
    fn test_fetch_params_symbol_rules() {
        let mut params = stock_params();
        params.symbol = "AAPL-USD".to_string();
        assert!(ValidationService::validate_fetch_params(&params).is_err());

        let mut params = stock_params();
        params.data_type = "crypto".to_string();
        params.symbol = "btc".to_string();
        params.frequency = "1day".to_string();
        assert!(ValidationService::validate_fetch_params(&params).is_err());
    }

    #[test]
    fn test_fetch_params_frequency_depends_on_data_type() {
        let mut params = stock_params();
        params.frequency = "1min".to_string();
        assert!(ValidationService::validate_fetch_params(&params).is_err());

        let mut params = stock_params();
        params.data_type = "crypto".to_string();
        params.symbol = "btcusd".to_string();
        params.frequency = "1hour".to_string();
        assert!(ValidationService::validate_fetch_params(&params).is_ok());
    }

    #[test]
    fn test_fetch_params_date_rules() {
        let mut params = stock_params();
        params.start_date = "2024-06-30".to_string();
        params.end_date = "2024-01-01".to_string();
        assert!(ValidationService::validate_fetch_params(&params).is_err());

        let mut params = stock_params();
        params.end_date = "2099-01-01".to_string();
        assert!(ValidationService::validate_fetch_params(&params).is_err());

        let mut params = stock_params();
        params.start_date = "01/01/2024".to_string();
        assert!(ValidationService::validate_fetch_params(&params).is_err());
    }
}
