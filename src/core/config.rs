use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_LENGTH: &str = "LENGTH";
pub const ENV_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_GROUP_BY: &str = "GROUP_BY";
pub const ENV_COST_AGGREGATION: &str = "COST_AGGREGATION";
pub const ENV_EXCLUDE_RECORD_TYPES: &str = "EXCLUDE_RECORD_TYPES";
pub const ENV_COST_FLOOR: &str = "COST_FLOOR";
pub const ENV_COST_EXPLORER_REGION: &str = "COST_EXPLORER_REGION";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_LENGTH: usize = 15;
const DEFAULT_GROUP_BY: &str = "SERVICE";
const DEFAULT_REGION: &str = "us-east-1";

const KNOWN_DIMENSIONS: &[&str] = &[
    "AZ",
    "INSTANCE_TYPE",
    "LEGAL_ENTITY_NAME",
    "LINKED_ACCOUNT",
    "OPERATION",
    "PLATFORM",
    "PURCHASE_TYPE",
    "RECORD_TYPE",
    "REGION",
    "SERVICE",
    "TENANCY",
    "USAGE_TYPE",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidLength { key: &'static str, value: String },
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("Unknown cost metric '{0}' (expected UnblendedCost, NetUnblendedCost, BlendedCost, AmortizedCost or NetAmortizedCost)")]
    UnknownMetric(String),
    #[error("Unknown log format '{0}' (expected text or json)")]
    UnknownLogFormat(String),
}

/// Cost Explorer metric used for every amount in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostMetric {
    UnblendedCost,
    NetUnblendedCost,
    BlendedCost,
    AmortizedCost,
    NetAmortizedCost,
}

impl CostMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnblendedCost => "UnblendedCost",
            Self::NetUnblendedCost => "NetUnblendedCost",
            Self::BlendedCost => "BlendedCost",
            Self::AmortizedCost => "AmortizedCost",
            Self::NetAmortizedCost => "NetAmortizedCost",
        }
    }
}

impl FromStr for CostMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unblendedcost" | "unblended" => Ok(Self::UnblendedCost),
            "netunblendedcost" | "net_unblended" => Ok(Self::NetUnblendedCost),
            "blendedcost" | "blended" => Ok(Self::BlendedCost),
            "amortizedcost" | "amortized" => Ok(Self::AmortizedCost),
            "netamortizedcost" | "net_amortized" => Ok(Self::NetAmortizedCost),
            _ => Err(ConfigError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for CostMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownLogFormat(s.to_string())),
        }
    }
}

/// Settings for one invocation, resolved once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    /// Maximum number of groups before the rest collapse into "Other"
    pub max_groups: usize,
    /// Destination webhook; `None` means log-only delivery
    #[serde(skip_serializing)]
    pub webhook_url: Option<String>,
    /// Cost Explorer dimension to group by
    pub group_by: String,
    pub metric: CostMetric,
    /// RECORD_TYPE values filtered out of the query (e.g. "Credit")
    pub exclude_record_types: Vec<String>,
    /// Groups below this absolute amount are folded into "Other"; 0 disables
    pub cost_floor: f64,
    pub cost_explorer_region: String,
    pub log_format: LogFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_groups: DEFAULT_LENGTH,
            webhook_url: None,
            group_by: DEFAULT_GROUP_BY.to_string(),
            metric: CostMetric::UnblendedCost,
            exclude_record_types: Vec::new(),
            cost_floor: 0.0,
            cost_explorer_region: DEFAULT_REGION.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Treats unset and blank values the same.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ReportConfig {
    /// Build the config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup, applying defaults for
    /// unset or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));
        let defaults = Self::default();

        let max_groups = match get(ENV_LENGTH) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidLength {
                        key: ENV_LENGTH,
                        value: raw,
                    })
                }
            },
            None => defaults.max_groups,
        };

        let cost_floor = match get(ENV_COST_FLOOR) {
            Some(raw) => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: ENV_COST_FLOOR,
                        value: raw,
                    })
                }
            },
            None => defaults.cost_floor,
        };

        let metric = match get(ENV_COST_AGGREGATION) {
            Some(raw) => raw.parse()?,
            None => defaults.metric,
        };

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        let exclude_record_types = get(ENV_EXCLUDE_RECORD_TYPES)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            max_groups,
            webhook_url: get(ENV_WEBHOOK_URL),
            group_by: get(ENV_GROUP_BY)
                .map(|g| g.to_uppercase())
                .unwrap_or(defaults.group_by),
            metric,
            exclude_record_types,
            cost_floor,
            cost_explorer_region: get(ENV_COST_EXPLORER_REGION)
                .unwrap_or(defaults.cost_explorer_region),
            log_format,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.webhook_url.is_none()
    }

    /// Non-fatal configuration warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(url) = &self.webhook_url {
            if !url.starts_with("https://") {
                issues.push(format!(
                    "{} should use HTTPS, got: {}",
                    ENV_WEBHOOK_URL,
                    redact_url(url)
                ));
            }
        }
        if !KNOWN_DIMENSIONS.contains(&self.group_by.as_str()) {
            issues.push(format!(
                "{}: '{}' is not a known Cost Explorer dimension",
                ENV_GROUP_BY, self.group_by
            ));
        }
        if self.cost_floor < 0.0 {
            issues.push(format!(
                "{} is negative ({}); it has no effect",
                ENV_COST_FLOOR, self.cost_floor
            ));
        }
        issues
    }
}

/// Keep scheme and host, hide the path (webhook URLs embed their secret there).
pub fn redact_url(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{}://{}/…", scheme, host)
        }
        None => "…".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ReportConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReportConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.max_groups, 15);
        assert!(config.webhook_url.is_none());
        assert!(config.is_dry_run());
        assert_eq!(config.group_by, "SERVICE");
        assert_eq!(config.metric, CostMetric::UnblendedCost);
        assert!(config.exclude_record_types.is_empty());
        assert_eq!(config.cost_floor, 0.0);
        assert_eq!(config.cost_explorer_region, "us-east-1");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn default_config_is_valid() {
        let issues = ReportConfig::default().validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn reads_length_and_webhook() {
        let config = config_from(&[
            ("LENGTH", "5"),
            ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X"),
        ])
        .unwrap();
        assert_eq!(config.max_groups, 5);
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://hooks.slack.com/services/T/B/X")
        );
        assert!(!config.is_dry_run());
    }

    #[test]
    fn blank_webhook_means_dry_run() {
        let config = config_from(&[("SLACK_WEBHOOK_URL", "   ")]).unwrap();
        assert!(config.is_dry_run());
    }

    #[test]
    fn zero_length_is_rejected() {
        let err = config_from(&[("LENGTH", "0")]).unwrap_err();
        assert!(err.to_string().contains("LENGTH"));
    }

    #[test]
    fn non_numeric_length_is_rejected() {
        assert!(config_from(&[("LENGTH", "ten")]).is_err());
        assert!(config_from(&[("LENGTH", "-3")]).is_err());
    }

    #[test]
    fn parses_metric_case_insensitively() {
        let config = config_from(&[("COST_AGGREGATION", "netamortizedcost")]).unwrap();
        assert_eq!(config.metric, CostMetric::NetAmortizedCost);
        assert_eq!(config.metric.as_str(), "NetAmortizedCost");
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = config_from(&[("COST_AGGREGATION", "Vibes")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMetric(_)));
    }

    #[test]
    fn exclude_record_types_split_on_commas() {
        let config =
            config_from(&[("EXCLUDE_RECORD_TYPES", "Credit, Refund,,Upfront ")]).unwrap();
        assert_eq!(config.exclude_record_types, vec!["Credit", "Refund", "Upfront"]);
    }

    #[test]
    fn group_by_is_uppercased() {
        let config = config_from(&[("GROUP_BY", "linked_account")]).unwrap();
        assert_eq!(config.group_by, "LINKED_ACCOUNT");
    }

    #[test]
    fn cost_floor_must_be_numeric() {
        assert_eq!(config_from(&[("COST_FLOOR", "20")]).unwrap().cost_floor, 20.0);
        assert!(config_from(&[("COST_FLOOR", "lots")]).is_err());
    }

    #[test]
    fn log_format_json() {
        let config = config_from(&[("LOG_FORMAT", "JSON")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn validate_flags_plain_http_webhook() {
        let config = config_from(&[("SLACK_WEBHOOK_URL", "http://hooks.example.com/secret")])
            .unwrap();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("HTTPS")));
        assert!(issues.iter().all(|i| !i.contains("secret")));
    }

    #[test]
    fn validate_flags_unknown_dimension() {
        let config = config_from(&[("GROUP_BY", "COLOUR")]).unwrap();
        assert!(config.validate().iter().any(|i| i.contains("GROUP_BY")));
    }

    #[test]
    fn redact_url_hides_path() {
        assert_eq!(
            redact_url("https://hooks.slack.com/services/T/B/X"),
            "https://hooks.slack.com/…"
        );
        assert_eq!(redact_url("not a url"), "…");
    }
}
