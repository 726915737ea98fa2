pub mod cost_explorer;
pub mod identity;

use async_trait::async_trait;
use aws_sdk_costexplorer::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

use crate::core::config::{CostMetric, ReportConfig};
use crate::core::models::cost::RawCost;
use crate::core::window::ReportWindow;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Billing API throttled the request: {0}")]
    Throttled(String),
    #[error("Not authorized to call {operation}: {message}")]
    Unauthorized {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },
    #[error("Unexpected {operation} response: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },
}

const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "LimitExceededException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
];

const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
];

fn classify(operation: &'static str, code: Option<&str>, message: String) -> BillingError {
    match code {
        Some(c) if THROTTLING_CODES.contains(&c) => BillingError::Throttled(message),
        Some(c) if AUTH_CODES.contains(&c) => BillingError::Unauthorized { operation, message },
        _ => BillingError::Request { operation, message },
    }
}

/// Map an AWS SDK error onto [`BillingError`] using its service error code.
pub(crate) fn classify_sdk_error<E>(operation: &'static str, err: E) -> BillingError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    classify(operation, err.code(), message)
}

/// What to ask the billing API for, besides the window.
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuery {
    /// Dimension to group by, e.g. "SERVICE"
    pub group_by: String,
    pub metric: CostMetric,
    pub exclude_record_types: Vec<String>,
}

impl CostQuery {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            group_by: config.group_by.clone(),
            metric: config.metric,
            exclude_record_types: config.exclude_record_types.clone(),
        }
    }
}

/// Source of cost-and-usage data.
#[async_trait]
pub trait BillingClient: Send + Sync {
    /// Costs for `window`, one entry per dimension value, in no particular order.
    async fn cost_and_usage(
        &self,
        window: &ReportWindow,
        query: &CostQuery,
    ) -> Result<Vec<RawCost>, BillingError>;
}

/// Source of the account's display name.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn account_id(&self) -> Result<String, BillingError>;

    /// The first registered alias, if any.
    async fn account_alias(&self) -> Result<Option<String>, BillingError>;
}
