//! AWS Cost Explorer backed [`BillingClient`].

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_costexplorer::config::Region;
use aws_sdk_costexplorer::types::{
    DateInterval, Dimension, DimensionValues, DimensionValuesWithAttributes, Expression,
    Granularity, GroupDefinition, GroupDefinitionType, ResultByTime,
};
use aws_sdk_costexplorer::Client;
use tracing::{debug, info};

use crate::core::billing::{classify_sdk_error, BillingClient, BillingError, CostQuery};
use crate::core::config::CostMetric;
use crate::core::models::cost::RawCost;
use crate::core::window::ReportWindow;

const OPERATION: &str = "ce:GetCostAndUsage";
/// Upper bound on NextPageToken round-trips for a single query.
const MAX_PAGES: usize = 20;
const UNKNOWN_KEY: &str = "Unknown";
const DESCRIPTION_ATTRIBUTE: &str = "description";

pub struct CostExplorerBilling {
    client: Client,
}

impl CostExplorerBilling {
    /// Cost Explorer only answers in a single region, independent of where
    /// the rest of the account lives.
    pub fn new(sdk_config: &SdkConfig, region: &str) -> Self {
        let config = aws_sdk_costexplorer::config::Builder::from(sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: Client::from_conf(config),
        }
    }
}

/// `NOT RECORD_TYPE IN (...)`, or nothing when no record types are excluded.
fn record_type_filter(excluded: &[String]) -> Option<Expression> {
    if excluded.is_empty() {
        return None;
    }
    let values = DimensionValues::builder()
        .key(Dimension::RecordType)
        .set_values(Some(excluded.to_vec()))
        .build();
    Some(
        Expression::builder()
            .not(Expression::builder().dimensions(values).build())
            .build(),
    )
}

/// Sums group amounts per key across days and pages, keeping first-seen order.
#[derive(Default)]
struct CostAccumulator {
    costs: Vec<RawCost>,
    index: HashMap<String, usize>,
}

impl CostAccumulator {
    fn add_page(
        &mut self,
        results: &[ResultByTime],
        attributes: &[DimensionValuesWithAttributes],
        metric: CostMetric,
    ) -> Result<(), BillingError> {
        for result in results {
            for group in result.groups() {
                let value = group
                    .keys()
                    .first()
                    .map(String::as_str)
                    .unwrap_or(UNKNOWN_KEY);
                let key = label_key(value, attributes);

                let Some(metric_value) = group.metrics().and_then(|m| m.get(metric.as_str()))
                else {
                    continue;
                };
                let amount = match metric_value.amount() {
                    Some(raw) => raw.parse::<f64>().map_err(|_| BillingError::InvalidResponse {
                        operation: OPERATION,
                        message: format!("amount '{}' for '{}' is not a number", raw, key),
                    })?,
                    None => continue,
                };
                let currency = metric_value.unit().unwrap_or_default();
                self.add(key, amount, currency);
            }
        }
        Ok(())
    }

    fn add(&mut self, key: String, amount: f64, currency: &str) {
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.costs[i];
                entry.amount += amount;
                if entry.currency.is_empty() {
                    entry.currency = currency.to_string();
                }
            }
            None => {
                self.index.insert(key.clone(), self.costs.len());
                self.costs.push(RawCost::new(key, amount, currency));
            }
        }
    }

    fn into_costs(self) -> Vec<RawCost> {
        self.costs
    }
}

/// "123456789012 (production)" when the API supplied a description.
fn label_key(value: &str, attributes: &[DimensionValuesWithAttributes]) -> String {
    let description = attributes
        .iter()
        .find(|a| a.value() == Some(value))
        .and_then(|a| a.attributes())
        .and_then(|attrs| attrs.get(DESCRIPTION_ATTRIBUTE))
        .filter(|d| !d.is_empty());
    match description {
        Some(d) => format!("{} ({})", value, d),
        None => value.to_string(),
    }
}

#[async_trait]
impl BillingClient for CostExplorerBilling {
    async fn cost_and_usage(
        &self,
        window: &ReportWindow,
        query: &CostQuery,
    ) -> Result<Vec<RawCost>, BillingError> {
        let (start, end) = window.api_range();
        info!(
            start = %start,
            end = %end,
            group_by = %query.group_by,
            metric = %query.metric,
            "Querying Cost Explorer"
        );

        let interval = DateInterval::builder()
            .start(start)
            .end(end)
            .build()
            .map_err(|e| BillingError::Request {
                operation: OPERATION,
                message: e.to_string(),
            })?;
        let group = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Dimension)
            .key(query.group_by.as_str())
            .build();
        let filter = record_type_filter(&query.exclude_record_types);

        let mut accumulator = CostAccumulator::default();
        let mut next_token: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let response = self
                .client
                .get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(Granularity::Daily)
                .metrics(query.metric.as_str())
                .group_by(group.clone())
                .set_filter(filter.clone())
                .set_next_page_token(next_token.take())
                .send()
                .await
                .map_err(|e| classify_sdk_error(OPERATION, e))?;

            accumulator.add_page(
                response.results_by_time(),
                response.dimension_value_attributes(),
                query.metric,
            )?;
            debug!(page, "Processed Cost Explorer page");

            match response.next_page_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => {
                    let costs = accumulator.into_costs();
                    info!(groups = costs.len(), "Cost Explorer query complete");
                    return Ok(costs);
                }
            }
        }

        Err(BillingError::InvalidResponse {
            operation: OPERATION,
            message: format!("still paginating after {} pages", MAX_PAGES),
        })
    }
}
