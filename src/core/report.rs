use tracing::{info, warn};

use crate::core::aggregate::{aggregate, aggregate_with_floor};
use crate::core::billing::{BillingClient, BillingError, CostQuery, IdentityClient};
use crate::core::config::ReportConfig;
use crate::core::formatter::format_message;
use crate::core::models::cost::{CostReport, RawCost};
use crate::core::webhook::{deliver, DeliveryOutcome, WebhookTransport};
use crate::core::window::ReportWindow;

/// Header name used when neither alias nor account ID could be resolved.
pub const UNKNOWN_ACCOUNT: &str = "unknown account";

/// Result of one fetch → aggregate → format → deliver run.
#[derive(Debug)]
pub struct RunSummary {
    pub report: CostReport,
    pub message: String,
    pub delivery: DeliveryOutcome,
}

/// Builds and delivers one cost report using injected clients.
pub struct CostReportBuilder<'a> {
    billing: &'a dyn BillingClient,
    identity: &'a dyn IdentityClient,
    transport: &'a dyn WebhookTransport,
    config: &'a ReportConfig,
}

impl<'a> CostReportBuilder<'a> {
    pub fn new(
        billing: &'a dyn BillingClient,
        identity: &'a dyn IdentityClient,
        transport: &'a dyn WebhookTransport,
        config: &'a ReportConfig,
    ) -> Self {
        Self {
            billing,
            identity,
            transport,
            config,
        }
    }

    /// Alias, else account ID, else [`UNKNOWN_ACCOUNT`]. Lookup failures are
    /// logged and never abort the report.
    pub async fn fetch_account_alias(&self) -> String {
        match self.identity.account_alias().await {
            Ok(Some(alias)) => return alias,
            Ok(None) => info!("No account alias registered, using account ID"),
            Err(e) => warn!(error = %e, "Account alias lookup failed, using account ID"),
        }

        match self.identity.account_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Account ID lookup failed");
                UNKNOWN_ACCOUNT.to_string()
            }
        }
    }

    /// Raw cost lines for `window`, grouped by `group_by_key`.
    pub async fn fetch_cost_and_usage(
        &self,
        window: &ReportWindow,
        group_by_key: &str,
    ) -> Result<Vec<RawCost>, BillingError> {
        let query = CostQuery {
            group_by: group_by_key.to_string(),
            ..CostQuery::from_config(self.config)
        };
        self.billing.cost_and_usage(window, &query).await
    }

    /// Fetch and aggregate; no delivery.
    pub async fn build(&self, window: &ReportWindow) -> Result<CostReport, BillingError> {
        let account = self.fetch_account_alias().await;
        let raw = self
            .fetch_cost_and_usage(window, &self.config.group_by)
            .await?;
        let aggregation = if self.config.cost_floor > 0.0 {
            aggregate_with_floor(&raw, self.config.max_groups, self.config.cost_floor)
        } else {
            aggregate(&raw, self.config.max_groups)
        };

        info!(
            account = %account,
            lines = raw.len(),
            groups = aggregation.groups.len(),
            total = aggregation.total,
            "Aggregated costs"
        );

        Ok(CostReport {
            account,
            date: window.start(),
            groups: aggregation.groups,
            total: aggregation.total,
            currency: aggregation.currency,
        })
    }

    /// The full pipeline. Only a billing failure is an error; delivery
    /// problems are reported in [`RunSummary::delivery`].
    pub async fn run(&self, window: &ReportWindow) -> Result<RunSummary, BillingError> {
        let report = self.build(window).await?;
        let message = format_message(&report);
        let delivery = deliver(&message, self.config.webhook_url.as_deref(), self.transport).await;
        Ok(RunSummary {
            report,
            message,
            delivery,
        })
    }
}
