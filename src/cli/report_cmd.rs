use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::cli::output::{to_json, OutputFormat, OutputOptions};
use crate::core::billing::cost_explorer::CostExplorerBilling;
use crate::core::billing::identity::AwsIdentity;
use crate::core::config::ReportConfig;
use crate::core::report::CostReportBuilder;
use crate::core::webhook::{DeliveryOutcome, ReqwestTransport};
use crate::core::window::ReportWindow;

/// One scheduled invocation: build the report for `date` (default yesterday,
/// UTC) and deliver it.
pub async fn run(
    mut config: ReportConfig,
    date: Option<NaiveDate>,
    dry_run: bool,
    opts: &OutputOptions,
) -> Result<()> {
    if dry_run {
        config.webhook_url = None;
    }
    for issue in config.validate() {
        warn!("{}", issue);
    }
    if config.is_dry_run() {
        info!("No webhook configured, the report will only be logged");
    }

    let window = match date {
        Some(day) => ReportWindow::for_day(day),
        None => ReportWindow::yesterday(),
    }
    .context("Invalid report date")?;
    info!(start = %window.start(), end = %window.end(), "Building cost report");

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let billing = CostExplorerBilling::new(&sdk_config, &config.cost_explorer_region);
    let identity = AwsIdentity::new(&sdk_config);
    let transport = ReqwestTransport::new()?;

    let builder = CostReportBuilder::new(&billing, &identity, &transport, &config);
    let summary = builder
        .run(&window)
        .await
        .with_context(|| format!("Failed to build cost report for {}", window.start()))?;

    debug!(chars = summary.message.len(), "Rendered message");

    match &summary.delivery {
        DeliveryOutcome::DryRun | DeliveryOutcome::Delivered { .. } => {
            info!(date = %window.start(), "Cost report finished")
        }
        DeliveryOutcome::Rejected { .. } | DeliveryOutcome::Failed { .. } => {
            warn!(date = %window.start(), "Cost report built but not delivered")
        }
    }

    if opts.format == OutputFormat::Json {
        println!("{}", to_json(&summary.report, opts)?);
    }

    Ok(())
}
