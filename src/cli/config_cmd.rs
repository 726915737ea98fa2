use anyhow::Result;
use colored::{control, Colorize};
use serde::Serialize;

use crate::cli::output::{to_json, OutputFormat, OutputOptions};
use crate::core::config::{redact_url, ReportConfig};

#[derive(Serialize)]
struct CheckPayload<'a> {
    config: &'a ReportConfig,
    webhook: Option<String>,
    issues: &'a [String],
}

fn render_settings(config: &ReportConfig) -> Vec<String> {
    let webhook = if config.is_dry_run() {
        "(not set, dry run)".to_string()
    } else {
        config.webhook_url.as_deref().map(redact_url).unwrap_or_default()
    };
    let excluded = if config.exclude_record_types.is_empty() {
        "(none)".to_string()
    } else {
        config.exclude_record_types.join(", ")
    };
    let floor = if config.cost_floor > 0.0 {
        format!("{:.2}", config.cost_floor)
    } else {
        "(disabled)".to_string()
    };

    vec![
        format!("  {}     {}", "Groups".cyan(), config.max_groups),
        format!("  {}   {}", "Group by".cyan(), config.group_by),
        format!("  {}     {}", "Metric".cyan(), config.metric),
        format!("  {}   {}", "Excluded".cyan(), excluded),
        format!("  {}      {}", "Floor".cyan(), floor),
        format!("  {}     {}", "Region".cyan(), config.cost_explorer_region),
        format!("  {}    {}", "Webhook".cyan(), webhook),
    ]
}

/// Resolve configuration from the environment and report problems.
pub fn check(opts: &OutputOptions) -> Result<()> {
    control::set_override(opts.use_color);

    let config = match ReportConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let issues = config.validate();

    if opts.format == OutputFormat::Json {
        let payload = CheckPayload {
            config: &config,
            webhook: config.webhook_url.as_deref().map(redact_url),
            issues: &issues,
        };
        println!("{}", to_json(&payload, opts)?);
    } else {
        if issues.is_empty() {
            println!("{}", "Configuration is valid".bold());
        } else {
            println!("{}", "Configuration warnings:".yellow().bold());
            for issue in &issues {
                println!("  - {}", issue);
            }
        }
        for line in render_settings(&config) {
            println!("{}", line);
        }
    }
    Ok(())
}
