//! Downloads a report and prints its rows as JSON objects keyed by column.
//!
//! Usage: `download_report REPORT_TYPE FIELD[,FIELD...] [START END]`
//! with dates as `YYYY-MM-DD`, e.g.
//! `download_report CAMPAIGN_PERFORMANCE_REPORT CampaignId,Clicks 2024-01-01 2024-01-31`.

use anyhow::Context;
use chrono::NaiveDate;
use easy_adwords::reports::{Report, ReportConfig, ReportType};
use easy_adwords::{AdsClient, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn parse_report_type(name: &str) -> ReportType {
    match name {
        "ACCOUNT_PERFORMANCE_REPORT" => ReportType::AccountPerformance,
        "AD_PERFORMANCE_REPORT" => ReportType::AdPerformance,
        "CAMPAIGN_PERFORMANCE_REPORT" => ReportType::CampaignPerformance,
        "FINAL_URL_REPORT" => ReportType::FinalUrl,
        "KEYWORDS_PERFORMANCE_REPORT" => ReportType::KeywordsPerformance,
        "SEARCH_QUERY_PERFORMANCE_REPORT" => ReportType::SearchQueryPerformance,
        other => ReportType::Custom(other.to_string()),
    }
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easy_adwords=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 2 && args.len() != 4 {
        anyhow::bail!("usage: download_report REPORT_TYPE FIELD[,FIELD...] [START END]");
    }

    let report_type = parse_report_type(&args[0]);
    let fields: Vec<&str> = args[1].split(',').filter(|f| !f.is_empty()).collect();
    let mut report_config = ReportConfig::new(fields)?;
    if args.len() == 4 {
        report_config = report_config.with_dates(parse_date(&args[2])?, parse_date(&args[3])?)?;
    }

    let config = Config::from_env()?;
    let client = AdsClient::new(&config)?;

    let report = Report::download(&client, &report_config, report_type)
        .await?
        .format();
    tracing::info!(
        "Report has {} columns and {} rows",
        report.headers.len(),
        report.rows.len()
    );

    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    Ok(())
}
