//! Lists every campaign in the configured account and prints them as JSON.
//!
//! Usage: `list_campaigns [STATUS...]`, e.g. `list_campaigns ENABLED PAUSED`.

use easy_adwords::campaigns::Campaigns;
use easy_adwords::{AdsClient, Config, Predicate, Selector, SortOrder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easy_adwords=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let client = AdsClient::new(&config)?;

    let statuses: Vec<String> = std::env::args().skip(1).collect();
    let mut builder = Selector::builder()
        .fields(["Id", "Name", "Status", "ServingStatus", "StartDate", "EndDate"])
        .order_by("Name", SortOrder::Ascending)
        .paginated(true)
        .page_size(config.page_size);
    if !statuses.is_empty() {
        builder = builder.predicate(Predicate::any_of("Status", &statuses));
    }
    let selector = builder.build()?;

    let campaigns = client.entities::<Campaigns>().download(&selector).await?;
    tracing::info!("Listed {} campaigns", campaigns.len());

    println!("{}", serde_json::to_string_pretty(&campaigns)?);
    Ok(())
}
