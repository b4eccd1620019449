use coinpulse::config::PipelineConfig;
use coinpulse::pipeline::{self, Collaborators};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let ids = args.next().unwrap_or_else(|| "bitcoin".to_string());
    let vs_currencies = args.next().unwrap_or_else(|| "usd".to_string());

    let config = PipelineConfig::from_env()?;
    let collaborators = Collaborators::from_config(&config);
    let workflow = pipeline::market_update_workflow(&collaborators)?;

    let update = pipeline::run_market_update(&workflow, &ids, &vs_currencies).await?;
    println!("{}", update.summary);
    println!("sent: {}", update.sent);

    Ok(())
}
