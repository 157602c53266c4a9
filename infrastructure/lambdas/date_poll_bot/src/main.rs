mod bot;
mod config;
mod discord;

use bot::{Bot, PollRequest, PollResponse};
use chrono::Utc;
use config::Config;
use discord::{HttpClient, Service};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;

/// Runs one `startPoll` or `closePoll` request, usually fired by a schedule.
///
/// ```json
/// { "action": "startPoll", "pollChannelId": "...", "announcementChannelId": "..." }
/// ```
async fn function_handler(event: LambdaEvent<PollRequest>) -> Result<PollResponse, Error> {
    let config = Config::from_env()?;
    info!(?config, "loaded configuration");

    let client = HttpClient::new(&config.token, &config.api_base)?;
    let bot = Bot::new(Service::new(client), config);

    Ok(bot.handle(&event.payload, Utc::now()).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // the module name is noise in CloudWatch
        .with_target(false)
        // CloudWatch adds the ingestion time
        .without_time()
        .with_ansi(false)
        .init();

    run(service_fn(function_handler)).await
}
