use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use threadcast_agent::invoke::invoke;
use threadcast_agent::schedule::{interval_from_hours, run_schedule};
use threadcast_agent::{InvocationRequest, InvocationResponse, Task, shared_random};
use threadcast_common::observability::{LogFormat, init_logging};
use threadcast_common::random::SystemRandom;
use threadcast_config::{ConfigLoader, Credentials, OpenAiCredentials, ThreadcastConfig};
use threadcast_web::TopicSource;
mod wiring;

/// Generate AI-topic threads and post them to X/Twitter.
#[derive(Parser)]
#[command(name = "threadcast", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./threadcast.yaml when present).
    #[arg(long, global = true, env = "THREADCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one task and print the `{ status_code, body }` response.
    Run {
        #[arg(long, default_value = Task::DEFAULT_NAME)]
        task: String,
        /// Generate about this topic instead of a trending one.
        #[arg(long)]
        topic: Option<String>,
        /// Text for the `post_text` task.
        #[arg(long)]
        text: Option<String>,
    },
    /// Post a thread every N hours until interrupted.
    Schedule {
        #[arg(long)]
        every_hours: Option<u64>,
    },
    /// Print the topics the configured sources currently yield.
    Topics,
    /// Generate a thread and print it without posting.
    Draft {
        #[arg(long)]
        topic: Option<String>,
    },
    /// Verify the X/Twitter credentials and the text-generation service.
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let dotenv_error = dotenv_error(dotenvy::dotenv());
    let cli = Cli::parse();

    let cfg: ThreadcastConfig = ConfigLoader::discover(cli.config.as_deref())
        .load()
        .context("failed to load configuration")?;

    let mut log = cfg.log_config("threadcast");
    if cli.json_logs {
        log.format = LogFormat::Json;
    }
    let log_path = init_logging(log)?;
    tracing::debug!(path = %log_path.display(), "logging initialised");
    if let Some(e) = dotenv_error {
        tracing::warn!(error = %e, "ignoring unreadable .env file");
    }

    match cli.command {
        Command::Run { task, topic, text } => {
            let request = InvocationRequest {
                task: Some(task),
                custom_topic: topic,
                text,
            };
            let response = match wiring::connect(&cfg).await {
                Ok(agent) => invoke(&agent, request).await,
                Err(e) => {
                    tracing::error!(error = %e, "setup failed");
                    InvocationResponse::setup_failure(&e)
                }
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Schedule { every_hours } => {
            let agent = wiring::connect(&cfg).await?;
            let every = interval_from_hours(every_hours.unwrap_or(cfg.schedule.every_hours));
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "cannot listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
                tracing::info!("scheduling stopped by user");
            };
            run_schedule(&agent, every, shutdown).await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Topics => {
            for topic in wiring::topic_scraper(&cfg).topics().await {
                println!("{topic}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Draft { topic } => {
            let openai = OpenAiCredentials::from_config(&cfg);
            let drafter = wiring::drafter(&cfg, &openai, shared_random(SystemRandom::new()))?;
            let content = drafter.draft(topic.as_deref()).await;
            println!("{}", serde_json::to_string_pretty(&content)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let creds = Credentials::from_config(&cfg)?;
            let user = wiring::twitter_api(&cfg, &creds)?.verify_credentials().await?;
            println!("twitter: ok (@{})", user.username);
            match wiring::llm_client(&cfg, &creds.openai)? {
                Some(llm) => {
                    let status = if llm.health_check().await? { "ok" } else { "unavailable" };
                    println!("openai: {status} ({})", llm.model_name());
                }
                None => println!("openai: not configured, template generation only"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// A missing `.env` is normal; anything else is reported once logging is up.
fn dotenv_error(result: dotenvy::Result<PathBuf>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}
