//! leadgen-poll - Watch webhook results and submit lead searches

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use leadgen_common::api::WEBHOOK_PATH;
use leadgen_common::config::{resolve_setting, Integrations, TomlConfig};
use leadgen_common::search::{ClayPayload, LeadSearch};
use leadgen_common::{samples, time};
use leadgen_poll::client::DEFAULT_SERVER_URL;
use leadgen_poll::render::{render_session, TerminalView, ViewMode};
use leadgen_poll::submit::{curl_command, DeliveryTargets};
use leadgen_poll::{LeadSubmitter, PollCommand, PollRunner, PollSession, WebhookClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Command-line arguments for leadgen-poll
#[derive(Parser, Debug)]
#[command(name = "leadgen-poll")]
#[command(about = "Watch accumulated webhook results and submit lead searches")]
#[command(version)]
struct Cli {
    /// Webhook receiver base URL
    #[arg(short, long, global = true, env = "LEADGEN_SERVER_URL")]
    server: Option<String>,

    /// TOML config file (default: ~/.config/leadgen/config.toml)
    #[arg(short, long, global = true, env = "LEADGEN_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    discord_webhook_url: Option<String>,

    #[arg(long, global = true, env = "CLAY_WEBHOOK_URL", hide_env_values = true)]
    clay_webhook_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the receiver and redraw results as they arrive
    Watch {
        /// Seconds between fetches
        #[arg(long, default_value = "5")]
        interval: u64,
        /// Show raw JSON instead of result cards
        #[arg(long)]
        json: bool,
    },
    /// Fetch and print results once
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete every accumulated result
    DeleteAll {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Post sample leads (or a JSON file) to the receiver
    Send {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Submit a lead search
    Search(SearchArgs),
    /// Print the curl command for a lead search
    Curl(SearchArgs),
    /// Send a fixed test payload to the enrichment API
    TestClay,
    /// Ask the receiver to add a simulated callback
    Simulate,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(long)]
    company_size: Option<String>,
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    keywords: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// Repeatable
    #[arg(long = "job-level")]
    job_levels: Vec<String>,
    /// Repeatable
    #[arg(long = "job-title")]
    job_titles: Vec<String>,
    #[arg(long)]
    limit: Option<u32>,
}

impl From<SearchArgs> for LeadSearch {
    fn from(args: SearchArgs) -> Self {
        LeadSearch {
            company_size: args.company_size,
            industry: args.industry,
            company_keywords: args.keywords,
            country: args.country,
            region: args.region,
            city: args.city,
            job_levels: args.job_levels,
            job_titles: args.job_titles,
            results_limit: args.limit,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the watch screen on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadgen_poll=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let toml = TomlConfig::load_or_default(cli.config.as_deref());

    let server_url = resolve_setting(cli.server, toml.server_url.as_deref())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let integrations = Integrations::resolve(
        Integrations {
            discord_webhook_url: cli.discord_webhook_url,
            clay_webhook_url: cli.clay_webhook_url,
            ..Default::default()
        },
        &toml,
    );

    let client = WebhookClient::new(&server_url).context("Invalid receiver address")?;

    match cli.command {
        Command::Watch { interval, json } => watch(client, interval, json).await,
        Command::List { json } => {
            let mut session = PollSession::new();
            session.finish_fetch(client.list().await);
            if let Some(error) = session.error() {
                bail!("Error fetching results: {}", error);
            }
            print!("{}", render_session(&session, view_mode(json)));
            Ok(())
        }
        Command::DeleteAll { yes } => {
            if !yes && !confirm("Delete all results? Type 'yes' to confirm: ").await? {
                println!("Cancelled");
                return Ok(());
            }
            let response = client.clear().await.context("Failed to delete results")?;
            println!("{}", response.message);
            Ok(())
        }
        Command::Send { file } => {
            let payload = match file {
                Some(path) => {
                    let text = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    serde_json::from_str(&text)
                        .with_context(|| format!("{} is not valid JSON", path.display()))?
                }
                None => samples::lead_batch(time::now()),
            };
            let response = client
                .ingest(&payload)
                .await
                .with_context(|| format!("Failed to send to {}", client.url(WEBHOOK_PATH)))?;
            println!("{} ({} total entries)", response.message, response.total_entries);
            Ok(())
        }
        Command::Search(args) => {
            let submitter = LeadSubmitter::new(
                DeliveryTargets {
                    server_url: Some(server_url),
                    clay_webhook_url: integrations.clay_webhook_url,
                },
                integrations.discord_webhook_url,
            )?;
            let outcome = submitter.submit_search(&args.into()).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Curl(args) => {
            let Some(url) = integrations.clay_webhook_url else {
                bail!("Clay webhook URL not configured (set CLAY_WEBHOOK_URL)");
            };
            let payload = ClayPayload::from_search(&args.into(), time::now());
            println!("{}", curl_command(&serde_json::to_value(&payload)?, &url));
            Ok(())
        }
        Command::TestClay => {
            let submitter = LeadSubmitter::new(
                DeliveryTargets {
                    server_url: Some(server_url),
                    clay_webhook_url: integrations.clay_webhook_url,
                },
                None,
            )?;
            match submitter.test_clay().await {
                Ok(delivered) => {
                    println!(
                        "Successfully sent test data to Clay API via {}!",
                        delivered.route.label()
                    );
                    if !delivered.body.is_empty() {
                        println!("{}", delivered.body);
                    }
                    Ok(())
                }
                Err(e) => bail!(
                    "Could not send data to Clay API: {}. Please use the CURL command.",
                    e
                ),
            }
        }
        Command::Simulate => {
            let response = client.simulate().await.context("Simulate request failed")?;
            println!("{} ({} total entries)", response.message, response.total_entries);
            Ok(())
        }
    }
}

fn view_mode(json: bool) -> ViewMode {
    if json {
        ViewMode::Json
    } else {
        ViewMode::Cards
    }
}

async fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

async fn watch(client: WebhookClient, interval: u64, json: bool) -> Result<()> {
    let (tx, rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();

    let keys = tokio::spawn(read_keys(tx));

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, stopping");
            ctrl_c.cancel();
        }
    });

    let runner = PollRunner::new(client, TerminalView::new(std::io::stdout(), view_mode(json)))
        .with_interval(Duration::from_secs(interval.max(1)));
    let (session, _) = runner.run(rx, shutdown.clone()).await;
    shutdown.cancel();
    keys.abort();

    info!(results = session.results().len(), "Watch ended");
    Ok(())
}

/// Map typed lines from stdin to poll commands
async fn read_keys(tx: mpsc::Sender<PollCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = match line.trim() {
            "r" => PollCommand::Refresh,
            "s" => PollCommand::ToggleSort,
            "p" => PollCommand::TogglePolling,
            "d" => PollCommand::DeleteAll,
            "y" => PollCommand::ConfirmDelete,
            "n" => PollCommand::CancelDelete,
            "q" => PollCommand::Quit,
            _ => continue,
        };
        if tx.send(command).await.is_err() {
            break;
        }
    }
    // stdin closed: hold the channel open so only q or Ctrl+C end the session
    tx.closed().await;
}
