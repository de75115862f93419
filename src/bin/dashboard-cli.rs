use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "dashboard-cli")]
#[command(about = "Management CLI for the failover dashboard", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8090")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Active target, health records and stream state
    Status,
    /// Action log entries and counters
    Log,
    /// Empty the action log
    Clear,
    /// Fetch the data endpoint once
    Data,
    /// Inject a fault without waiting for recovery
    Fail,
    /// Ask the API to recover
    Recover,
    /// Inject a fault and measure recovery
    Cycle,
    /// Start or stop periodic data requests
    AutoPing {
        /// Requests per second, at most 10
        #[arg(long, conflicts_with = "off", required_unless_present = "off")]
        rate: Option<f64>,

        #[arg(long)]
        off: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let (method, path, body) = match cli.command {
        Commands::Status => (Method::GET, "/admin/status", None),
        Commands::Log => (Method::GET, "/admin/log", None),
        Commands::Clear => (Method::POST, "/admin/log/clear", None),
        Commands::Data => (Method::POST, "/admin/data", None),
        Commands::Fail => (Method::POST, "/admin/fail", None),
        Commands::Recover => (Method::POST, "/admin/recover", None),
        Commands::Cycle => (Method::POST, "/admin/cycle", None),
        Commands::AutoPing { off: true, .. } => (Method::DELETE, "/admin/auto-ping", None),
        Commands::AutoPing { rate, .. } => (
            Method::POST,
            "/admin/auto-ping",
            Some(json!({ "rate_per_sec": rate })),
        ),
    };

    let mut req = client
        .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers);
    if let Some(body) = body {
        req = req.json(&body);
    }

    print_response(req.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
