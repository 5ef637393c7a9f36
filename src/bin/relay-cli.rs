use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the LLM relay admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "LLM_RELAY_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay status and breaker settings
    Status,
    /// List candidate backends with masked credentials and circuit state
    Backends,
    /// Run a generation and print its full diagnostics
    Generate {
        #[arg(short, long)]
        prompt: String,
    },
    /// Print a curl command reproducing one backend call
    Reproduce {
        #[arg(short, long)]
        backend: String,
        #[arg(short, long)]
        prompt: String,
        /// Include the clear-text credential
        #[arg(long)]
        reveal: bool,
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

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Backends => {
            let res = client
                .get(format!("{}/admin/backends", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Generate { prompt } => {
            let res = client
                .post(format!("{}/admin/generate", cli.url))
                .headers(headers)
                .json(&json!({ "prompt": prompt }))
                .send()
                .await?;
            print_generation(res).await?;
        }
        Commands::Reproduce {
            backend,
            prompt,
            reveal,
        } => {
            let res = client
                .post(format!("{}/admin/reproduce", cli.url))
                .headers(headers)
                .json(&json!({ "backend": backend, "prompt": prompt, "reveal": reveal }))
                .send()
                .await?;
            if !res.status().is_success() {
                return print_response(res).await;
            }
            let body: Value = res.json().await?;
            println!("{}", body["command"].as_str().unwrap_or_default());
        }
    }

    Ok(())
}

/// Print the trace first, then the text or the failure kind.
async fn print_generation(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = match res.json().await {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Error: Admin API returned status {} ({})", status, e);
            return Ok(());
        }
    };

    if let Some(trace) = body["trace"].as_str() {
        eprintln!("{}", trace);
    }
    match body["text"].as_str() {
        Some(text) => println!("{}", text),
        None => eprintln!("Generation failed: {}", body["kind"].as_str().unwrap_or("unknown")),
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
