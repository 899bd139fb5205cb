use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command-line client for the Steam profile relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a profile by SteamID64
    Lookup {
        steamid: String,

        /// Route the upstream call through this proxy (host:port)
        #[arg(long)]
        proxy: Option<String>,

        /// Proxy protocol: SOCKS5 or HTTP
        #[arg(long, default_value = "SOCKS5")]
        proxy_type: String,
    },
    /// Show relay version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut query: Vec<(&str, String)> = Vec::new();
    match &cli.command {
        Commands::Lookup {
            steamid,
            proxy,
            proxy_type,
        } => {
            query.push(("steamid", steamid.clone()));
            if let Some(proxy) = proxy {
                let (host, port) = proxy
                    .rsplit_once(':')
                    .ok_or_else(|| format!("proxy must be host:port, got '{}'", proxy))?;
                query.push(("proxy_enable", "true".to_string()));
                query.push(("proxy_server", host.to_string()));
                query.push(("proxy_port", port.to_string()));
                query.push(("proxy_type", proxy_type.clone()));
            }
        }
        Commands::Version => query.push(("version", String::new())),
    }

    let res = client.get(&cli.url).query(&query).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let pretty = serde_json::to_string_pretty(&json)?;
            if status.is_success() {
                println!("{}", pretty);
            } else {
                eprintln!("Error: relay returned status {}", status);
                eprintln!("{}", pretty);
            }
        }
        Err(_) => {
            eprintln!("Error: relay returned status {} with a non-JSON body", status);
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}
