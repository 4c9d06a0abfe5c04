use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use std::time::Duration;
use telewallet::application::session::WalletSession;
use telewallet::config::{DispatchEncoding, WalletConfig};
use telewallet::domain::account::fallback_address;
use telewallet::domain::identity::ExternalIdentity;
use telewallet::domain::transaction::Direction;
use telewallet::infrastructure::http::HttpGateway;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(author, version, about = "Telegram-embedded wallet client", long_about = None)]
struct Cli {
    /// Raw identity payload handed over by the Telegram host (JSON)
    #[arg(long)]
    init_data: String,

    /// Backend base URL
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// Seconds between background refresh cycles
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Submit transfers as a JSON POST instead of the note-path GET
    #[arg(long)]
    json_dispatch: bool,

    /// Treat HTTP 500 from the lookup endpoint as "not yet provisioned"
    #[arg(long)]
    treat_500_as_missing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let identity = ExternalIdentity::from_init_data(&cli.init_data).into_diagnostic()?;

    let mut not_provisioned_statuses = vec![404];
    if cli.treat_500_as_missing {
        not_provisioned_statuses.push(500);
    }
    let config = WalletConfig {
        base_url: cli.base_url,
        poll_interval: Duration::from_secs(cli.poll_interval),
        dispatch: if cli.json_dispatch {
            DispatchEncoding::SendJson
        } else {
            DispatchEncoding::NotePath
        },
        not_provisioned_statuses,
        ..WalletConfig::default()
    };

    let poll_interval = config.poll_interval;
    let gateway = Arc::new(HttpGateway::new(config).into_diagnostic()?);
    let session = WalletSession::open(gateway, identity).await.into_diagnostic()?;
    let poller = session.start_polling(poll_interval);

    println!(
        "wallet ready for @{} ({})",
        session.identity().handle,
        session.account().account_id
    );
    println!("commands: balance | history | suggest <input> | send <recipient> <amount> | faucet | sync | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.into_diagnostic()? {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("balance") => {
                let view = session.view().await;
                let marker = if view.balance_stale { " (stale)" } else { "" };
                match view.account {
                    Some(account) => {
                        println!("{}{marker}", account.balance);
                        // Until the backend reports an address, show the
                        // derived placeholder like the hosted UI does.
                        let address = if account.address.is_empty() {
                            fallback_address(&session.identity().external_id)
                        } else {
                            account.address
                        };
                        println!("address: {address}");
                    }
                    None => println!("loading...{marker}"),
                }
            }
            Some("history") => {
                let view = session.view().await;
                let marker = if view.history_stale { " (stale)" } else { "" };
                if view.transactions.is_empty() {
                    println!("no transactions yet{marker}");
                }
                for tx in &view.transactions {
                    let when = chrono::DateTime::from_timestamp(tx.timestamp, 0)
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "unknown time".to_string());
                    match tx.direction {
                        Direction::Inbound => {
                            println!("received {} from {} on {when}{marker}", tx.amount, tx.counterparty)
                        }
                        Direction::Outbound => {
                            println!("sent {} to {} on {when}{marker}", tx.amount, tx.counterparty)
                        }
                    }
                }
            }
            Some("suggest") => {
                let partial = words.next().unwrap_or_default();
                for handle in session.suggest(partial).await {
                    println!("@{handle}");
                }
            }
            Some("send") => {
                let recipient = words.next().unwrap_or_default();
                let amount = words.next().unwrap_or_default();
                match session.send(recipient, amount).await {
                    Ok(()) => println!("funds sent"),
                    Err(e) => println!("send failed: {e}"),
                }
            }
            Some("faucet") => match session.request_faucet().await {
                Ok(()) => println!("faucet funding received"),
                Err(e) => println!("faucet funding failed: {e}"),
            },
            Some("sync") => {
                session.force_sync().await;
                println!("synced");
            }
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command: {other}"),
            None => {}
        }
    }

    poller.abort();
    Ok(())
}
