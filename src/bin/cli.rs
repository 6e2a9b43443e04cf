//! FrameKV CLI Client
//!
//! Sends one message built from the positional tokens and prints the reply.
//!
//! ```text
//! framekv-cli SET name Ariz
//! framekv-cli GET name
//! ```

use anyhow::Context;
use clap::Parser;
use framekv::Client;
use std::time::Duration;

/// FrameKV CLI
#[derive(Parser, Debug)]
#[command(name = "framekv-cli")]
#[command(about = "Send a single command to a FrameKV server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, env = "FRAMEKV_HOST", default_value = framekv::DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, env = "FRAMEKV_PORT", default_value_t = framekv::DEFAULT_PORT)]
    port: u16,

    /// How long to wait for a reply, in milliseconds. An empty value
    /// produces no reply, so `GET` of one ends here.
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Tokens to frame, verb first (e.g. `GET key`)
    #[arg(required = true, num_args = 1..)]
    tokens: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let mut client = Client::connect(addr.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", addr))?
        .with_read_timeout(Duration::from_millis(args.timeout_ms));

    let reply = client
        .send(args.tokens.as_slice())
        .await
        .context("request failed")?;

    println!("{}", String::from_utf8_lossy(&reply));
    Ok(())
}
