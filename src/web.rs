#![cfg(not(tarpaulin_include))]

use cgpa::Calculator;
use cgpa::app;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};

/// Serve the CGPA calculator page and its JSON API.
#[derive(Parser, Debug)]
#[command(name = "cgpa-web", version)]
struct Args {
    /// Address to bind
    #[arg(short = 'H', long, env = "CGPA_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "CGPA_PORT", default_value_t = 3000)]
    port: u16,

    /// Start with an empty table instead of the sample courses
    #[arg(long)]
    empty: bool,
}

/// Main entry point for the web application
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let calculator = if args.empty {
        Calculator::empty()
    } else {
        Calculator::with_sample_courses()
    };

    app::run(SocketAddr::new(args.host, args.port), calculator).await
}
