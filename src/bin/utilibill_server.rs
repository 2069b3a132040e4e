//! utilibill API Server binary
//!
//! HTTP REST API for bill extraction and report generation.

use clap::Parser;
use utilibill::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "utilibill-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "utilibill API Server - HTTP REST API for utility bill extraction")]
#[command(long_about = r#"
utilibill API Server - HTTP REST API

Provides RESTful endpoints for the bill pipeline:
  - POST /api/v1/extract  - Extract monthly records from an uploaded bill
  - POST /api/v1/apply    - Apply an uploaded bill to the report template

Additional endpoints:
  - GET  /health          - Health check
  - GET  /version         - Server version info
  - GET  /                - API documentation

Features:
  - Multipart bill upload (.xlsx / .xlsm)
  - Optional profile and layout documents per request
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs

Example usage:
  utilibill-server                           # Start on localhost:8080
  utilibill-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/extract \
    -F "file=@bill.xlsx"
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "UTILIBILL_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "UTILIBILL_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
