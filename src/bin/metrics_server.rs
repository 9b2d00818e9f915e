//! Minimal HTTP/1.1 metrics responder.
//!
//! `GET /metrics` returns a plaintext exposition with build info and uptime;
//! every other path answers `ok`. One request per connection, then close.

use anyhow::{Context, Result};
use clap::Parser;
use matchbook_rs::Stopwatch;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "metrics_server", about = "Plaintext /metrics endpoint")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn metrics_body(uptime_secs: f64) -> String {
    let mut b = String::new();
    b.push_str("# HELP build_info Build information.\n");
    b.push_str("# TYPE build_info gauge\n");
    b.push_str(&format!(
        "build_info{{git_sha=\"{}\",version=\"{}\"}} 1\n",
        option_env!("GIT_SHA").unwrap_or("dev"),
        env!("CARGO_PKG_VERSION"),
    ));
    b.push_str("# HELP engine_uptime_seconds Engine uptime in seconds.\n");
    b.push_str("# TYPE engine_uptime_seconds gauge\n");
    b.push_str(&format!("engine_uptime_seconds {uptime_secs}\n"));
    b
}

fn respond(stream: &mut TcpStream, body: &str, content_type: &str) -> std::io::Result<()> {
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(body.as_bytes())
}

fn handle(stream: &mut TcpStream, uptime: &Stopwatch) -> std::io::Result<()> {
    let mut buf = [0u8; 2048];
    let n = stream.read(&mut buf)?;
    if n == 0 {
        return Ok(());
    }
    let request = String::from_utf8_lossy(&buf[..n]);
    let wants_metrics = request.starts_with("GET /metrics");

    if wants_metrics {
        respond(
            stream,
            &metrics_body(uptime.elapsed_secs()),
            "text/plain; version=0.0.4",
        )
    } else {
        respond(stream, "ok\n", "text/plain")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let uptime = Stopwatch::new();

    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .with_context(|| format!("failed to bind port {}", args.port))?;
    info!(port = args.port, "metrics server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(e) = handle(&mut stream, &uptime) {
                    warn!("request failed: {e}");
                }
            }
            Err(e) => warn!("accept failed: {e}"),
        }
    }
    Ok(())
}
