//! u2net-serve HTTP server
//!
//! Serves U2-Net background replacement over HTTP with the Tract or ONNX
//! Runtime backend.

#[cfg(feature = "cli")]
use u2net_serve::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
