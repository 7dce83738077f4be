//! Offline log shipping example
//!
//! Buffers events while silent, then switches to active and receives the
//! flushed backlog on a local UDP socket standing in for the log server.
//!
//! Run with: cargo run --example offline_shipping

use rust_analytics_system::attributes;
use rust_analytics_system::handlers::{LogShippingHandler, ShippingFormat};
use rust_analytics_system::prelude::*;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rust_analytics_system=debug")),
        )
        .init();

    println!("=== Rust Analytics System - Offline Shipping Example ===\n");

    let server = UdpSocket::bind("127.0.0.1:0")?;
    server.set_read_timeout(Some(Duration::from_secs(2)))?;
    let port = server.local_addr()?.port();

    let buffer_dir = std::env::temp_dir().join("analytics_offline_demo");
    let config = ShipperConfig::new()
        .with_server("127.0.0.1", port)
        .with_directory(&buffer_dir)
        .with_retention(7, RetentionPolicy::Sweep);
    let shipper = Arc::new(LogShipper::start(config)?);

    let analytics = Analytics::builder()
        .context(HandlerContext::new("demo-shop").with_log_shipper(Arc::clone(&shipper)))
        .factory(Target::LogShipping, || {
            LogShippingHandler::new().with_format(ShippingFormat::Json)
        })
        .build();
    analytics.initialize(Target::LogShipping, true);

    println!("1. Logging while silent (buffered in {}):", buffer_dir.display());
    for step in ["cart_opened", "item_added", "checkout"] {
        analytics
            .new_event(step)
            .with(attributes! { "session" => 7 })
            .to(Target::LogShipping)
            .send();
        println!("   buffered {}", step);
    }
    shipper.sync()?;

    println!("\n2. Switching to active:");
    shipper.change_mode(LogMode::Active)?;
    shipper.log_event("live line after the flush")?;
    shipper.sync()?;

    let mut buf = [0u8; 1024];
    while let Ok((len, _)) = server.recv_from(&mut buf) {
        println!("   server received: {}", String::from_utf8_lossy(&buf[..len]));
    }

    let metrics = shipper.metrics();
    println!(
        "\nBuffered: {}, transmitted: {}, partitions flushed: {}",
        metrics.lines_buffered(),
        metrics.lines_transmitted(),
        metrics.partitions_flushed()
    );

    shipper.shutdown(Duration::from_secs(5));
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
