//! Basic analytics usage example
//!
//! Demonstrates handler initialization, default parameters and event
//! routing with the structured log handler and a console crash reporter.
//!
//! Run with: cargo run --example basic_usage

use rust_analytics_system::attributes;
use rust_analytics_system::handlers::{CrashReporterClient, CustomEvent, StructuredLogHandler};
use rust_analytics_system::prelude::*;
use std::sync::Arc;
use tracing::Level;

/// Stand-in for a crash reporting SDK
struct ConsoleCrashReporter;

impl CrashReporterClient for ConsoleCrashReporter {
    fn start(&self, app_name: &str) -> Result<()> {
        println!("   [crash reporter] started for {}", app_name);
        Ok(())
    }

    fn log_custom(&self, event: CustomEvent) -> Result<()> {
        println!("   [crash reporter] {} {:?}", event.name, event.attributes);
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    println!("=== Rust Analytics System - Basic Usage Example ===\n");

    let context = HandlerContext::new("demo-shop").with_crash_reporter(Arc::new(ConsoleCrashReporter));
    let analytics = Analytics::builder()
        .context(context)
        .factory(Target::StructuredLog, || {
            StructuredLogHandler::new()
                .with_level(Level::INFO)
                .with_values(true)
        })
        .build();

    println!("1. Initializing every handler:");
    let report = analytics.initialize_all();
    for (target, active) in report.statuses() {
        println!("   {:<16} {}", target.to_str(), if *active { "active" } else { "unavailable" });
    }

    println!("\n2. Default parameters:");
    analytics.add_default_parameters(Target::All, attributes! { "env" => "demo" });
    analytics.add_default_parameters(Target::CrashReporter, attributes! { "build" => "1.4.2" });
    analytics.on_login("alice", "beta tester");

    println!("\n3. Broadcasting an event:");
    let delivered = analytics
        .new_event("checkout")
        .with(attributes! { "amount" => 42, "currency" => "EUR" })
        .send();
    println!("   delivered to {} handler(s)", delivered);

    println!("\n4. Targeting one backend:");
    analytics
        .new_event("sync_failed")
        .with_attribute("retries", 3)
        .to(Target::CrashReporter)
        .send();

    println!("\n5. Sending to a backend that is not running:");
    let delivered = analytics.new_event("ignored").to(Target::ProductAnalytics).send();
    println!("   delivered to {} handler(s)", delivered);

    analytics.on_logout().send();

    let metrics = analytics.metrics();
    println!(
        "\nDispatched: {}, delivered: {}, skipped: {}",
        metrics.events_dispatched(),
        metrics.deliveries(),
        metrics.missing_handler_skips()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
