//! Service Wiring
//!
//! Registers a small set of services, decorates one of them, starts the
//! container and shuts it down again.
//!
//! Run with: cargo run --example service_wiring

use bluecheese::bind;
use bluecheese::container::{
    ContainerError, Injectable, Resolution, Service, ServiceContainer, ServiceOptions,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct FixedClock(u64);

impl Service for FixedClock {}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

bind!(FixedClock => dyn Clock);

trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

#[derive(Default)]
struct LoggerOptions {
    prefix: String,
}

impl ServiceOptions for LoggerOptions {}

struct ConsoleLogger {
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl Service for ConsoleLogger {
    fn dispose(&self) {
        println!("{} closing console", self.prefix);
    }
}

impl Injectable for ConsoleLogger {
    fn construct(ctx: &mut Resolution<'_>) -> Result<Self, ContainerError> {
        Ok(ConsoleLogger {
            prefix: ctx.options::<LoggerOptions>()?.prefix,
            clock: ctx.get::<dyn Clock>()?,
        })
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("{} [{}] {message}", self.prefix, self.clock.now());
    }
}

bind!(ConsoleLogger => dyn Logger);

/// Decorator that drops empty messages before they reach the wrapped logger.
struct SkipEmpty {
    inner: Arc<dyn Logger>,
}

impl Service for SkipEmpty {}

impl Injectable for SkipEmpty {
    fn construct(ctx: &mut Resolution<'_>) -> Result<Self, ContainerError> {
        Ok(SkipEmpty {
            inner: ctx.get::<dyn Logger>()?,
        })
    }
}

impl Logger for SkipEmpty {
    fn log(&self, message: &str) {
        if !message.trim().is_empty() {
            self.inner.log(message);
        }
    }
}

bind!(SkipEmpty => dyn Logger);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== Service Wiring ===\n");

    let mut container = ServiceContainer::new();
    container.register_instance::<dyn Clock, FixedClock>(FixedClock(1_700_000_000))?;
    container
        .register_as::<dyn Logger, ConsoleLogger>()?
        .with_options(|| LoggerOptions {
            prefix: "app".to_string(),
        });
    container.register_decorator::<dyn Logger, SkipEmpty>()?;

    container.startup()?;
    println!("{container:?}\n");

    let logger = container.get::<dyn Logger>()?;
    logger.log("container started");
    logger.log("   ");
    logger.log("done");

    container.shutdown();
    println!("\n=== Example Complete ===");
    Ok(())
}
