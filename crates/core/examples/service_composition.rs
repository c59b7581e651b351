//! Example: composing services through consumer types
//!
//! A base worker type receives its settings from a configuration-backed
//! provider and declares an optional logger. A logging component mixes in
//! the provider of that logger, and a derived type overrides the tool set.
//! Run with `RUST_LOG=conduit_core=trace` to see resolution events.

use std::sync::{Arc, Mutex};

use conduit_core::{
    AsConsumer, Consumer, ConsumerType, CoreError, DependencyOptions, GlobalProviders, OneProvider,
    ProcessScopedProvider, ProviderConfig, ProviderOptions, Value,
};
use tracing_subscriber::EnvFilter;

const SETTINGS: &str = r#"
name: Settings
values:
  env: production
  application:
    name: conduit-demo
    tools:
      object_tools: [inspect, describe]
"#;

/// Logger service shared by every worker
#[derive(Default)]
struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogger {
    fn log(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.into());
        }
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

struct Worker {
    consumer: Consumer,
}

impl AsConsumer for Worker {
    fn as_consumer(&self) -> &Consumer {
        &self.consumer
    }
}

conduit_core::dependency_accessors!(Worker {
    env,
    tools,
    object_tools,
    logger => has_logger,
});

impl Worker {
    fn run(&self) -> Result<(), CoreError> {
        let logger = self
            .logger()?
            .and_then(|logger| logger.downcast::<MemoryLogger>());

        let message = format!(
            "env={:?} tools={:?} object_tools={:?}",
            self.env()?,
            self.tools()?,
            self.object_tools()?
        );

        match logger {
            Some(logger) => logger.log(message),
            None => println!("{}", message),
        }

        Ok(())
    }
}

fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = ProviderConfig::from_yaml_str(SETTINGS)?.build_provider()?;

    let logger = GlobalProviders::register(
        "logger",
        ProcessScopedProvider::new("logger", ProviderOptions::new())?,
    )?;

    let base = ConsumerType::builder("Worker")
        .dependency("env")?
        .dependency("application.tools.object_tools")?
        .with_dependency("tools", DependencyOptions::new().with_optional(true))?
        .with_dependency(
            "logger",
            DependencyOptions::new().with_optional(true).with_predicate(true),
        )?
        .with_provider(Arc::new(settings))
        .build();

    let logging = ConsumerType::builder("Logging")
        .with_dependency(
            "logger",
            DependencyOptions::new().with_optional(true).with_predicate(true),
        )?
        .with_provider(logger.clone())
        .build();

    let specialized = ConsumerType::builder("SpecializedWorker")
        .extends(&base)
        .include(&logging)
        .with_provider(Arc::new(OneProvider::with_value(
            "tools",
            "hammer",
            ProviderOptions::new(),
        )?))
        .build();

    let plain = Worker {
        consumer: Consumer::new(&base),
    };
    println!("plain worker logger available: {}", plain.has_logger()?);
    plain.run()?;

    let service = Arc::new(MemoryLogger::default());
    logger.write(Value::shared(service.clone()))?;

    let (consumer, remaining) = Consumer::with_parameters(
        &specialized,
        vec![("env", Value::from("staging")), ("retries", Value::from(3))],
    )?;
    let specialized_worker = Worker { consumer };

    println!("specialized worker logger available: {}", specialized_worker.has_logger()?);
    println!("unused parameters: {:?}", remaining);
    specialized_worker.run()?;

    for line in service.lines() {
        println!("logged: {}", line);
    }

    Ok(())
}
