use std::{sync::Arc, time::SystemTime};

use ikebana::*;

// Regular application types, unaware of the container

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}

struct ConsoleLogger {
    prefix: String,
}

impl Logger for ConsoleLogger {
    fn log(&self, content: &str) {
        println!("{} {}", self.prefix, content);
    }
}

struct DateLogger {
    logger: Arc<ConsoleLogger>,
}

impl DateLogger {
    fn log_date(&self) {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap();
        self.logger.log(&format!("{}s since epoch", now.as_secs()));
    }
}

// Describe both types to the container

fn registry() -> Result<TypeRegistry, WiringError> {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeSpec::new("demo.Logger", |args| {
            Ok(shared(ConsoleLogger {
                prefix: args.opt_string("prefix").unwrap_or("[demo]").to_string(),
            }))
        })
        .param(ParamSpec::value("prefix").optional())
        .provides(Capability::of::<dyn Logger>()),
    )?;
    registry.register(
        TypeSpec::new("demo.DateLogger", |args| {
            Ok(shared(DateLogger {
                logger: args.instance("logger")?,
            }))
        })
        .param(ParamSpec::object("logger", "demo.Logger")),
    )?;
    Ok(registry)
}

fn main() -> Result<(), WiringError> {
    let container = Container::new(registry()?);
    container.register_config(params! {
        "demo.Logger" => params! { "prefix" => "[clock]" },
    })?;

    // Resolving the date logger auto-wires and caches the logger it needs.
    let date_logger: Arc<DateLogger> = container.get_as("demo.DateLogger")?;
    date_logger.log_date();

    let logger: Arc<ConsoleLogger> = container.get_as("demo.Logger")?;
    assert!(Arc::ptr_eq(&date_logger.logger, &logger));

    // A unique resolution builds a fresh logger with its own settings.
    let loud: Arc<ConsoleLogger> =
        container.get_unique_as("demo.Logger", params! { "prefix" => "[loud]" })?;
    loud.log("fresh instance, never cached");

    Ok(())
}
