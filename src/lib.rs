//! Runtime dependency injection driven by type names and explicit construction recipes.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! use ikebana::{params, shared, Container, ParamSpec, TypeRegistry, TypeSpec, WiringError};
//!
//! // Plain structs; nothing to derive or implement
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! struct App {
//!     greeter: Arc<Greeter>,
//! }
//!
//! # fn main() -> Result<(), WiringError> {
//! // Describe each type once: a public name, its constructor parameters,
//! // and a build closure receiving the resolved arguments
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     TypeSpec::new("demo.Greeter", |args| {
//!         Ok(shared(Greeter {
//!             greeting: args.string("greeting")?.to_string(),
//!         }))
//!     })
//!     .param(ParamSpec::value("greeting")),
//! )?;
//! registry.register(
//!     TypeSpec::new("demo.App", |args| {
//!         Ok(shared(App {
//!             greeter: args.instance("greeter")?,
//!         }))
//!     })
//!     .param(ParamSpec::object("greeter", "demo.Greeter")),
//! )?;
//!
//! // Configuration supplies the primitive parameters
//! let container = Container::new(registry);
//! container.register_config(params! {
//!     "demo.Greeter" => params! { "greeting" => "hello" },
//! })?;
//!
//! let app: Arc<App> = container.get_as("demo.App")?;
//! assert_eq!(app.greeter.greeting, "hello");
//!
//! // Shared instances are cached: the app's greeter *is* the greeter
//! let greeter: Arc<Greeter> = container.get_as("demo.Greeter")?;
//! assert!(Arc::ptr_eq(&app.greeter, &greeter));
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! A [TypeRegistry] maps type names to [TypeSpec] construction recipes.
//! Asking the [Container] for a name resolves the recipe's parameters in
//! declaration order: object parameters are auto-wired by recursively
//! resolving their declared type, while builtin parameters come from the
//! configuration overlay, where registered [ConfigMap] blocks are
//! deep-merged with call-site overrides and the overrides win. Non-unique results land in the
//! instance cache, so every consumer of a type name shares one instance;
//! [Container::get_unique] builds a fresh instance without touching the
//! cache for the requested type.
//!
//! The registry sits behind the [Introspect] trait, so a different source
//! of type descriptions can be plugged in through
//! [Container::with_introspector]. Configuration stays open until the
//! first resolution of any kind, then locks for the container's lifetime.
//! A process that wants one well-known container installs a handle via
//! [global].

mod config;
mod container;
mod error;
mod registry;
mod resolve;
mod value;

pub mod global;

pub use config::CONFIG_FILE;
pub use container::Container;
pub use error::WiringError;
pub use registry::{
    shared, Arg, Args, BuildError, Capability, Instance, Introspect, ParamKind, ParamSpec,
    TypeRegistry, TypeSpec,
};
pub use value::{merge_map, ConfigMap, ConfigValue};
