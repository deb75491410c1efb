//! Type descriptors, construction recipes, and the registry behind the
//! introspection contract.
//!
//! The resolver never inspects Rust types at runtime: every constructible
//! type is registered up front as a [TypeSpec] holding a public name, an
//! ordered list of constructor parameters, and a build closure receiving
//! the resolved [Args]. The [Introspect] trait is the seam between the resolver
//! and this metadata, so an alternative source of type descriptions can be
//! plugged into a container in place of [TypeRegistry].

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::container::Container;
use crate::error::WiringError;
use crate::value::{ConfigMap, ConfigValue};

/// A constructed instance with shared ownership.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wrap a value for storage and sharing through the container.
pub fn shared<T: Any + Send + Sync>(value: T) -> Instance {
    Arc::new(value)
}

/// Failure raised by a build closure or by argument extraction.
///
/// Surfaced to callers wrapped in [WiringError::ConstructionFailed], with
/// the original message preserved.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct BuildError {
    message: String,
}

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for BuildError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for BuildError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// How a constructor parameter is filled in.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// A builtin or untyped parameter: it must come from configuration or
    /// call-site overrides and is never auto-wired.
    Value,
    /// An object parameter naming the type to auto-wire unless a
    /// configured value shadows it.
    Object(String),
    /// The resolving container itself is supplied.
    Container,
}

/// One constructor parameter: name, kind, optionality.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: String,
    kind: ParamKind,
    optional: bool,
}

impl ParamSpec {
    /// A builtin or untyped parameter.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Value,
            optional: false,
        }
    }

    /// An object parameter auto-wired from `type_name` unless overridden.
    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Object(type_name.into()),
            optional: false,
        }
    }

    /// A parameter receiving the resolving container itself.
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Container,
            optional: false,
        }
    }

    /// Mark the parameter optional: when no value is available the
    /// argument is omitted and the build closure applies its own default.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Identifies a trait or concrete type for expected-capability checks.
///
/// An instance satisfies a capability when its concrete type matches
/// directly, or when the descriptor it was resolved from declares the
/// capability via [TypeSpec::provides].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    id: TypeId,
    name: &'static str,
}

impl Capability {
    /// Capability of a concrete type or of a trait object type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Does the instance's concrete type match this capability directly?
    pub fn matches(&self, instance: &Instance) -> bool {
        instance.as_ref().type_id() == self.id
    }
}

/// An argument resolved for one constructor parameter.
#[derive(Clone)]
pub enum Arg {
    /// A configured or call-site value.
    Value(ConfigValue),
    /// An auto-wired dependency instance.
    Instance(Instance),
    /// The resolving container (self-injection).
    Container(Container),
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Arg::Instance(_) => f.write_str("Instance(..)"),
            Arg::Container(_) => f.write_str("Container(..)"),
        }
    }
}

/// Ordered, name-keyed arguments handed to a build closure.
///
/// Optional parameters without a value are absent entirely, letting the
/// closure apply its own default.
#[derive(Debug, Default)]
pub struct Args {
    values: Vec<(String, Arg)>,
}

impl Args {
    pub(crate) fn push(&mut self, name: impl Into<String>, arg: Arg) {
        self.values.push((name.into(), arg));
    }

    /// All arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.values.iter().map(|(name, arg)| (name.as_str(), arg))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, arg)| arg)
    }

    /// The auto-wired instance for `name`, downcast to its concrete type.
    pub fn instance<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, BuildError> {
        match self.get(name) {
            Some(Arg::Instance(instance)) => instance.clone().downcast::<T>().map_err(|_| {
                mismatch(name, std::any::type_name::<T>())
            }),
            Some(_) => Err(mismatch(name, "an instance")),
            None => Err(missing(name)),
        }
    }

    /// The container handle supplied for a self-injection parameter.
    pub fn container(&self, name: &str) -> Result<Container, BuildError> {
        match self.get(name) {
            Some(Arg::Container(container)) => Ok(container.clone()),
            Some(_) => Err(mismatch(name, "the container")),
            None => Err(missing(name)),
        }
    }

    /// The configured value for `name`, whatever its variant.
    pub fn value(&self, name: &str) -> Result<&ConfigValue, BuildError> {
        match self.get(name) {
            Some(Arg::Value(value)) => Ok(value),
            Some(_) => Err(mismatch(name, "a configured value")),
            None => Err(missing(name)),
        }
    }

    pub fn opt_value(&self, name: &str) -> Option<&ConfigValue> {
        match self.get(name) {
            Some(Arg::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, BuildError> {
        self.value(name)?
            .as_str()
            .ok_or_else(|| mismatch(name, "a string"))
    }

    pub fn integer(&self, name: &str) -> Result<i64, BuildError> {
        self.value(name)?
            .as_int()
            .ok_or_else(|| mismatch(name, "an integer"))
    }

    pub fn float(&self, name: &str) -> Result<f64, BuildError> {
        self.value(name)?
            .as_float()
            .ok_or_else(|| mismatch(name, "a number"))
    }

    pub fn boolean(&self, name: &str) -> Result<bool, BuildError> {
        self.value(name)?
            .as_bool()
            .ok_or_else(|| mismatch(name, "a boolean"))
    }

    pub fn list(&self, name: &str) -> Result<&[ConfigValue], BuildError> {
        self.value(name)?
            .as_list()
            .ok_or_else(|| mismatch(name, "a list"))
    }

    pub fn map(&self, name: &str) -> Result<&ConfigMap, BuildError> {
        self.value(name)?
            .as_map()
            .ok_or_else(|| mismatch(name, "a map"))
    }

    pub fn opt_string(&self, name: &str) -> Option<&str> {
        self.opt_value(name)?.as_str()
    }

    pub fn opt_integer(&self, name: &str) -> Option<i64> {
        self.opt_value(name)?.as_int()
    }

    pub fn opt_float(&self, name: &str) -> Option<f64> {
        self.opt_value(name)?.as_float()
    }

    pub fn opt_boolean(&self, name: &str) -> Option<bool> {
        self.opt_value(name)?.as_bool()
    }
}

fn missing(name: &str) -> BuildError {
    BuildError::new(format!("missing argument `{}`", name))
}

fn mismatch(name: &str, expected: &str) -> BuildError {
    BuildError::new(format!("argument `{}` is not {}", name, expected))
}

type BuildFn = Box<dyn Fn(&Args) -> Result<Instance, BuildError> + Send + Sync>;

/// The construction recipe for one registered type.
///
/// Declaration order of [ParamSpec]s is the order arguments are resolved
/// in; the build closure receives them as [Args] and returns the shared
/// instance. Default values for optional parameters belong in the closure.
pub struct TypeSpec {
    name: String,
    params: Vec<ParamSpec>,
    capabilities: Vec<Capability>,
    build: BuildFn,
}

impl TypeSpec {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&Args) -> Result<Instance, BuildError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            capabilities: Vec::new(),
            build: Box::new(build),
        }
    }

    /// Append a constructor parameter; declaration order is preserved.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Declare a capability the constructed instances provide.
    pub fn provides(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Contract between the resolver and the source of type descriptions.
///
/// [TypeRegistry] is the standard implementation; anything answering these
/// four questions can be handed to
/// [Container::with_introspector](crate::Container::with_introspector).
pub trait Introspect: Send + Sync {
    /// Is the type name known at all?
    fn exists(&self, type_name: &str) -> bool;

    /// Ordered constructor parameters; empty for unknown names and for
    /// types without parameters.
    fn parameters(&self, type_name: &str) -> Vec<ParamSpec>;

    /// Capabilities declared for the type name.
    fn capabilities(&self, type_name: &str) -> Vec<Capability>;

    /// Construct an instance from resolved arguments.
    fn construct(&self, type_name: &str, args: &Args) -> Result<Instance, BuildError>;
}

/// Explicit mapping from type names to construction recipes.
#[derive(Default)]
pub struct TypeRegistry {
    specs: BTreeMap<String, TypeSpec>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe; the name must not be taken yet.
    pub fn register(&mut self, spec: TypeSpec) -> Result<(), WiringError> {
        if self.specs.contains_key(spec.name()) {
            return Err(WiringError::DuplicateType(spec.name().to_string()));
        }
        self.specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.specs.contains_key(type_name)
    }

    /// Registered names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

impl Introspect for TypeRegistry {
    fn exists(&self, type_name: &str) -> bool {
        self.specs.contains_key(type_name)
    }

    fn parameters(&self, type_name: &str) -> Vec<ParamSpec> {
        self.specs
            .get(type_name)
            .map(|spec| spec.params.clone())
            .unwrap_or_default()
    }

    fn capabilities(&self, type_name: &str) -> Vec<Capability> {
        self.specs
            .get(type_name)
            .map(|spec| spec.capabilities.clone())
            .unwrap_or_default()
    }

    fn construct(&self, type_name: &str, args: &Args) -> Result<Instance, BuildError> {
        let spec = self
            .specs
            .get(type_name)
            .ok_or_else(|| BuildError::new(format!("no recipe for `{}`", type_name)))?;
        (spec.build)(args)
    }
}
