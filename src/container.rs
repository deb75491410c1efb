//! The container facade: configuration overlay, instance cache, and the
//! public resolution operations.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::config::{load_config_file, ConfigStore};
use crate::error::WiringError;
use crate::registry::{Capability, Instance, Introspect, TypeRegistry};
use crate::resolve::Resolver;
use crate::value::ConfigMap;

struct Inner {
    root: Option<PathBuf>,
    introspector: Arc<dyn Introspect>,
    config: RwLock<ConfigStore>,
    cache: Mutex<BTreeMap<String, Instance>>,
    locked: AtomicBool,
}

/// Handle to one dependency-injection context.
///
/// Cloning is cheap and clones share all state; equality is handle
/// identity, so a self-injected handle compares equal to the container it
/// came from. A process that wants a single well-known container installs
/// one through [crate::global].
///
/// The configuration overlay is open until the first resolution of any
/// kind; from then on [Container::register_config] fails with
/// [WiringError::ConfigsLocked], permanently.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// Container over a registry, without a root directory.
    pub fn new(registry: TypeRegistry) -> Self {
        Self::build(Arc::new(registry), None)
    }

    /// Container over any implementation of the introspection contract.
    pub fn with_introspector(introspector: Arc<dyn Introspect>) -> Self {
        Self::build(introspector, None)
    }

    /// Container rooted at a directory.
    ///
    /// When [crate::CONFIG_FILE] exists directly under `root`, its content
    /// is registered as the initial configuration block.
    pub fn init(registry: TypeRegistry, root: impl Into<PathBuf>) -> Result<Self, WiringError> {
        let root = root.into();
        let block = load_config_file(&root)?;
        let container = Self::build(Arc::new(registry), Some(root));
        if !block.is_empty() {
            container.register_config(block)?;
        }
        Ok(container)
    }

    fn build(introspector: Arc<dyn Introspect>, root: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                root,
                introspector,
                config: RwLock::new(ConfigStore::default()),
                cache: Mutex::new(BTreeMap::new()),
                locked: AtomicBool::new(false),
            }),
        }
    }

    /// The root directory this container was initialized with.
    pub fn root(&self) -> Option<&Path> {
        self.inner.root.as_deref()
    }

    /// Register a configuration block, deep-merging it into the store.
    pub fn register_config(&self, block: ConfigMap) -> Result<(), WiringError> {
        if self.is_locked() {
            return Err(WiringError::ConfigsLocked);
        }
        let entries = block.len();
        self.inner.config.write().unwrap().register(block);
        debug!("registered configuration block ({} entries)", entries);
        Ok(())
    }

    /// Snapshot of the merged configuration.
    pub fn config(&self) -> ConfigMap {
        self.inner.config.read().unwrap().snapshot()
    }

    /// Shared instance of `type_name`: resolved and cached on the first
    /// call, the cached instance on every call after that.
    pub fn get(&self, type_name: &str) -> Result<Instance, WiringError> {
        if let Some(cached) = self.cached(type_name) {
            return Ok(cached);
        }
        let instance = Resolver::new(self).resolve(type_name, ConfigMap::new(), false)?;
        self.cache(type_name, instance.clone());
        Ok(instance)
    }

    /// Shared instance downcast to its concrete type.
    pub fn get_as<T: Any + Send + Sync>(&self, type_name: &str) -> Result<Arc<T>, WiringError> {
        downcast(self.get(type_name)?, type_name)
    }

    /// Fresh instance, never read from or written to the cache, with
    /// call-site overrides taking precedence over stored configuration.
    ///
    /// Only the requested type is forced fresh: its direct dependencies
    /// are rebuilt without touching the cache, while deeper dependencies
    /// resolve through the cache as usual.
    pub fn get_unique(
        &self,
        type_name: &str,
        overrides: ConfigMap,
    ) -> Result<Instance, WiringError> {
        Resolver::new(self).resolve(type_name, overrides, true)
    }

    /// Fresh instance downcast to its concrete type.
    pub fn get_unique_as<T: Any + Send + Sync>(
        &self,
        type_name: &str,
        overrides: ConfigMap,
    ) -> Result<Arc<T>, WiringError> {
        downcast(self.get_unique(type_name, overrides)?, type_name)
    }

    /// Resolve several shared instances at once, preserving the callers'
    /// keys.
    ///
    /// Entries resolve in input order through [Container::get]. With
    /// `expected`, every resolved instance must satisfy the capability or
    /// the call fails with [WiringError::UnexpectedType]; instances cached
    /// by earlier entries stay cached. The returned map iterates in key
    /// order, not input order.
    pub fn get_many(
        &self,
        entries: &[(&str, &str)],
        expected: Option<&Capability>,
    ) -> Result<BTreeMap<String, Instance>, WiringError> {
        let mut resolved = BTreeMap::new();
        for (key, type_name) in entries {
            let instance = self.get(type_name)?;
            if let Some(capability) = expected {
                if !self.satisfies(type_name, &instance, capability) {
                    return Err(WiringError::UnexpectedType {
                        type_name: type_name.to_string(),
                        capability: capability.name().to_string(),
                    });
                }
            }
            resolved.insert(key.to_string(), instance);
        }
        Ok(resolved)
    }

    fn satisfies(&self, type_name: &str, instance: &Instance, capability: &Capability) -> bool {
        capability.matches(instance)
            || self
                .inner
                .introspector
                .capabilities(type_name)
                .contains(capability)
    }

    /// Debugging snapshot of the instance cache.
    pub fn cache_snapshot(&self) -> BTreeMap<String, Instance> {
        self.inner.cache.lock().unwrap().clone()
    }

    /// Has any resolution locked the configuration yet?
    pub fn is_locked(&self) -> bool {
        self.inner.locked.load(Ordering::Relaxed)
    }

    pub(crate) fn introspector(&self) -> &dyn Introspect {
        self.inner.introspector.as_ref()
    }

    pub(crate) fn lock_configs(&self) {
        self.inner.locked.store(true, Ordering::Relaxed);
    }

    pub(crate) fn config_for(&self, type_name: &str) -> ConfigMap {
        self.inner.config.read().unwrap().for_type(type_name)
    }

    // The cache lock is scoped to one lookup or one insert and is never
    // held across a nested resolution.

    pub(crate) fn cached(&self, type_name: &str) -> Option<Instance> {
        self.inner.cache.lock().unwrap().get(type_name).cloned()
    }

    pub(crate) fn cache(&self, type_name: &str, instance: Instance) {
        debug!("caching `{}`", type_name);
        self.inner
            .cache
            .lock()
            .unwrap()
            .insert(type_name.to_string(), instance);
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Container {}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("root", &self.inner.root)
            .field("locked", &self.is_locked())
            .field("cached", &self.inner.cache.lock().unwrap().len())
            .finish()
    }
}

fn downcast<T: Any + Send + Sync>(
    instance: Instance,
    type_name: &str,
) -> Result<Arc<T>, WiringError> {
    instance
        .downcast::<T>()
        .map_err(|_| WiringError::UnexpectedType {
            type_name: type_name.to_string(),
            capability: std::any::type_name::<T>().to_string(),
        })
}
