//! The recursive resolution algorithm.
//!
//! Resolution walks the constructor parameters of the requested type in
//! declaration order. A parameter is filled from the first matching source:
//! the container itself for self-injection parameters, the effective
//! parameter map (stored configuration deep-merged under call-site
//! overrides, overrides last), auto-wiring through a nested resolution for
//! object parameters with no configured value, or the build closure's own
//! default for an omitted optional parameter. Nested resolutions are never
//! unique: the unique flag applies to the requested type only, so shared
//! dependencies stay shared below a unique request.

use tracing::{debug, trace};

use crate::container::Container;
use crate::error::WiringError;
use crate::registry::{Arg, Args, Instance, ParamKind};
use crate::value::{merge_map, ConfigMap};

/// One resolution walk.
///
/// Tracks the chain of type names currently being constructed so a cyclic
/// dependency graph fails fast instead of recursing without bound.
pub(crate) struct Resolver<'c> {
    container: &'c Container,
    chain: Vec<String>,
}

impl<'c> Resolver<'c> {
    pub fn new(container: &'c Container) -> Self {
        Self {
            container,
            chain: Vec::new(),
        }
    }

    pub fn resolve(
        &mut self,
        type_name: &str,
        overrides: ConfigMap,
        unique: bool,
    ) -> Result<Instance, WiringError> {
        let container = self.container;

        // one-way latch, set even when the resolution fails below
        container.lock_configs();

        if self.chain.iter().any(|open| open == type_name) {
            let mut chain = self.chain.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(type_name);
            return Err(WiringError::CyclicResolution { chain });
        }

        if !container.introspector().exists(type_name) {
            return Err(WiringError::UnknownType(type_name.to_string()));
        }

        // overrides merged last so call-site values win over configuration
        let mut effective = container.config_for(type_name);
        merge_map(&mut effective, overrides);

        debug!("resolving `{}` (unique: {})", type_name, unique);
        self.chain.push(type_name.to_string());
        let result = self.construct(type_name, &effective, unique);
        self.chain.pop();
        result
    }

    fn construct(
        &mut self,
        type_name: &str,
        effective: &ConfigMap,
        unique: bool,
    ) -> Result<Instance, WiringError> {
        let container = self.container;
        let mut args = Args::default();
        for param in container.introspector().parameters(type_name) {
            match param.kind() {
                ParamKind::Container => {
                    trace!("supplying the container itself for `{}`", param.name());
                    args.push(param.name(), Arg::Container(container.clone()));
                }
                ParamKind::Object(dep) if !effective.contains_key(param.name()) => {
                    trace!("auto-wiring `{}` from `{}`", param.name(), dep);
                    let instance = self.nested(dep, unique)?;
                    args.push(param.name(), Arg::Instance(instance));
                }
                _ => match effective.get(param.name()) {
                    Some(value) => {
                        trace!("using configured value for `{}`", param.name());
                        args.push(param.name(), Arg::Value(value.clone()));
                    }
                    None if param.is_optional() => {
                        trace!("omitting optional `{}`", param.name());
                    }
                    None => {
                        return Err(WiringError::MissingParameter {
                            type_name: type_name.to_string(),
                            param: param.name().to_string(),
                        });
                    }
                },
            }
        }
        container
            .introspector()
            .construct(type_name, &args)
            .map_err(|source| WiringError::ConstructionFailed {
                type_name: type_name.to_string(),
                source,
            })
    }

    /// Resolve an object parameter's dependency.
    ///
    /// A unique outer call bypasses the cache for its direct dependencies;
    /// the nested call itself is never unique, so deeper dependencies go
    /// through the cache as usual. The cache write happens as soon as the
    /// nested resolution succeeds and is kept even when the outer
    /// construction fails afterwards.
    fn nested(&mut self, dep: &str, outer_unique: bool) -> Result<Instance, WiringError> {
        if !outer_unique {
            if let Some(cached) = self.container.cached(dep) {
                trace!("reusing cached `{}`", dep);
                return Ok(cached);
            }
        }
        let instance = self.resolve(dep, ConfigMap::new(), false)?;
        if !outer_unique {
            self.container.cache(dep, instance.clone());
        }
        Ok(instance)
    }
}
