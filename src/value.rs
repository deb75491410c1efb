//! Tagged configuration values and the recursive merge rule.
//!
//! Configuration blocks, call-site overrides, and the merged store are all
//! trees of [ConfigValue]. A single rule governs how trees combine, applied
//! when blocks are registered and again when call-site overrides are laid
//! over stored configuration: maps merge key by key, anything else is
//! replaced by the newer value.

use std::collections::BTreeMap;

/// Ordered mapping from names to configuration values.
///
/// Used both for whole configuration blocks (type name to parameter map)
/// and for the per-type parameter maps themselves.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A configuration value: a scalar, a list, or a nested map.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Map(ConfigMap),
}

impl ConfigValue {
    /// Merge `incoming` into `self`.
    ///
    /// When both sides are maps the merge recurses key by key. In every
    /// other combination the incoming value replaces the existing one;
    /// lists are replaced wholesale, never concatenated.
    pub fn merge(&mut self, incoming: ConfigValue) {
        match (self, incoming) {
            (ConfigValue::Map(base), ConfigValue::Map(new)) => merge_map(base, new),
            (slot, incoming) => *slot = incoming,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric accessor; integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(value) => Some(*value),
            ConfigValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Merge `incoming` into `base`, key by key, with [ConfigValue::merge]
/// deciding collisions.
pub fn merge_map(base: &mut ConfigMap, incoming: ConfigMap) {
    for (key, value) in incoming {
        match base.get_mut(&key) {
            Some(slot) => slot.merge(value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Int(value.into())
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(map: ConfigMap) -> Self {
        ConfigValue::Map(map)
    }
}

/// Build a [ConfigMap] literal.
///
/// Values are anything convertible into a [ConfigValue], including a nested
/// `params!` block:
///
/// ```
/// use ikebana::params;
///
/// let block = params! {
///     "fleet.Truck" => params! { "plate" => "AB-123", "axles" => 3 },
/// };
/// assert!(block.contains_key("fleet.Truck"));
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::ConfigMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ConfigMap::new();
        $( map.insert(String::from($key), $crate::ConfigValue::from($value)); )+
        map
    }};
}
