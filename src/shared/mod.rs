//! Named shared values.
//!
//! A `VariableRegistry` maps names to values that several threads read and
//! update. Like topics, every value type has its own namespace, so
//! `"limit"` as `u32` and `"limit"` as `String` are distinct entries.
//!
//! Values are handed out as [`Shared<T>`] (`Arc<RwLock<T>>`); the registry
//! only guards the directory, each value carries its own lock.
//!
//! This facility is independent of the topic system.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::utils::error::{BusError, Result};

/// A named value shared between threads.
pub type Shared<T> = Arc<RwLock<T>>;

type VariableKey = (TypeId, String);
type VariableMap = HashMap<VariableKey, Arc<dyn Any + Send + Sync>>;

static GLOBAL: Lazy<VariableRegistry> = Lazy::new(VariableRegistry::new);

/// Directory of named shared values.
///
/// # Example
///
/// ```rust
/// use topicbus::shared::VariableRegistry;
///
/// let registry = VariableRegistry::new();
/// let greeting = registry.create("greeting", String::from("123")).unwrap();
///
/// if let Ok(found) = registry.find::<String>("greeting") {
///     *found.write() = "666".to_string();
/// }
/// assert_eq!(*greeting.read(), "666");
///
/// assert!(registry.create("greeting", String::new()).is_err());
/// assert!(registry.find::<String>("missing").is_err());
/// ```
#[derive(Default)]
pub struct VariableRegistry {
    values: Mutex<VariableMap>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static VariableRegistry {
        &GLOBAL
    }

    /// Registers `value` under `name`.
    ///
    /// Fails with [`BusError::AlreadyExists`] if `name` is taken for `T`.
    pub fn create<T>(&self, name: &str, value: T) -> Result<Shared<T>>
    where
        T: Send + Sync + 'static,
    {
        let mut values = self.values.lock();
        if values.contains_key(&Self::key::<T>(name)) {
            return Err(BusError::variable_exists(name));
        }
        Ok(Self::insert_locked(&mut values, name, value))
    }

    /// Looks up `name` for `T`.
    pub fn find<T>(&self, name: &str) -> Result<Shared<T>>
    where
        T: Send + Sync + 'static,
    {
        let values = self.values.lock();
        Self::find_locked(&values, name).ok_or_else(|| BusError::variable_not_found(name))
    }

    /// Returns the value registered under `name`, registering `value` first if
    /// there is none.
    pub fn find_or_create<T>(&self, name: &str, value: T) -> Shared<T>
    where
        T: Send + Sync + 'static,
    {
        self.find_or_create_with(name, || value)
    }

    /// Like [`VariableRegistry::find_or_create`], but `init` only runs when the
    /// value has to be created. It runs with the directory locked and must not
    /// call back into this registry.
    pub fn find_or_create_with<T, F>(&self, name: &str, init: F) -> Shared<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let mut values = self.values.lock();
        match Self::find_locked(&values, name) {
            Some(existing) => existing,
            None => Self::insert_locked(&mut values, name, init()),
        }
    }

    /// Names registered for `T`, sorted.
    pub fn names<T>(&self) -> Vec<String>
    where
        T: Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let mut names: Vec<String> = self
            .values
            .lock()
            .keys()
            .filter(|(id, _)| *id == type_id)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Forgets `name` for `T`. Handles already given out stay valid.
    pub fn remove<T>(&self, name: &str) -> bool
    where
        T: Send + Sync + 'static,
    {
        let removed = self.values.lock().remove(&Self::key::<T>(name)).is_some();
        if removed {
            debug!(variable = name, "shared variable removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key<T: 'static>(name: &str) -> VariableKey {
        (TypeId::of::<T>(), name.to_string())
    }

    fn find_locked<T>(values: &VariableMap, name: &str) -> Option<Shared<T>>
    where
        T: Send + Sync + 'static,
    {
        values
            .get(&Self::key::<T>(name))
            .and_then(|entry| entry.clone().downcast::<RwLock<T>>().ok())
    }

    fn insert_locked<T>(values: &mut VariableMap, name: &str, value: T) -> Shared<T>
    where
        T: Send + Sync + 'static,
    {
        let shared = Arc::new(RwLock::new(value));
        values.insert(Self::key::<T>(name), shared.clone());
        debug!(
            variable = name,
            value_type = std::any::type_name::<T>(),
            "shared variable created"
        );
        shared
    }
}

impl std::fmt::Debug for VariableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableRegistry")
            .field("values", &self.len())
            .finish()
    }
}
