//! Deserializer registries.
//!
//! Each registry holds two maps: `(namespace, localName) → TypeKey` and
//! `TypeKey → deserializer`. Built-in bindings install lazily on first use
//! under the same lock that guards vendor registration, so a half-seeded
//! table is never observable. `clear_all` drops everything (vendor bindings
//! included) and re-arms the lazy seed.
//!
//! `unregister` removes only the deserializer binding and deliberately
//! leaves the name→type binding intact, keeping type resolution stable
//! across re-registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dictionary::{Dictionary, ElementEntry};
use crate::element::{AttributeReader, ChildNode};
use crate::error::CodecError;
use crate::item::CborItem;
use crate::names;

/// Explicit discriminant identifying one target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey(pub &'static str);

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Everything a deserializer gets to work with: the untouched attribute and
/// children slots plus the element's dictionary entry, or `None` when the
/// wire pair did not resolve (deserializers must tolerate a missing scope).
pub struct DeserializeInput<'a, 'd> {
    pub attrs: &'a [CborItem],
    pub children: &'a [CborItem],
    pub entry: Option<&'d ElementEntry>,
    pub dict: Option<&'d Dictionary>,
}

impl<'a, 'd> DeserializeInput<'a, 'd> {
    pub fn attributes(&self) -> Result<AttributeReader<'a, 'd>, CodecError> {
        AttributeReader::parse(self.attrs, self.entry)
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = Result<ChildNode<'a, 'd>, CodecError>> {
        let children: &'a [CborItem] = self.children;
        let entry = self.entry;
        children
            .iter()
            .map(move |tuple| crate::element::parse_child(tuple, entry))
    }
}

pub type Deserializer<T> =
    Box<dyn for<'a, 'd> Fn(&DeserializeInput<'a, 'd>) -> Result<T, CodecError> + Send + Sync>;

/// Mutable registry state; seeds populate it through [`RegistryState::bind`].
pub struct RegistryState<T> {
    seeded: bool,
    targets: HashMap<(String, String), TypeKey>,
    constructors: HashMap<TypeKey, Deserializer<T>>,
}

impl<T> RegistryState<T> {
    pub(crate) fn bind(
        &mut self,
        target: TypeKey,
        namespace: &str,
        local_name: &str,
        deserializer: Deserializer<T>,
    ) {
        self.targets
            .insert((namespace.to_owned(), local_name.to_owned()), target);
        self.constructors.insert(target, deserializer);
    }
}

type SeedFn<T> = fn(&mut RegistryState<T>);

pub struct DeserializerRegistry<T> {
    state: RwLock<RegistryState<T>>,
    seed: SeedFn<T>,
}

fn read_lock<T>(lock: &RwLock<RegistryState<T>>) -> RwLockReadGuard<'_, RegistryState<T>> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<RegistryState<T>>) -> RwLockWriteGuard<'_, RegistryState<T>> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<T> DeserializerRegistry<T> {
    pub(crate) fn with_seed(seed: SeedFn<T>) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                seeded: false,
                targets: HashMap::new(),
                constructors: HashMap::new(),
            }),
            seed,
        }
    }

    fn with_seeded<R>(&self, f: impl FnOnce(&RegistryState<T>) -> R) -> R {
        {
            let guard = read_lock(&self.state);
            if guard.seeded {
                return f(&guard);
            }
        }
        {
            let mut guard = write_lock(&self.state);
            if !guard.seeded {
                (self.seed)(&mut guard);
                guard.seeded = true;
            }
        }
        f(&read_lock(&self.state))
    }

    /// Bind a vendor deserializer. All arguments must be non-blank; a
    /// duplicate target type is rejected with no observable mutation.
    pub fn register(
        &self,
        target: TypeKey,
        namespace: &str,
        local_name: &str,
        deserializer: Deserializer<T>,
    ) -> Result<(), CodecError> {
        if target.0.trim().is_empty() {
            return Err(CodecError::MissingRequiredValue("target type key"));
        }
        if namespace.trim().is_empty() {
            return Err(CodecError::MissingRequiredValue("namespace"));
        }
        if local_name.trim().is_empty() {
            return Err(CodecError::MissingRequiredValue("local name"));
        }
        let mut guard = write_lock(&self.state);
        if !guard.seeded {
            (self.seed)(&mut guard);
            guard.seeded = true;
        }
        if guard.constructors.contains_key(&target) {
            return Err(CodecError::AlreadyBound(target));
        }
        guard.bind(target, namespace, local_name, deserializer);
        Ok(())
    }

    /// Remove the deserializer bound to `target`, keeping the name→type
    /// binding. Returns whether a deserializer was removed.
    pub fn unregister(&self, target: TypeKey) -> bool {
        let mut guard = write_lock(&self.state);
        if !guard.seeded {
            (self.seed)(&mut guard);
            guard.seeded = true;
        }
        guard.constructors.remove(&target).is_some()
    }

    /// Drop every binding and re-arm the lazy built-in seed.
    pub fn clear_all(&self) {
        let mut guard = write_lock(&self.state);
        guard.targets.clear();
        guard.constructors.clear();
        guard.seeded = false;
    }

    /// Pure key lookup: which target type owns `(namespace, localName)`?
    pub fn resolve_target_class(&self, namespace: &str, local_name: &str) -> Option<TypeKey> {
        self.with_seeded(|state| {
            state
                .targets
                .get(&(namespace.to_owned(), local_name.to_owned()))
                .copied()
        })
    }

    /// Rebuild a typed object from the wire slots of one element.
    ///
    /// The dictionary element entry for `(ns_item, name_item)` is resolved
    /// reverse-then-forward; an unresolvable pair is passed through as
    /// `None`. Failures inside the bound deserializer are rewrapped into
    /// `DeserializationFailed` with the cause preserved.
    pub fn deserialize(
        &self,
        dict: Option<&Dictionary>,
        ns_item: &CborItem,
        name_item: &CborItem,
        attrs: &[CborItem],
        children: &[CborItem],
        target: TypeKey,
    ) -> Result<T, CodecError> {
        let entry = names::resolve_element_entry(dict, ns_item, name_item);
        let input = DeserializeInput {
            attrs,
            children,
            entry,
            dict,
        };
        self.with_seeded(|state| {
            let deserializer = state
                .constructors
                .get(&target)
                .ok_or(CodecError::UnsupportedType(target))?;
            deserializer(&input).map_err(|cause| CodecError::DeserializationFailed {
                name: target.to_string(),
                source: Box::new(cause),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILT_IN: TypeKey = TypeKey("built-in");
    const VENDOR: TypeKey = TypeKey("vendor");

    fn seed(state: &mut RegistryState<String>) {
        state.bind(BUILT_IN, "urn:test", "built-in", Box::new(|_| Ok("built-in".to_owned())));
    }

    fn registry() -> DeserializerRegistry<String> {
        DeserializerRegistry::with_seed(seed)
    }

    fn run(reg: &DeserializerRegistry<String>, target: TypeKey) -> Result<String, CodecError> {
        reg.deserialize(None, &CborItem::text("urn:test"), &CborItem::text("built-in"), &[], &[], target)
    }

    #[test]
    fn lazy_seed_installs_built_ins_on_first_use() {
        let reg = registry();
        assert_eq!(reg.resolve_target_class("urn:test", "built-in"), Some(BUILT_IN));
        assert_eq!(run(&reg, BUILT_IN).expect("seeded"), "built-in");
    }

    #[test]
    fn duplicate_target_is_rejected_without_mutation() {
        let reg = registry();
        reg.register(VENDOR, "urn:v", "thing", Box::new(|_| Ok("v1".to_owned())))
            .expect("first registration");
        let err = reg
            .register(VENDOR, "urn:v", "other-thing", Box::new(|_| Ok("v2".to_owned())))
            .unwrap_err();
        assert!(matches!(err, CodecError::AlreadyBound(k) if k == VENDOR));
        // The failed call left the original binding in place.
        assert_eq!(reg.resolve_target_class("urn:v", "thing"), Some(VENDOR));
        assert_eq!(reg.resolve_target_class("urn:v", "other-thing"), None);
    }

    #[test]
    fn blank_arguments_fail_before_mutation() {
        let reg = registry();
        let err = reg
            .register(TypeKey("  "), "urn:v", "thing", Box::new(|_| Ok(String::new())))
            .unwrap_err();
        assert!(matches!(err, CodecError::MissingRequiredValue(_)));
        let err = reg
            .register(VENDOR, "", "thing", Box::new(|_| Ok(String::new())))
            .unwrap_err();
        assert!(matches!(err, CodecError::MissingRequiredValue(_)));
        assert_eq!(reg.resolve_target_class("urn:v", "thing"), None);
    }

    #[test]
    fn unsupported_type_fails_cleanly() {
        let reg = registry();
        let err = run(&reg, TypeKey("nobody")).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedType(_)));
    }

    #[test]
    fn unregister_keeps_the_resolve_key() {
        let reg = registry();
        reg.register(VENDOR, "urn:v", "thing", Box::new(|_| Ok("v".to_owned())))
            .expect("register");
        assert!(reg.unregister(VENDOR));
        assert!(!reg.unregister(VENDOR));
        // Resolution stays stable; only the constructor is gone.
        assert_eq!(reg.resolve_target_class("urn:v", "thing"), Some(VENDOR));
        assert!(matches!(run(&reg, VENDOR).unwrap_err(), CodecError::UnsupportedType(_)));
        // Re-registration restores the deserializer.
        reg.register(VENDOR, "urn:v", "thing", Box::new(|_| Ok("v2".to_owned())))
            .expect("re-register");
        assert_eq!(run(&reg, VENDOR).expect("restored"), "v2");
    }

    #[test]
    fn clear_all_reseeds_exactly_the_built_ins() {
        let reg = registry();
        reg.register(VENDOR, "urn:v", "thing", Box::new(|_| Ok("v".to_owned())))
            .expect("register");
        reg.clear_all();
        // Built-ins come back on next use; vendor bindings do not.
        assert_eq!(run(&reg, BUILT_IN).expect("reseeded"), "built-in");
        assert_eq!(reg.resolve_target_class("urn:v", "thing"), None);
    }

    #[test]
    fn deserializer_failures_are_rewrapped() {
        let reg = registry();
        reg.register(VENDOR, "urn:v", "thing", Box::new(|_| {
            Err(CodecError::MissingRequiredValue("field"))
        }))
        .expect("register");
        let err = run(&reg, VENDOR).unwrap_err();
        match err {
            CodecError::DeserializationFailed { name, source } => {
                assert_eq!(name, "vendor");
                assert!(matches!(*source, CodecError::MissingRequiredValue("field")));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn concurrent_first_use_seeds_once() {
        let reg = std::sync::Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = std::sync::Arc::clone(&reg);
                std::thread::spawn(move || run(&reg, BUILT_IN).expect("seeded"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread"), "built-in");
        }
    }
}
