//! Dependency container: type → factory bindings, resolved on demand.
//!
//! Types declare their constructor dependencies through [`Resolve`]; the container
//! never caches what it builds, so every `make` re-resolves the whole graph.

use crate::error::ContainerError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type Factory = Arc<dyn Fn(&Container) -> Result<Box<dyn Any + Send>, ContainerError> + Send + Sync>;

/// A type that can build itself from the container by resolving its dependencies in order.
pub trait Resolve: Sized + Send + 'static {
    fn resolve(container: &Container) -> Result<Self, ContainerError>;
}

/// Entry in a controller registry consumed by [`Container::autoload_controllers`].
#[derive(Clone, Copy)]
pub struct ControllerRegistration {
    pub name: &'static str,
    pub register: fn(&mut Container),
}

impl ControllerRegistration {
    pub const fn of<C: Resolve>(name: &'static str) -> Self {
        ControllerRegistration {
            name,
            register: register_self::<C>,
        }
    }
}

fn register_self<C: Resolve>(container: &mut Container) {
    container.bind_self::<C>();
}

#[derive(Clone)]
struct Binding {
    type_name: &'static str,
    factory: Factory,
}

#[derive(Clone, Default)]
pub struct Container {
    bindings: HashMap<TypeId, Binding>,
    controllers: Vec<&'static str>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `T`. A later binding for the same type replaces the earlier one.
    pub fn bind<T, F>(&mut self, factory: F)
    where
        T: Send + 'static,
        F: Fn(&Container) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let factory: Factory = Arc::new(move |c: &Container| factory(c).map(|v| Box::new(v) as Box<dyn Any + Send>));
        if self
            .bindings
            .insert(TypeId::of::<T>(), Binding { type_name, factory })
            .is_some()
        {
            tracing::debug!(type_name, "binding replaced");
        }
    }

    /// Bind `T` to its own constructor.
    pub fn bind_self<T: Resolve>(&mut self) {
        self.bind::<T, _>(T::resolve);
    }

    /// Bind a ready-made value; each `make` hands out a clone.
    pub fn instance<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
        self.bind::<T, _>(move |_| Ok(value.clone()));
    }

    pub fn has<T: 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    pub fn make<T: 'static>(&self) -> Result<T, ContainerError> {
        let requested = std::any::type_name::<T>();
        let binding = self
            .bindings
            .get(&TypeId::of::<T>())
            .ok_or(ContainerError::Unbound(requested))?;
        let value = (binding.factory)(self)?;
        value
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| ContainerError::TypeMismatch(binding.type_name))
    }

    /// Register every controller in `registry` as a lazily resolved binding.
    pub fn autoload_controllers<'a, I>(&mut self, registry: I)
    where
        I: IntoIterator<Item = &'a ControllerRegistration>,
    {
        for entry in registry {
            (entry.register)(self);
            self.controllers.push(entry.name);
            tracing::debug!(controller = entry.name, "controller registered");
        }
    }

    pub fn controllers(&self) -> &[&'static str] {
        &self.controllers
    }

    /// Per-request child: shares every binding, and request-scoped instances stay local to it.
    pub fn scope(&self) -> Container {
        self.clone()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.bindings.values().map(|b| b.type_name).collect();
        names.sort_unstable();
        f.debug_struct("Container")
            .field("bindings", &names)
            .field("controllers", &self.controllers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Name(String);

    #[derive(Clone, Debug, PartialEq)]
    struct Port(u16);

    #[derive(Debug, PartialEq)]
    struct Server {
        name: Name,
        port: Port,
    }

    impl Resolve for Server {
        fn resolve(c: &Container) -> Result<Self, ContainerError> {
            Ok(Server {
                name: c.make()?,
                port: c.make()?,
            })
        }
    }

    #[derive(Debug)]
    struct Leaf;

    impl Resolve for Leaf {
        fn resolve(_: &Container) -> Result<Self, ContainerError> {
            Ok(Leaf)
        }
    }

    #[test]
    fn unbound_type_fails() {
        let c = Container::new();
        assert!(matches!(c.make::<Name>(), Err(ContainerError::Unbound(_))));
    }

    #[test]
    fn resolves_dependencies_in_declared_order() {
        let mut c = Container::new();
        c.instance(Name("ledger".into()));
        c.instance(Port(8080));
        c.bind_self::<Server>();
        let a = c.make::<Server>().unwrap();
        let b = c.make::<Server>().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, Name("ledger".into()));
        assert_eq!(a.port, Port(8080));
    }

    #[test]
    fn zero_dependency_type_constructs_directly() {
        let mut c = Container::new();
        c.bind_self::<Leaf>();
        assert!(c.make::<Leaf>().is_ok());
    }

    #[test]
    fn missing_dependency_surfaces_at_resolution() {
        let mut c = Container::new();
        c.instance(Name("only".into()));
        c.bind_self::<Server>();
        match c.make::<Server>() {
            Err(ContainerError::Unbound(name)) => assert!(name.ends_with("Port")),
            other => panic!("expected unbound Port, got {:?}", other),
        }
    }

    #[test]
    fn last_binding_wins() {
        let mut c = Container::new();
        c.instance(Port(1));
        c.instance(Port(2));
        assert_eq!(c.make::<Port>().unwrap(), Port(2));
    }

    #[test]
    fn factories_run_on_every_make() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut c = Container::new();
        c.bind(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Port(9))
        });
        c.make::<Port>().unwrap();
        c.make::<Port>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn controllers_resolve_lazily_against_current_bindings() {
        static REGISTRY: &[ControllerRegistration] = &[ControllerRegistration::of::<Server>("Server")];
        let mut c = Container::new();
        c.autoload_controllers(REGISTRY);
        assert_eq!(c.controllers(), ["Server"]);

        let mut scope = c.scope();
        scope.instance(Name("late".into()));
        scope.instance(Port(1));
        assert_eq!(scope.make::<Server>().unwrap().name, Name("late".into()));
        assert!(!c.has::<Name>());
        assert!(c.make::<Server>().is_err());
    }
}
