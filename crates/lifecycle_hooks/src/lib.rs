mod context;
mod event;
mod events;
mod plugin;
mod registry;

use std::any::{Any, TypeId};
use std::collections::HashMap;

pub use context::*;
pub use event::{Event, ObserverFn};
pub use events::*;
pub use plugin::Plugin;
pub use registry::HookRegistry;

#[derive(Default)]
pub(crate) struct TypeErasedHooks {
    handlers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl TypeErasedHooks {
    pub fn get_handlers<E: Event>(&self) -> Option<&Vec<ObserverFn<E::Context>>> {
        self.handlers
            .get(&TypeId::of::<E>())
            .and_then(|h| h.downcast_ref())
    }

    pub fn get_handlers_mut<E: Event>(&mut self) -> &mut Vec<ObserverFn<E::Context>> {
        self.handlers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<ObserverFn<E::Context>>::new()))
            .downcast_mut()
            .expect("Handler type mismatch")
    }
}
