use std::future::Future;

use crate::event::{Event, ObserverFn};
use crate::events::Emittable;
use crate::plugin::Plugin;
use crate::TypeErasedHooks;

/// Handlers registered for runner lifecycle events.
#[derive(Default)]
pub struct HookRegistry {
    pub(crate) inner: TypeErasedHooks,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<E, F, Fut>(&mut self, _event: E, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(E::Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: ObserverFn<E::Context> = Box::new(move |ctx| Box::pin(handler(ctx)));
        E::register_boxed(&mut self.inner, boxed);
        self
    }

    pub fn with_plugin<P: Plugin>(mut self, plugin: P) -> Self {
        plugin.register(&mut self);
        self
    }

    #[doc(hidden)]
    pub async fn emit<C: Emittable>(&self, ctx: C) {
        ctx.emit_to(&self.inner).await
    }
}
