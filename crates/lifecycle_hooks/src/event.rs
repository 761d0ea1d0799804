use futures::future::BoxFuture;

use crate::TypeErasedHooks;

#[allow(private_interfaces)]
pub trait Event: Send + Sync + 'static {
    type Context: Clone + Send + 'static;

    #[doc(hidden)]
    fn register_boxed(hooks: &mut TypeErasedHooks, handler: ObserverFn<Self::Context>);
}

pub type ObserverFn<Ctx> = Box<dyn Fn(Ctx) -> BoxFuture<'static, ()> + Send + Sync>;
