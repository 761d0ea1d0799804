use crate::HookRegistry;

/// A bundle of hook registrations installed in one call.
pub trait Plugin: Send + Sync + 'static {
    fn register(self, hooks: &mut HookRegistry);
}
