//! The capability system: every command is an [`Application`].
//!
//! Builtins, and nothing else, live behind the trait — the core never
//! names a concrete command type. The registry is populated once at
//! startup and read-only afterwards, so pipeline stages look up commands
//! without synchronization.

pub mod builtin;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use registry::ToolRegistry;
pub use traits::Application;

/// A registry with every builtin registered.
pub fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry);
    registry
}
