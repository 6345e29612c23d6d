//! Registry trait for self-registering implementations.
//!
//! Pluggable components (storage backends, signing accounts) expose a
//! `Registry` struct so the builder can map configuration names to factories.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This matches the key under the component's `implementations` table:
	/// - "memory" for storage.implementations.memory
	/// - "local" for account.implementations.local
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
