use std::{
	collections::HashMap,
	future::Future,
	ops::Deref,
	sync::{Arc, LazyLock, RwLock},
};

use tokio::runtime::Handle;

use crate::{
	EngineFactory, Error, Result, SearchEngine,
	memory::{MEMORY_ENGINE_NAME, MemoryEngineFactory},
};

static REGISTRY: LazyLock<EngineRegistry> = LazyLock::new(EngineRegistry::with_builtin_engines);

/// Process-wide registry, populated with the built-in backends on first use.
pub fn registry() -> &'static EngineRegistry {
	&REGISTRY
}

/// Maps backend names to engine factories.
///
/// Names are trimmed and lower-cased on both registration and lookup. Lookups see either the
/// mapping before or after a concurrent registration, never a partial one.
#[derive(Default)]
pub struct EngineRegistry {
	factories: RwLock<HashMap<String, Arc<dyn EngineFactory>>>,
}
impl EngineRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_builtin_engines() -> Self {
		let registry = Self::new();

		registry.register(MEMORY_ENGINE_NAME, Arc::new(MemoryEngineFactory::default()));

		registry
	}

	/// The last registration for a name wins.
	pub fn register(&self, name: &str, factory: Arc<dyn EngineFactory>) {
		let name = normalize_name(name);
		let replaced = self
			.factories
			.write()
			.unwrap_or_else(|err| err.into_inner())
			.insert(name.clone(), factory)
			.is_some();

		tracing::info!(engine = %name, replaced, "Search engine registered.");
	}

	pub fn contains(&self, name: &str) -> bool {
		self.factories
			.read()
			.unwrap_or_else(|err| err.into_inner())
			.contains_key(&normalize_name(name))
	}

	pub fn names(&self) -> Vec<String> {
		let mut names = self
			.factories
			.read()
			.unwrap_or_else(|err| err.into_inner())
			.keys()
			.cloned()
			.collect::<Vec<_>>();

		names.sort();

		names
	}

	/// Constructs an engine for `name`. The caller owns closing it through the handle.
	///
	/// An unregistered name fails before anything is constructed.
	pub async fn get_by_name(&self, name: &str) -> Result<EngineHandle> {
		let name = normalize_name(name);
		let factory = self
			.factories
			.read()
			.unwrap_or_else(|err| err.into_inner())
			.get(&name)
			.cloned()
			.ok_or_else(|| Error::BackendUnavailable {
				message: format!("No search engine is registered under the name '{name}'."),
			})?;
		let engine = factory.new_instance().await?;

		tracing::debug!(engine = %name, "Search engine acquired.");

		Ok(EngineHandle { name, engine, closed: false })
	}

	/// Runs `f` against a fresh engine and closes it on every exit path.
	///
	/// A close failure is returned when `f` succeeded. When `f` failed, its error is returned and
	/// the close failure is only logged.
	pub async fn with_engine<F, Fut, T>(&self, name: &str, f: F) -> Result<T>
	where
		F: FnOnce(Arc<dyn SearchEngine>) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let handle = self.get_by_name(name).await?;
		let result = f(handle.engine()).await;
		let engine = handle.name.clone();

		match (result, handle.close().await) {
			(Ok(value), Ok(())) => Ok(value),
			(Ok(_), Err(err)) | (Err(err), Ok(())) => Err(err),
			(Err(err), Err(close_err)) => {
				tracing::warn!(
					engine = %engine,
					error = %close_err,
					"Search engine close failed after a failed operation."
				);

				Err(err)
			},
		}
	}
}

/// Scoped engine instance.
///
/// [`EngineHandle::close`] should be awaited on every path. A handle dropped without it closes
/// the engine on the current Tokio runtime.
pub struct EngineHandle {
	name: String,
	engine: Arc<dyn SearchEngine>,
	closed: bool,
}
impl EngineHandle {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn engine(&self) -> Arc<dyn SearchEngine> {
		self.engine.clone()
	}

	pub async fn close(mut self) -> Result<()> {
		self.closed = true;

		let result = self.engine.close().await;

		match &result {
			Ok(()) => tracing::debug!(engine = %self.name, "Search engine closed."),
			Err(err) =>
				tracing::warn!(engine = %self.name, error = %err, "Search engine close failed."),
		}

		result
	}
}
impl Deref for EngineHandle {
	type Target = dyn SearchEngine;

	fn deref(&self) -> &Self::Target {
		self.engine.as_ref()
	}
}
impl Drop for EngineHandle {
	fn drop(&mut self) {
		if self.closed {
			return;
		}

		let name = self.name.clone();
		let engine = self.engine.clone();

		match Handle::try_current() {
			Ok(runtime) => {
				runtime.spawn(async move {
					if let Err(err) = engine.close().await {
						tracing::warn!(engine = %name, error = %err, "Search engine close failed.");
					}
				});
			},
			Err(_) => {
				tracing::warn!(
					engine = %name,
					"Search engine handle dropped outside a runtime without closing."
				);
			},
		}
	}
}

fn normalize_name(name: &str) -> String {
	name.trim().to_lowercase()
}
