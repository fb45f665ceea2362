//! WebAssembly module host.
//!
//! Fetches the page's compiled module, composes its import surface,
//! instantiates it, and exposes the typed export surface together with
//! the event bridge. A host moves through
//! `Uninitialized → Fetching → Instantiated → Running` along the
//! linear control flow of [`initialize`]; a fetch or instantiation
//! failure is terminal for that attempt (never retried here), and
//! `Running` is terminal for the host's own lifecycle — everything
//! afterwards is event dispatch.

mod events;
mod exports;
#[cfg(target_arch = "wasm32")]
mod imports;

pub use events::{EventBridge, EventBuffer, MAX_EVENTS};
pub use exports::{ENTRY_EXPORT, MEMORY_EXPORT, ModuleExports};
#[cfg(target_arch = "wasm32")]
pub use imports::{BRIDGE_NAMESPACE, ENV_NAMESPACE, MODULE_NAMESPACE};

use std::rc::Rc;

use thiserror::Error;

/// Module location used when [`InitOptions`] does not override it.
pub const DEFAULT_MODULE_URL: &str = "/assets/main.wasm";

/// Errors raised while initializing or driving the module host.
///
/// All of them are fatal for the operation that raised them; recovery
/// (retry, fallback UI) belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
	/// Fetching or instantiating the module failed.
	#[error("failed to fetch or instantiate module at '{url}': {reason}")]
	Instantiation {
		/// The module location of the failed attempt.
		url: String,
		/// What the fetch or instantiation reported.
		reason: String,
	},

	/// A required export (entry point, memory, or a named callback) is
	/// absent or not callable.
	#[error("module export '{0}' is missing or not callable")]
	ExportMissing(String),

	/// An export trapped while the host was invoking it.
	#[error("module export '{export}' trapped: {reason}")]
	Trap {
		/// The export that trapped.
		export: String,
		/// The trap diagnostic.
		reason: String,
	},
}

/// Options for [`initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
	url: Option<String>,
}

impl InitOptions {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the module location.
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	/// The module location this configuration resolves to.
	pub fn module_url(&self) -> &str {
		self.url.as_deref().unwrap_or(DEFAULT_MODULE_URL)
	}
}

/// A running module instance: typed exports, linear memory, and the
/// event bridge seeded with the export table.
///
/// Built exclusively by [`initialize`]; there is no ambient singleton.
/// Each call yields an independent instance whose entry point has run
/// exactly once, and dropping the last `Rc` tears the instance down —
/// capability closures and bridge listeners detach with it.
pub struct ModuleHost {
	exports: Rc<ModuleExports>,
	bridge: Rc<EventBridge>,
	#[cfg(target_arch = "wasm32")]
	_capabilities: imports::CapabilityTable,
}

impl ModuleHost {
	/// The module's typed export surface.
	pub fn exports(&self) -> &ModuleExports {
		&self.exports
	}

	/// The event bridge seeded with this host's export table.
	pub fn bridge(&self) -> &Rc<EventBridge> {
		&self.bridge
	}

	/// The module's linear memory.
	#[cfg(target_arch = "wasm32")]
	pub fn memory(&self) -> &js_sys::WebAssembly::Memory {
		self.exports.memory()
	}

	/// Builds a host around an existing export table (non-WASM double
	/// used by tests). The entry point still runs exactly once.
	#[cfg(not(target_arch = "wasm32"))]
	pub fn with_exports(exports: ModuleExports) -> Result<Rc<Self>, HostError> {
		let exports = Rc::new(exports);
		let bridge = Rc::new(EventBridge::new(Rc::clone(&exports)));
		exports.invoke_entry()?;
		Ok(Rc::new(Self { exports, bridge }))
	}
}

impl std::fmt::Debug for ModuleHost {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModuleHost")
			.field("bridge", &self.bridge)
			.finish()
	}
}

/// Fetches, instantiates, and starts the page's module.
///
/// On success the returned host is `Running` and its entry point has
/// been invoked exactly once, synchronously, before control returns.
/// On failure no host value exists and nothing is persisted — a later
/// call starts from scratch.
#[cfg(target_arch = "wasm32")]
pub async fn initialize(options: InitOptions) -> Result<Rc<ModuleHost>, HostError> {
	use js_sys::{Reflect, Uint8Array, WebAssembly};
	use wasm_bindgen::JsCast;
	use wasm_bindgen_futures::JsFuture;

	#[cfg(feature = "console_error_panic_hook")]
	console_error_panic_hook::set_once();

	let url = options.module_url().to_string();
	let fail = |reason: String| HostError::Instantiation {
		url: url.clone(),
		reason,
	};

	crate::info_log!("module host: fetching {url}");

	let slot = imports::MemorySlot::new();
	let (import_surface, capabilities) = imports::build_import_surface(&slot);

	let window = web_sys::window().ok_or_else(|| fail("window unavailable".to_string()))?;
	let response = JsFuture::from(window.fetch_with_str(&url))
		.await
		.map_err(|err| fail(js_reason(&err)))?;
	let response: web_sys::Response = response
		.dyn_into()
		.map_err(|_| fail("fetch did not yield a response".to_string()))?;
	if !response.ok() {
		return Err(fail(format!("HTTP {}", response.status())));
	}

	let buffer = JsFuture::from(
		response
			.array_buffer()
			.map_err(|err| fail(js_reason(&err)))?,
	)
	.await
	.map_err(|err| fail(js_reason(&err)))?;
	let bytes = Uint8Array::new(&buffer).to_vec();

	crate::info_log!("module host: instantiating {} bytes", bytes.len());

	let instantiated = JsFuture::from(WebAssembly::instantiate_buffer(&bytes, &import_surface))
		.await
		.map_err(|err| fail(js_reason(&err)))?;
	let instance: WebAssembly::Instance = Reflect::get(&instantiated, &"instance".into())
		.ok()
		.and_then(|value| value.dyn_into().ok())
		.ok_or_else(|| fail("instantiation yielded no instance".to_string()))?;

	let exports = Rc::new(ModuleExports::from_instance(&instance)?);
	slot.fill(exports.memory().clone());

	let bridge = Rc::new(EventBridge::new(Rc::clone(&exports)));

	// Entry point runs exactly once, before control returns.
	exports.invoke_entry()?;
	crate::info_log!("module host: running");

	Ok(Rc::new(ModuleHost {
		exports,
		bridge,
		_capabilities: capabilities,
	}))
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn js_reason(value: &wasm_bindgen::JsValue) -> String {
	use wasm_bindgen::JsCast;
	value
		.dyn_ref::<js_sys::Error>()
		.map(|err| String::from(err.message()))
		.unwrap_or_else(|| format!("{value:?}"))
}
