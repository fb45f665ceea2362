//! Typed view of the module's export table.
//!
//! Only two exports are required by contract: the nullary entry point
//! and the linear memory. Whatever else the module exports stays in an
//! opaque table the host never interprets — callbacks are looked up by
//! name at invocation time.

use super::HostError;

#[cfg(target_arch = "wasm32")]
use js_sys::{Function, Object, Reflect, WebAssembly};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

#[cfg(not(target_arch = "wasm32"))]
use std::cell::{Cell, RefCell};
#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;

/// Name of the required entry-point export.
pub const ENTRY_EXPORT: &str = "main";

/// Name of the required linear-memory export.
pub const MEMORY_EXPORT: &str = "memory";

/// The exports this crate depends on, extracted once at
/// instantiation.
#[cfg(target_arch = "wasm32")]
pub struct ModuleExports {
	entry: Function,
	memory: WebAssembly::Memory,
	table: Object,
}

#[cfg(target_arch = "wasm32")]
impl ModuleExports {
	/// Extracts the typed surface from an instantiated module.
	pub(crate) fn from_instance(instance: &WebAssembly::Instance) -> Result<Self, HostError> {
		let table = instance.exports();

		let entry = Reflect::get(&table, &ENTRY_EXPORT.into())
			.ok()
			.and_then(|value| value.dyn_into::<Function>().ok())
			.ok_or_else(|| HostError::ExportMissing(ENTRY_EXPORT.to_string()))?;

		let memory = Reflect::get(&table, &MEMORY_EXPORT.into())
			.ok()
			.and_then(|value| value.dyn_into::<WebAssembly::Memory>().ok())
			.ok_or_else(|| HostError::ExportMissing(MEMORY_EXPORT.to_string()))?;

		Ok(Self {
			entry,
			memory,
			table,
		})
	}

	/// The module's linear memory.
	pub fn memory(&self) -> &WebAssembly::Memory {
		&self.memory
	}

	/// Invokes the entry point. Called exactly once per host, during
	/// initialization.
	pub(crate) fn invoke_entry(&self) -> Result<(), HostError> {
		self.entry
			.call0(&JsValue::NULL)
			.map(|_| ())
			.map_err(|err| HostError::Trap {
				export: ENTRY_EXPORT.to_string(),
				reason: super::js_reason(&err),
			})
	}

	/// Invokes a named export with an event handle.
	pub fn call_indexed(&self, name: &str, index: usize) -> Result<(), HostError> {
		let callback = Reflect::get(&self.table, &name.into())
			.ok()
			.and_then(|value| value.dyn_into::<Function>().ok())
			.ok_or_else(|| HostError::ExportMissing(name.to_string()))?;

		callback
			.call1(&JsValue::NULL, &JsValue::from_f64(index as f64))
			.map(|_| ())
			.map_err(|err| HostError::Trap {
				export: name.to_string(),
				reason: super::js_reason(&err),
			})
	}
}

/// The exports this crate depends on (non-WASM double used by tests;
/// records which callbacks were invoked with which handles).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct ModuleExports {
	callbacks: HashMap<String, RefCell<Vec<usize>>>,
	entry_invocations: Cell<usize>,
}

#[cfg(not(target_arch = "wasm32"))]
impl ModuleExports {
	/// Creates a double exposing the given callback names.
	pub fn with_callbacks(names: &[&str]) -> Self {
		Self {
			callbacks: names
				.iter()
				.map(|name| (name.to_string(), RefCell::new(Vec::new())))
				.collect(),
			entry_invocations: Cell::new(0),
		}
	}

	/// Invokes the entry point. Called exactly once per host, during
	/// initialization.
	pub(crate) fn invoke_entry(&self) -> Result<(), HostError> {
		self.entry_invocations.set(self.entry_invocations.get() + 1);
		Ok(())
	}

	/// How often the entry point has run.
	pub fn entry_invocations(&self) -> usize {
		self.entry_invocations.get()
	}

	/// Invokes a named export with an event handle.
	pub fn call_indexed(&self, name: &str, index: usize) -> Result<(), HostError> {
		match self.callbacks.get(name) {
			Some(recorded) => {
				recorded.borrow_mut().push(index);
				Ok(())
			}
			None => Err(HostError::ExportMissing(name.to_string())),
		}
	}

	/// The handles a callback has received so far.
	pub fn recorded(&self, name: &str) -> Vec<usize> {
		self.callbacks
			.get(name)
			.map(|recorded| recorded.borrow().clone())
			.unwrap_or_default()
	}
}
