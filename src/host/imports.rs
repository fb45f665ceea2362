//! Import surface composition and bridge capabilities.
//!
//! The import object handed to instantiation is one flat object with
//! three named groups: the module's own namespace and the environment
//! group (both empty), plus the bridge capabilities. The capabilities
//! are added last so the empty groups can never shadow a capability
//! name.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

/// Import group carrying the bridge capabilities.
pub const BRIDGE_NAMESPACE: &str = "trellis";

/// Import group reserved for the module's own namespace.
pub const MODULE_NAMESPACE: &str = "module";

/// Import group reserved for the environment.
pub const ENV_NAMESPACE: &str = "env";

/// Late-bound reference to the module's linear memory.
///
/// Capability closures are built before instantiation, but the memory
/// only exists afterwards; the slot is filled once the export table
/// has been extracted. A capability invoked before wiring (e.g. from
/// a start function) sees a placeholder instead of trapping.
#[derive(Clone, Default)]
pub(crate) struct MemorySlot {
	inner: Rc<RefCell<Option<WebAssembly::Memory>>>,
}

impl MemorySlot {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn fill(&self, memory: WebAssembly::Memory) {
		*self.inner.borrow_mut() = Some(memory);
	}

	/// Copies `len` bytes at `ptr` out of the module memory as UTF-8.
	fn read_utf8(&self, ptr: u32, len: u32) -> String {
		let Some(memory) = self.inner.borrow().clone() else {
			return "<module memory not wired>".to_string();
		};
		let bytes = Uint8Array::new_with_byte_offset_and_length(&memory.buffer(), ptr, len);
		String::from_utf8_lossy(&bytes.to_vec()).into_owned()
	}
}

type CapabilityFn = Closure<dyn Fn(u32, u32)>;

/// Keeps the capability closures alive for the host's lifetime.
pub(crate) struct CapabilityTable {
	_log: CapabilityFn,
	_fail: CapabilityFn,
}

/// Composes the import object passed to instantiation.
pub(crate) fn build_import_surface(slot: &MemorySlot) -> (Object, CapabilityTable) {
	let imports = Object::new();

	set(&imports, MODULE_NAMESPACE, &Object::new());
	set(&imports, ENV_NAMESPACE, &Object::new());

	// Module-originated output is user-facing; it bypasses the
	// debug-only logging macros and goes straight to the console.
	let bridge = Object::new();
	let log = capability(slot, |text| web_sys::console::log_1(&text.into()));
	set(&bridge, "log", log.as_ref());
	let fail = capability(slot, |text| web_sys::console::error_1(&text.into()));
	set(&bridge, "fail", fail.as_ref());

	set(&imports, BRIDGE_NAMESPACE, &bridge);

	(
		imports,
		CapabilityTable {
			_log: log,
			_fail: fail,
		},
	)
}

fn capability(slot: &MemorySlot, sink: impl Fn(String) + 'static) -> CapabilityFn {
	let slot = slot.clone();
	Closure::wrap(Box::new(move |ptr: u32, len: u32| {
		sink(slot.read_utf8(ptr, len));
	}) as Box<dyn Fn(u32, u32)>)
}

fn set(target: &Object, key: &str, value: &JsValue) {
	Reflect::set(target, &key.into(), value).expect("failed to build import surface");
}
