//! Event store bridging DOM events into the hosted module.
//!
//! DOM event objects cannot cross the module boundary, so the bridge
//! stores each captured event and hands the module an integer handle
//! instead. The module is expected to call back into the host to
//! retrieve or act on the stored event.

use std::cell::RefCell;
use std::rc::Rc;

use super::HostError;
use super::exports::ModuleExports;
use crate::dom::{DomEvent, Element, EventHandle};

/// Fixed capacity of the event buffer.
pub const MAX_EVENTS: usize = 1000;

/// Bounded ordered store of captured events. The length never exceeds
/// [`MAX_EVENTS`].
#[derive(Debug, Default)]
pub struct EventBuffer {
	events: Vec<DomEvent>,
}

impl EventBuffer {
	/// Creates an empty buffer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores an event and returns its index.
	///
	/// At capacity the buffer is emptied before the append — a full
	/// reset, not FIFO eviction. Every index handed out earlier goes
	/// stale the instant the buffer wraps, and holders are not
	/// notified; an index of 0 can therefore mean "fresh buffer".
	pub fn add(&mut self, event: DomEvent) -> usize {
		if self.events.len() >= MAX_EVENTS {
			self.events.clear();
		}
		self.events.push(event);
		self.events.len() - 1
	}

	/// The event stored under `index`, if still valid.
	pub fn get(&self, index: usize) -> Option<&DomEvent> {
		self.events.get(index)
	}

	/// Number of events currently stored.
	pub fn len(&self) -> usize {
		self.events.len()
	}

	/// Whether the buffer holds no events.
	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}
}

/// Bridges DOM events to the module's exported callbacks through the
/// shared [`EventBuffer`].
///
/// Owned by the [`ModuleHost`](super::ModuleHost) that created it;
/// seeded with that host's export table.
pub struct EventBridge {
	buffer: RefCell<EventBuffer>,
	exports: Rc<ModuleExports>,
}

impl EventBridge {
	pub(crate) fn new(exports: Rc<ModuleExports>) -> Self {
		Self {
			buffer: RefCell::new(EventBuffer::new()),
			exports,
		}
	}

	/// Stores an event and returns its handle. Synchronous, never
	/// suspends.
	///
	/// Reset and append happen under a single mutable borrow, so a
	/// module callback re-entering the bridge can never observe a
	/// half-updated length.
	pub fn add_event(&self, event: DomEvent) -> usize {
		self.buffer.borrow_mut().add(event)
	}

	/// The event stored under `index`, if still valid. This is the
	/// module's out-of-band retrieval path.
	pub fn event(&self, index: usize) -> Option<DomEvent> {
		self.buffer.borrow().get(index).cloned()
	}

	/// Number of events currently stored.
	pub fn len(&self) -> usize {
		self.buffer.borrow().len()
	}

	/// Whether the buffer holds no events.
	pub fn is_empty(&self) -> bool {
		self.buffer.borrow().is_empty()
	}

	/// Stores an event, then invokes the named module export with its
	/// index.
	///
	/// The event stays stored even when the export is missing or
	/// traps, so a later retry by the caller refers to the same
	/// handle.
	pub fn relay(&self, callback: &str, event: DomEvent) -> Result<usize, HostError> {
		let index = self.add_event(event);
		self.exports.call_indexed(callback, index)?;
		Ok(index)
	}

	/// Attaches a DOM listener that relays every fired event to the
	/// named module export. The listener detaches when the returned
	/// handle is dropped.
	pub fn listen(
		self: &Rc<Self>,
		element: &Element,
		kind: &str,
		callback: impl Into<String>,
	) -> EventHandle {
		let bridge = Rc::clone(self);
		let callback = callback.into();
		element.add_event_listener(kind, move |event| {
			if let Err(err) = bridge.relay(&callback, event) {
				crate::error_log!("event relay to '{callback}' failed: {err}");
			}
		})
	}
}

impl std::fmt::Debug for EventBridge {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventBridge")
			.field("len", &self.len())
			.finish()
	}
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use super::*;

	fn event(kind: &str) -> DomEvent {
		DomEvent::new(kind)
	}

	#[test]
	fn indices_grow_until_capacity() {
		let mut buffer = EventBuffer::new();
		for expected in 0..MAX_EVENTS {
			assert_eq!(buffer.add(event("click")), expected);
		}
		assert_eq!(buffer.len(), MAX_EVENTS);
	}

	#[test]
	fn overflow_resets_instead_of_evicting() {
		let mut buffer = EventBuffer::new();
		for _ in 0..MAX_EVENTS {
			buffer.add(event("click"));
		}

		assert_eq!(buffer.add(event("keydown")), 0);
		assert_eq!(buffer.len(), 1);
		assert_eq!(buffer.get(0), Some(&event("keydown")));
		assert_eq!(buffer.get(1), None);
	}

	#[test]
	fn bridge_relays_the_stored_index() {
		let exports = Rc::new(ModuleExports::with_callbacks(&["onclick"]));
		let bridge = EventBridge::new(Rc::clone(&exports));

		let first = bridge.relay("onclick", event("click")).unwrap();
		let second = bridge.relay("onclick", event("click")).unwrap();

		assert_eq!((first, second), (0, 1));
		assert_eq!(exports.recorded("onclick"), vec![0, 1]);
	}

	#[test]
	fn relay_to_missing_export_keeps_the_event() {
		let exports = Rc::new(ModuleExports::with_callbacks(&[]));
		let bridge = EventBridge::new(exports);

		let err = bridge.relay("onclick", event("click")).unwrap_err();
		assert_eq!(err, HostError::ExportMissing("onclick".to_string()));
		assert_eq!(bridge.len(), 1);
		assert_eq!(bridge.event(0), Some(event("click")));
	}

	#[test]
	fn listen_relays_dispatched_events() {
		let exports = Rc::new(ModuleExports::with_callbacks(&["onclick"]));
		let bridge = Rc::new(EventBridge::new(Rc::clone(&exports)));
		let element = Element::create("zx-1");

		let handle = bridge.listen(&element, "click", "onclick");
		element.dispatch(event("click"));
		element.dispatch(event("click"));
		assert_eq!(exports.recorded("onclick"), vec![0, 1]);

		drop(handle);
		element.dispatch(event("click"));
		assert_eq!(exports.recorded("onclick"), vec![0, 1]);
	}
}
