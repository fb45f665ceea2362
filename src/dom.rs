//! Thin DOM access layer.
//!
//! On `wasm32` this wraps the `web_sys` document so the rest of the
//! crate never touches raw bindings directly. On other targets the
//! same API is backed by an in-memory document double, which keeps the
//! hydration and event-bridge logic testable with the plain test
//! runner.

#[cfg(not(target_arch = "wasm32"))]
use std::cell::RefCell;
#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;

/// The event object handed to listeners and stored by the event
/// bridge.
#[cfg(target_arch = "wasm32")]
pub type DomEvent = web_sys::Event;

/// The event object handed to listeners and stored by the event
/// bridge (non-WASM double).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
	kind: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl DomEvent {
	/// Creates an event of the given type (e.g. `"click"`).
	pub fn new(kind: impl Into<String>) -> Self {
		Self { kind: kind.into() }
	}

	/// The event type.
	pub fn kind(&self) -> &str {
		&self.kind
	}
}

#[cfg(not(target_arch = "wasm32"))]
type Handler = Rc<RefCell<dyn FnMut(DomEvent)>>;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct ElementInner {
	id: String,
	attributes: RefCell<HashMap<String, String>>,
	inner_html: RefCell<String>,
	handlers: RefCell<Vec<(String, Handler)>>,
}

/// A handle to a DOM element.
///
/// Cloning is cheap; clones refer to the same underlying node.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct Element {
	inner: web_sys::Element,
}

/// A handle to a DOM element (non-WASM double).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone)]
pub struct Element {
	inner: Rc<ElementInner>,
}

#[cfg(target_arch = "wasm32")]
impl Element {
	/// Wraps a raw `web_sys` element.
	pub fn from_raw(inner: web_sys::Element) -> Self {
		Self { inner }
	}

	/// The underlying `web_sys` element.
	pub fn raw(&self) -> &web_sys::Element {
		&self.inner
	}

	/// The element's `id` attribute.
	pub fn id(&self) -> String {
		self.inner.id()
	}

	/// Reads an attribute value.
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		self.inner.get_attribute(name)
	}

	/// Writes an attribute value.
	pub fn set_attribute(&self, name: &str, value: &str) {
		self.inner
			.set_attribute(name, value)
			.expect("failed to set attribute");
	}

	/// Replaces the element's markup content.
	pub fn set_inner_html(&self, html: &str) {
		self.inner.set_inner_html(html);
	}

	/// The element's current markup content.
	pub fn inner_html(&self) -> String {
		self.inner.inner_html()
	}

	/// Attaches an event listener; the listener stays attached for the
	/// lifetime of the returned handle.
	pub fn add_event_listener(
		&self,
		kind: &str,
		mut handler: impl FnMut(DomEvent) + 'static,
	) -> EventHandle {
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
			handler(event);
		}) as Box<dyn FnMut(_)>);

		let target: &web_sys::EventTarget = self.inner.as_ref();
		target
			.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
			.expect("failed to add event listener");

		EventHandle {
			target: target.clone(),
			kind: kind.to_string(),
			closure: Some(closure),
		}
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl Element {
	/// Creates a detached element with the given id.
	pub fn create(id: impl Into<String>) -> Self {
		Self {
			inner: Rc::new(ElementInner {
				id: id.into(),
				..ElementInner::default()
			}),
		}
	}

	/// The element's `id` attribute.
	pub fn id(&self) -> String {
		self.inner.id.clone()
	}

	/// Reads an attribute value.
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		self.inner.attributes.borrow().get(name).cloned()
	}

	/// Writes an attribute value.
	pub fn set_attribute(&self, name: &str, value: &str) {
		self.inner
			.attributes
			.borrow_mut()
			.insert(name.to_string(), value.to_string());
	}

	/// Replaces the element's markup content.
	pub fn set_inner_html(&self, html: &str) {
		*self.inner.inner_html.borrow_mut() = html.to_string();
	}

	/// The element's current markup content.
	pub fn inner_html(&self) -> String {
		self.inner.inner_html.borrow().clone()
	}

	/// Attaches an event listener; the listener stays attached for the
	/// lifetime of the returned handle.
	pub fn add_event_listener(
		&self,
		kind: &str,
		handler: impl FnMut(DomEvent) + 'static,
	) -> EventHandle {
		let handler: Handler = Rc::new(RefCell::new(handler));
		self.inner
			.handlers
			.borrow_mut()
			.push((kind.to_string(), Rc::clone(&handler)));

		EventHandle {
			node: Rc::clone(&self.inner),
			kind: kind.to_string(),
			handler: Some(handler),
		}
	}

	/// Fires all listeners registered for the event's type.
	pub fn dispatch(&self, event: DomEvent) {
		let handlers: Vec<Handler> = self
			.inner
			.handlers
			.borrow()
			.iter()
			.filter(|(kind, _)| *kind == event.kind())
			.map(|(_, handler)| Rc::clone(handler))
			.collect();

		for handler in handlers {
			(&mut *handler.borrow_mut())(event.clone());
		}
	}
}

#[cfg(target_arch = "wasm32")]
impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		let a: &wasm_bindgen::JsValue = self.inner.as_ref();
		let b: &wasm_bindgen::JsValue = other.inner.as_ref();
		a == b
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl std::fmt::Debug for Element {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Element")
			.field("id", &self.inner.id)
			.field("attributes", &self.inner.attributes.borrow())
			.finish()
	}
}

/// Keeps an attached event listener alive; detaches it on drop.
#[cfg(target_arch = "wasm32")]
pub struct EventHandle {
	target: web_sys::EventTarget,
	kind: String,
	closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

/// Keeps an attached event listener alive; detaches it on drop
/// (non-WASM double).
#[cfg(not(target_arch = "wasm32"))]
pub struct EventHandle {
	node: Rc<ElementInner>,
	kind: String,
	handler: Option<Handler>,
}

#[cfg(target_arch = "wasm32")]
impl EventHandle {
	/// Leaves the listener attached for the lifetime of the page.
	pub fn forget(mut self) {
		if let Some(closure) = self.closure.take() {
			closure.forget();
		}
	}
}

#[cfg(target_arch = "wasm32")]
impl Drop for EventHandle {
	fn drop(&mut self) {
		if let Some(closure) = self.closure.take() {
			let _ = self
				.target
				.remove_event_listener_with_callback(&self.kind, closure.as_ref().unchecked_ref());
		}
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl EventHandle {
	/// Leaves the listener attached for the lifetime of the page.
	pub fn forget(mut self) {
		self.handler.take();
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for EventHandle {
	fn drop(&mut self) {
		if let Some(handler) = self.handler.take() {
			self.node
				.handlers
				.borrow_mut()
				.retain(|(kind, h)| !(kind == &self.kind && Rc::ptr_eq(h, &handler)));
		}
	}
}

/// The page document.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct Document {
	inner: web_sys::Document,
}

/// The page document (non-WASM double backed by a thread-local
/// element registry).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Default)]
pub struct Document;

#[cfg(target_arch = "wasm32")]
impl Document {
	/// Looks up an element by its id attribute.
	pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
		self.inner.get_element_by_id(id).map(Element::from_raw)
	}
}

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
	static REGISTRY: RefCell<HashMap<String, Element>> = RefCell::new(HashMap::new());
}

#[cfg(not(target_arch = "wasm32"))]
impl Document {
	/// Looks up an element by its id attribute.
	pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
		REGISTRY.with(|registry| registry.borrow().get(id).cloned())
	}

	/// Registers an element so `get_element_by_id` can find it.
	pub fn insert(&self, element: Element) {
		REGISTRY.with(|registry| {
			registry.borrow_mut().insert(element.id(), element);
		});
	}

	/// Empties the document.
	pub fn clear(&self) {
		REGISTRY.with(|registry| registry.borrow_mut().clear());
	}
}

/// The current page document.
///
/// # Panics
///
/// Panics on `wasm32` when called outside a browsing context.
#[cfg(target_arch = "wasm32")]
pub fn document() -> Document {
	let inner = web_sys::window()
		.and_then(|window| window.document())
		.expect("document unavailable");
	Document { inner }
}

/// The current page document (non-WASM double).
#[cfg(not(target_arch = "wasm32"))]
pub fn document() -> Document {
	Document
}
