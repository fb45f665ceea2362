//! Trellis - Client Runtime for Server-Rendered Pages
//!
//! Trellis attaches interactive behavior to markup that was already
//! rendered on the server, and hosts the page's compiled WebAssembly
//! module next to it. The two paths are independent and share only the
//! page's DOM:
//!
//! - **Hydration**: the build tooling leaves one container element per
//!   component instance, carrying serialized props; trellis locates
//!   each container, reconstructs the props, lazily loads the
//!   implementation, and mounts it.
//! - **Module host**: the page's wasm module is fetched, wired to a
//!   fixed import surface, and started; DOM events reach it as integer
//!   handles through a bounded event store.
//!
//! ## Architecture
//!
//! - [`component`]: descriptors, manifest entries, render-mode filter
//! - [`dom`]: thin DOM layer (in-memory double on non-WASM targets)
//! - [`hydration`]: container lookup, props reconstruction, mounting
//! - [`host`]: module fetch/instantiation, typed exports, event bridge
//! - [`logging`]: console/stderr logging macros
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trellis::{ComponentDescriptor, InitOptions, RenderMode};
//!
//! // Hydrate the server-rendered components.
//! let counter = ComponentDescriptor::new(
//!     "Counter",
//!     "./components/Counter",
//!     "zx-1",
//!     Arc::new(|| Box::pin(async { Ok(counter_render()) })),
//! );
//! trellis::hydrate(vec![counter], RenderMode::Client);
//!
//! // Start the page's wasm module and relay clicks into it.
//! wasm_bindgen_futures::spawn_local(async {
//!     let host = trellis::initialize(InitOptions::new()).await?;
//!     let button = trellis::document().get_element_by_id("inc").unwrap();
//!     host.bridge().listen(&button, "click", "onclick").forget();
//!     Ok::<_, trellis::HostError>(())
//! });
//! ```

#![warn(missing_docs)]

// Core modules
pub mod component;
pub mod dom;
pub mod logging;

// Client-side hydration
pub mod hydration;

// WebAssembly module host and event bridge
pub mod host;

// Re-export commonly used types
pub use component::{
	ComponentDescriptor, Loader, LoaderFuture, ManifestEntry, Props, RenderFn, RenderMode,
	filter_components,
};
pub use dom::{Document, DomEvent, Element, EventHandle, document};
pub use host::{
	DEFAULT_MODULE_URL, ENTRY_EXPORT, EventBridge, EventBuffer, HostError, InitOptions,
	MAX_EVENTS, MEMORY_EXPORT, ModuleExports, ModuleHost,
};
#[cfg(target_arch = "wasm32")]
pub use host::initialize;
pub use hydration::{
	CHILDREN_ATTR, HydrationError, INNER_HTML_KEY, PROPS_ATTR, PreparedComponent, hydrate,
	prepare_component,
};

// Logging macros are exported via #[macro_export]; they are reachable
// as trellis::info_log! and friends.
