//! Client-side hydration.
//!
//! Server markup arrives as static HTML with one container element per
//! component instance, carrying the serialized props. Hydration walks
//! the registry, reconstructs each component's inputs from its
//! container, loads the implementation, and mounts it. The server and
//! client manifests are expected to agree: a container that cannot be
//! found indicates a build mismatch and fails that descriptor
//! permanently.

mod prepare;

pub use prepare::{CHILDREN_ATTR, INNER_HTML_KEY, PROPS_ATTR, PreparedComponent, prepare_component};

use thiserror::Error;

use crate::component::{ComponentDescriptor, RenderMode, filter_components};

/// Errors raised while hydrating a single descriptor.
///
/// None of these abort sibling descriptors, and none are retried; the
/// affected container keeps its server-rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrationError {
	/// No element matches the descriptor's container id. Indicates a
	/// mismatch between the server and client manifests.
	#[error("root element '{0}' not found")]
	ContainerNotFound(String),

	/// The container's props attribute is not a JSON object.
	#[error("malformed data-props on '{id}': {reason}")]
	PropsParse {
		/// Container id of the affected descriptor.
		id: String,
		/// Parser diagnostic.
		reason: String,
	},

	/// The descriptor's loader failed to produce a render function.
	#[error("loading component for '{id}' failed: {reason}")]
	LoadFailed {
		/// Container id of the affected descriptor.
		id: String,
		/// What the loader reported.
		reason: String,
	},
}

/// Hydrates every descriptor eligible under `active`.
///
/// Descriptors are dispatched as independent tasks with no ordering
/// guarantee among them. A failed descriptor is logged and leaves its
/// container untouched; the others proceed.
#[cfg(target_arch = "wasm32")]
pub fn hydrate(descriptors: Vec<ComponentDescriptor>, active: RenderMode) {
	#[cfg(feature = "console_error_panic_hook")]
	console_error_panic_hook::set_once();

	for descriptor in filter_components(&descriptors, active) {
		wasm_bindgen_futures::spawn_local(async move {
			mount(&descriptor).await;
		});
	}
}

/// Hydrates every descriptor eligible under `active` (non-WASM
/// version; descriptors run sequentially for test determinism).
#[cfg(not(target_arch = "wasm32"))]
pub async fn hydrate(descriptors: Vec<ComponentDescriptor>, active: RenderMode) {
	for descriptor in filter_components(&descriptors, active) {
		mount(&descriptor).await;
	}
}

async fn mount(descriptor: &ComponentDescriptor) {
	match prepare_component(descriptor).await {
		Ok(prepared) => {
			(prepared.render)(&prepared.container, &prepared.props);
			crate::debug_log!("hydrated '{}'", descriptor.id);
		}
		Err(err) => {
			crate::error_log!("hydration of '{}' failed: {}", descriptor.id, err);
		}
	}
}
