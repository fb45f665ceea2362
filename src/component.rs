//! Component descriptors and the registry surface.
//!
//! The registry itself is external input: build tooling emits an
//! ordered manifest of every component instance found in the server
//! markup, and the application pairs each entry with a lazy loader.
//! This module defines that descriptor shape plus the eligibility
//! filter applied before hydration.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dom::Element;
use crate::hydration::HydrationError;

/// Props reconstructed from a container's `data-props` attribute: a
/// mapping from string keys to JSON values.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// The render implementation a loader resolves to.
///
/// Invoked with the container element and the reconstructed props;
/// what "rendering" means is up to the caller (this crate never calls
/// it during preparation).
#[cfg(target_arch = "wasm32")]
pub type RenderFn = Arc<dyn Fn(&Element, &Props) + 'static>;

/// The render implementation a loader resolves to (server-side
/// version, with thread-safe bounds).
#[cfg(not(target_arch = "wasm32"))]
pub type RenderFn = Arc<dyn Fn(&Element, &Props) + Send + Sync + 'static>;

/// The future a [`Loader`] returns.
#[cfg(target_arch = "wasm32")]
pub type LoaderFuture = Pin<Box<dyn Future<Output = Result<RenderFn, HydrationError>> + 'static>>;

/// The future a [`Loader`] returns (server-side version).
#[cfg(not(target_arch = "wasm32"))]
pub type LoaderFuture =
	Pin<Box<dyn Future<Output = Result<RenderFn, HydrationError>> + Send + 'static>>;

/// Asynchronous factory for a component's render implementation.
///
/// Invoked once per hydration pass; no caching or memoization is
/// performed here. A loader that wants caching should do its own.
#[cfg(target_arch = "wasm32")]
pub type Loader = Arc<dyn Fn() -> LoaderFuture + 'static>;

/// Asynchronous factory for a component's render implementation
/// (server-side version).
#[cfg(not(target_arch = "wasm32"))]
pub type Loader = Arc<dyn Fn() -> LoaderFuture + Send + Sync + 'static>;

/// Where a component instance is meant to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
	/// Hydrated in the browser.
	Client,
	/// Rendered on the server only; never hydrated.
	Server,
}

/// One manifest entry as emitted by the build tooling.
///
/// The manifest is plain JSON; loaders cannot be serialized, so the
/// application attaches them via
/// [`ComponentDescriptor::from_manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
	/// Component name as written in the markup (e.g. `Counter`).
	pub name: String,
	/// Source path of the component implementation.
	pub path: String,
	/// Unique container id correlating one server-rendered element.
	pub id: String,
	/// Optional render-mode metadata; absent means client-eligible.
	#[serde(default)]
	pub mode: Option<RenderMode>,
}

/// Metadata identifying one component instance and how to load its
/// implementation.
///
/// Immutable once created. `id` correlates exactly one
/// server-rendered container element.
#[derive(Clone)]
pub struct ComponentDescriptor {
	/// Component name as written in the markup.
	pub name: String,
	/// Source path of the component implementation.
	pub path: String,
	/// Unique container id.
	pub id: String,
	/// Optional render-mode metadata.
	pub mode: Option<RenderMode>,
	loader: Loader,
}

impl ComponentDescriptor {
	/// Creates a descriptor with no render-mode metadata.
	pub fn new(
		name: impl Into<String>,
		path: impl Into<String>,
		id: impl Into<String>,
		loader: Loader,
	) -> Self {
		Self {
			name: name.into(),
			path: path.into(),
			id: id.into(),
			mode: None,
			loader,
		}
	}

	/// Sets the render-mode metadata.
	pub fn with_mode(mut self, mode: RenderMode) -> Self {
		self.mode = Some(mode);
		self
	}

	/// Pairs a manifest entry with its loader.
	pub fn from_manifest(entry: ManifestEntry, loader: Loader) -> Self {
		Self {
			name: entry.name,
			path: entry.path,
			id: entry.id,
			mode: entry.mode,
			loader,
		}
	}

	/// Invokes the loader.
	pub fn load(&self) -> LoaderFuture {
		(self.loader)()
	}
}

impl fmt::Debug for ComponentDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentDescriptor")
			.field("name", &self.name)
			.field("path", &self.path)
			.field("id", &self.id)
			.field("mode", &self.mode)
			.field("loader", &"..")
			.finish()
	}
}

/// Keeps the descriptors eligible for hydration under the active
/// render mode, preserving their relative order.
///
/// A descriptor without mode metadata is eligible everywhere; one with
/// metadata is eligible only when it matches `active`. Removing an
/// ineligible descriptor never affects how the rest are identified —
/// lookup is by container id, not position. An empty result is not an
/// error.
pub fn filter_components(
	descriptors: &[ComponentDescriptor],
	active: RenderMode,
) -> Vec<ComponentDescriptor> {
	descriptors
		.iter()
		.filter(|descriptor| descriptor.mode.is_none_or(|mode| mode == active))
		.cloned()
		.collect()
}
