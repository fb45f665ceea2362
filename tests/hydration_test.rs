//! Hydration flow against the in-memory document double.

#![cfg(not(target_arch = "wasm32"))]

use std::sync::Arc;

use futures::executor::block_on;
use serde_json::json;
use trellis::{
	ComponentDescriptor, HydrationError, INNER_HTML_KEY, Loader, Props, RenderFn, RenderMode,
	document, filter_components, hydrate, prepare_component,
};

fn loader_for(render: RenderFn) -> Loader {
	Arc::new(move || {
		let render = Arc::clone(&render);
		Box::pin(async move { Ok(render) })
	})
}

fn failing_loader(id: &str, reason: &str) -> Loader {
	let id = id.to_string();
	let reason = reason.to_string();
	Arc::new(move || {
		let id = id.clone();
		let reason = reason.clone();
		Box::pin(async move { Err(HydrationError::LoadFailed { id, reason }) })
	})
}

fn noop_render() -> RenderFn {
	Arc::new(|_, _| {})
}

fn container(id: &str) -> trellis::Element {
	let doc = document();
	let element = trellis::Element::create(id);
	doc.insert(element.clone());
	element
}

#[test]
fn prepare_resolves_the_exact_container() {
	document().clear();
	let element = container("zx-1");
	element.set_attribute("data-props", r#"{"n":3}"#);

	let render = noop_render();
	let descriptor =
		ComponentDescriptor::new("Counter", "./components/Counter", "zx-1", loader_for(render.clone()));

	let prepared = block_on(prepare_component(&descriptor)).unwrap();
	assert_eq!(prepared.container, element);
	assert_eq!(prepared.props.get("n"), Some(&json!(3)));
	assert!(Arc::ptr_eq(&prepared.render, &render));
}

#[test]
fn prepare_rejects_unknown_container_with_its_id() {
	document().clear();
	let descriptor = ComponentDescriptor::new(
		"Counter",
		"./components/Counter",
		"zx-missing",
		loader_for(noop_render()),
	);

	let err = block_on(prepare_component(&descriptor)).unwrap_err();
	assert_eq!(err, HydrationError::ContainerNotFound("zx-missing".to_string()));
	assert!(err.to_string().contains("zx-missing"));
}

#[test]
fn props_default_to_empty_when_attribute_is_absent_or_empty() {
	document().clear();
	container("zx-1");
	let element = container("zx-2");
	element.set_attribute("data-props", "");

	for id in ["zx-1", "zx-2"] {
		let descriptor =
			ComponentDescriptor::new("Counter", "./components/Counter", id, loader_for(noop_render()));
		let prepared = block_on(prepare_component(&descriptor)).unwrap();
		assert_eq!(prepared.props, Props::new());
	}
}

#[test]
fn children_markup_is_projected_under_the_reserved_key() {
	document().clear();
	let element = container("zx-1");
	element.set_attribute("data-children", "<p>hi</p>");

	let descriptor =
		ComponentDescriptor::new("Card", "./components/Card", "zx-1", loader_for(noop_render()));
	let prepared = block_on(prepare_component(&descriptor)).unwrap();
	assert_eq!(
		prepared.props.get(INNER_HTML_KEY),
		Some(&json!({ "__html": "<p>hi</p>" }))
	);
}

#[test]
fn absent_children_leave_the_reserved_key_unset() {
	document().clear();
	let element = container("zx-1");
	element.set_attribute("data-props", r#"{"n":1}"#);

	let descriptor =
		ComponentDescriptor::new("Card", "./components/Card", "zx-1", loader_for(noop_render()));
	let prepared = block_on(prepare_component(&descriptor)).unwrap();
	assert!(!prepared.props.contains_key(INNER_HTML_KEY));
}

#[test]
fn malformed_props_fail_that_descriptor_only() {
	document().clear();
	let broken = container("zx-1");
	broken.set_attribute("data-props", "{not json");
	let healthy = container("zx-2");
	healthy.set_attribute("data-props", r#"{"n":7}"#);

	let descriptor =
		ComponentDescriptor::new("Counter", "./components/Counter", "zx-1", loader_for(noop_render()));
	let err = block_on(prepare_component(&descriptor)).unwrap_err();
	assert!(matches!(err, HydrationError::PropsParse { ref id, .. } if id == "zx-1"));

	let descriptor =
		ComponentDescriptor::new("Counter", "./components/Counter", "zx-2", loader_for(noop_render()));
	let prepared = block_on(prepare_component(&descriptor)).unwrap();
	assert_eq!(prepared.props.get("n"), Some(&json!(7)));
}

#[test]
fn hydrate_mounts_eligible_descriptors_and_skips_failures() {
	document().clear();

	let mounted = container("zx-1");
	mounted.set_attribute("data-props", r#"{"n":3}"#);
	mounted.set_inner_html("<span>server</span>");

	let broken = container("zx-2");
	broken.set_inner_html("<span>server</span>");

	let server_only = container("zx-3");
	server_only.set_inner_html("<span>server</span>");

	let render: RenderFn = Arc::new(|element, props| {
		let n = props.get("n").and_then(|value| value.as_i64()).unwrap_or(0);
		element.set_inner_html(&format!("<span>{n}</span>"));
	});

	let descriptors = vec![
		ComponentDescriptor::new("Counter", "./components/Counter", "zx-1", loader_for(render)),
		ComponentDescriptor::new(
			"Chart",
			"./components/Chart",
			"zx-2",
			failing_loader("zx-2", "network unreachable"),
		),
		ComponentDescriptor::new("Static", "./components/Static", "zx-3", loader_for(noop_render()))
			.with_mode(RenderMode::Server),
	];

	block_on(hydrate(descriptors, RenderMode::Client));

	// The healthy descriptor mounted; the failed and ineligible ones
	// keep their server-rendered content.
	assert_eq!(mounted.inner_html(), "<span>3</span>");
	assert_eq!(broken.inner_html(), "<span>server</span>");
	assert_eq!(server_only.inner_html(), "<span>server</span>");
}

#[test]
fn filtering_is_order_preserving_and_idempotent() {
	let descriptors: Vec<ComponentDescriptor> = [
		("zx-1", Some(RenderMode::Client)),
		("zx-2", Some(RenderMode::Server)),
		("zx-3", None),
	]
	.into_iter()
	.map(|(id, mode)| {
		let descriptor =
			ComponentDescriptor::new("Counter", "./components/Counter", id, loader_for(noop_render()));
		match mode {
			Some(mode) => descriptor.with_mode(mode),
			None => descriptor,
		}
	})
	.collect();

	let once = filter_components(&descriptors, RenderMode::Client);
	let twice = filter_components(&once, RenderMode::Client);

	let ids: Vec<&str> = once.iter().map(|d| d.id.as_str()).collect();
	assert_eq!(ids, ["zx-1", "zx-3"]);
	assert_eq!(
		twice.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
		ids
	);
}
