//! Hydration against the real browser DOM.
//!
//! Run with: `wasm-pack test --chrome --headless`

#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use serde_json::json;
use trellis::{
	ComponentDescriptor, HydrationError, INNER_HTML_KEY, Loader, RenderFn, prepare_component,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn loader_for(render: RenderFn) -> Loader {
	Arc::new(move || {
		let render = Arc::clone(&render);
		Box::pin(async move { Ok(render) })
	})
}

fn noop_render() -> RenderFn {
	Arc::new(|_, _| {})
}

fn install_container(id: &str, props: Option<&str>, children: Option<&str>) {
	let doc = web_sys::window().unwrap().document().unwrap();
	if let Some(existing) = doc.get_element_by_id(id) {
		existing.remove();
	}

	let div = doc.create_element("div").unwrap();
	div.set_id(id);
	if let Some(props) = props {
		div.set_attribute("data-props", props).unwrap();
	}
	if let Some(children) = children {
		div.set_attribute("data-children", children).unwrap();
	}
	doc.body().unwrap().append_child(&div).unwrap();
}

#[wasm_bindgen_test]
async fn prepare_reads_the_server_rendered_container() {
	install_container("zx-1", Some(r#"{"n":3}"#), None);

	let render = noop_render();
	let descriptor = ComponentDescriptor::new(
		"Counter",
		"./components/Counter",
		"zx-1",
		loader_for(render.clone()),
	);

	let prepared = prepare_component(&descriptor).await.unwrap();
	assert_eq!(prepared.container.id(), "zx-1");
	assert_eq!(prepared.props.get("n"), Some(&json!(3)));
	assert!(Arc::ptr_eq(&prepared.render, &render));
}

#[wasm_bindgen_test]
async fn prepare_projects_children_markup() {
	install_container("zx-2", None, Some("<p>hi</p>"));

	let descriptor =
		ComponentDescriptor::new("Card", "./components/Card", "zx-2", loader_for(noop_render()));

	let prepared = prepare_component(&descriptor).await.unwrap();
	assert_eq!(
		prepared.props.get(INNER_HTML_KEY),
		Some(&json!({ "__html": "<p>hi</p>" }))
	);
}

#[wasm_bindgen_test]
async fn prepare_rejects_missing_containers() {
	let descriptor = ComponentDescriptor::new(
		"Counter",
		"./components/Counter",
		"zx-nowhere",
		loader_for(noop_render()),
	);

	let err = prepare_component(&descriptor).await.unwrap_err();
	assert_eq!(
		err,
		HydrationError::ContainerNotFound("zx-nowhere".to_string())
	);
}
