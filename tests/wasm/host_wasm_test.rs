//! Module host behavior in a real browsing context.
//!
//! Run with: `wasm-pack test --chrome --headless`

#![cfg(target_arch = "wasm32")]

use trellis::{DEFAULT_MODULE_URL, HostError, InitOptions, initialize};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn unreachable_module_fails_with_instantiation_error() {
	let err = initialize(InitOptions::new().url("/definitely-not-here.wasm"))
		.await
		.unwrap_err();

	assert!(
		matches!(err, HostError::Instantiation { ref url, .. } if url == "/definitely-not-here.wasm")
	);
}

#[wasm_bindgen_test]
fn options_default_to_the_well_known_path() {
	assert_eq!(InitOptions::new().module_url(), DEFAULT_MODULE_URL);
	assert_eq!(
		InitOptions::new().url("/pkg/app.wasm").module_url(),
		"/pkg/app.wasm"
	);
}
