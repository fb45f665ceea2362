//! Per-descriptor preparation: container lookup, props
//! reconstruction, lazy load.

use serde_json::Value;

use super::HydrationError;
use crate::component::{ComponentDescriptor, Props, RenderFn};
use crate::dom::{Element, document};

/// Container attribute holding the serialized props as JSON text.
pub const PROPS_ATTR: &str = "data-props";

/// Container attribute holding the component's server-rendered
/// children as literal markup.
pub const CHILDREN_ATTR: &str = "data-children";

/// Reserved props key under which children markup is projected, so the
/// rendering layer can inject it verbatim.
pub const INNER_HTML_KEY: &str = "dangerouslySetInnerHTML";

/// Field name inside the [`INNER_HTML_KEY`] wrapper object.
const RAW_HTML_FIELD: &str = "__html";

/// Everything needed to mount one component: produced per descriptor,
/// consumed immediately by the mount step.
///
/// `container` references an existing DOM node; preparation neither
/// creates nor mutates it. Replacing its content is the mount step's
/// job.
pub struct PreparedComponent {
	/// The server-rendered container element.
	pub container: Element,
	/// Props reconstructed from the container's attributes.
	pub props: Props,
	/// The lazily loaded render implementation.
	pub render: RenderFn,
}

impl std::fmt::Debug for PreparedComponent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PreparedComponent")
			.field("container", &self.container.id())
			.field("props", &self.props)
			.field("render", &"..")
			.finish()
	}
}

/// Prepares one descriptor for mounting.
///
/// Locates the container by id, parses its props attribute, merges
/// children markup under [`INNER_HTML_KEY`], then awaits the
/// descriptor's loader. The only DOM access is the read; mounting is
/// the caller's responsibility.
pub async fn prepare_component(
	descriptor: &ComponentDescriptor,
) -> Result<PreparedComponent, HydrationError> {
	let container = document()
		.get_element_by_id(&descriptor.id)
		.ok_or_else(|| HydrationError::ContainerNotFound(descriptor.id.clone()))?;

	let mut props = parse_props(&descriptor.id, container.get_attribute(PROPS_ATTR).as_deref())?;
	merge_children(&mut props, container.get_attribute(CHILDREN_ATTR).as_deref());

	let render = descriptor.load().await?;

	Ok(PreparedComponent {
		container,
		props,
		render,
	})
}

/// Parses a `data-props` payload. An absent or empty attribute means
/// no props; anything else must be a JSON object.
fn parse_props(id: &str, raw: Option<&str>) -> Result<Props, HydrationError> {
	let raw = match raw {
		None | Some("") => return Ok(Props::new()),
		Some(raw) => raw,
	};

	let value: Value = serde_json::from_str(raw).map_err(|err| HydrationError::PropsParse {
		id: id.to_string(),
		reason: err.to_string(),
	})?;

	match value {
		Value::Object(map) => Ok(map),
		other => Err(HydrationError::PropsParse {
			id: id.to_string(),
			reason: format!("expected a JSON object, found `{other}`"),
		}),
	}
}

/// Projects children markup into the props under [`INNER_HTML_KEY`].
/// Empty markup counts as absent, matching the transpiler's output.
fn merge_children(props: &mut Props, children: Option<&str>) {
	let Some(children) = children.filter(|markup| !markup.is_empty()) else {
		return;
	};

	let mut wrapper = Props::new();
	wrapper.insert(
		RAW_HTML_FIELD.to_string(),
		Value::String(children.to_string()),
	);
	props.insert(INNER_HTML_KEY.to_string(), Value::Object(wrapper));
}
