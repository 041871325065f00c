use anyhow::Context as _;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

use crate::builtin;
use crate::registry::Registry;
use crate::switcher::{detach_by_id, html_escape_attr};

/// Id of the injected script that defines the page-global `stylesheets`
/// registry (kept as a global so legacy page scripts can still read it).
pub const REGISTRY_SCRIPT_ID: &str = "swap-stylesheets-registry";
/// Id of the injected script carrying the switcher runtime.
pub const RUNTIME_SCRIPT_ID: &str = "swap-stylesheets-runtime";

/// Wires the runtime into the document: one script defining the registry
/// global, one binding the swap to control change events and running it
/// once on DOM ready. Re-injection replaces both scripts in place, never
/// duplicates them.
pub fn inject_runtime(
    document: &NodeRef,
    registry: &Registry,
    marker_id: &str,
    control_class: &str,
) -> anyhow::Result<()> {
    detach_by_id(document, REGISTRY_SCRIPT_ID);
    detach_by_id(document, RUNTIME_SCRIPT_ID);

    let payload = serde_json::to_string(registry.entries()).context("serialize registry")?;
    let registry_js = format!("var stylesheets = {};", script_safe(&payload));

    let runtime_js = builtin::SWITCHER_JS
        .replace("__MARKER_ID__", &script_safe(&json_string(marker_id)?))
        .replace("__CONTROL_CLASS__", &script_safe(&json_string(control_class)?));

    let body = document
        .select_first("body")
        .ok()
        .context("document has no <body> element")?;
    body.as_node()
        .append(make_script(REGISTRY_SCRIPT_ID, &registry_js));
    body.as_node()
        .append(make_script(RUNTIME_SCRIPT_ID, &runtime_js));
    Ok(())
}

fn json_string(s: &str) -> anyhow::Result<String> {
    serde_json::to_string(s).context("serialize script parameter")
}

// A literal `</` inside inline script text would end the element early in a
// browser; `<\/` is the equivalent JSON/JS escape.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn make_script(id: &str, text: &str) -> NodeRef {
    let frag = format!("<script id=\"{}\"></script>", html_escape_attr(id));
    let doc = kuchiki::parse_html().one(frag);
    let script = doc.select_first("script").unwrap().as_node().clone();
    script.append(NodeRef::new_text(text));
    script
}
