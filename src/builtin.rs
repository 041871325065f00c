/// Client-side switcher runtime. `__MARKER_ID__` and `__CONTROL_CLASS__`
/// are replaced with JSON-quoted strings at injection time.
pub const SWITCHER_JS: &str = r#"(function () {
  var markerId = __MARKER_ID__;
  var controlClass = __CONTROL_CLASS__;

  function swap() {
    var existing = document.getElementById(markerId);
    if (existing && existing.parentNode) {
      existing.parentNode.removeChild(existing);
    }
    var controls = document.getElementsByClassName(controlClass);
    if (!controls.length) return;
    var value = controls[0].value;
    if (value === "off") return;
    var href = typeof stylesheets !== "undefined" ? stylesheets[Number(value)] : undefined;
    if (typeof href !== "string") return;
    var link = document.createElement("link");
    link.type = "text/css";
    link.id = markerId;
    link.rel = "stylesheet";
    link.href = href;
    document.head.appendChild(link);
  }

  function init() {
    var controls = document.getElementsByClassName(controlClass);
    for (var i = 0; i < controls.length; i++) {
      controls[i].addEventListener("change", swap);
    }
    swap();
  }

  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", init);
  } else {
    init();
  }
})();"#;

pub const DEMO_CSS: &str = r#":root {
  color-scheme: light dark;
}
body.sws-demo {
  margin: 0 auto;
  max-width: 46rem;
  padding: 0 1rem 3rem;
  font-family: system-ui, sans-serif;
  line-height: 1.5;
}
.sws-picker {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  padding: 0.75rem 0;
  border-bottom: 1px solid #8884;
}
.sws-picker select {
  font: inherit;
  padding: 0.15rem 0.3rem;
}
.sws-sample blockquote {
  margin: 1rem 0;
  padding: 0.25rem 1rem;
  border-left: 4px solid #8886;
}
.sws-sample pre {
  padding: 0.75rem;
  overflow-x: auto;
  background: #8881;
}
"#;
