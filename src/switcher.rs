use anyhow::Context as _;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

use crate::control::Control;
use crate::registry::Registry;
use crate::selection::Selection;

/// Element id of the managed stylesheet link, as the original page used.
pub const DEFAULT_MARKER_ID: &str = "new_css";
/// Class naming the switcher control, as the original page used.
pub const DEFAULT_CONTROL_CLASS: &str = "swap_stylesheets";

/// Applies stylesheet selections to a parsed document.
///
/// The document holds at most one marker link at a time: every `apply`
/// detaches the current one first and appends a replacement only when the
/// selection names an in-range registry entry.
pub struct Switcher {
    registry: Registry,
    marker_id: String,
    control_class: String,
}

/// Observed head state: how many marker elements exist, and the first
/// marker link's href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchState {
    pub markers: usize,
    pub href: Option<String>,
}

impl Switcher {
    pub fn new(registry: Registry) -> Self {
        Self::with_identities(registry, DEFAULT_MARKER_ID, DEFAULT_CONTROL_CLASS)
    }

    pub fn with_identities(
        registry: Registry,
        marker_id: impl Into<String>,
        control_class: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            marker_id: marker_id.into(),
            control_class: control_class.into(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn marker_id(&self) -> &str {
        &self.marker_id
    }

    pub fn control_class(&self) -> &str {
        &self.control_class
    }

    /// One switch operation: detach any existing marker element, then,
    /// unless the selection is `off`, append a fresh stylesheet link for
    /// the selected registry entry to the head.
    ///
    /// An out-of-range index degrades to remove-only: the head ends up
    /// with no marker link and a warning is logged.
    pub fn apply(&self, document: &NodeRef, selection: &Selection) -> anyhow::Result<()> {
        detach_by_id(document, &self.marker_id);

        let index = match selection {
            Selection::Off => return Ok(()),
            Selection::Index(i) => *i,
        };

        let Some(href) = self.registry.get(index) else {
            tracing::warn!(
                index,
                registry_len = self.registry.len(),
                "selection is out of range; no stylesheet applied"
            );
            return Ok(());
        };

        let head = document
            .select_first("head")
            .ok()
            .context("document has no <head> element")?;
        head.as_node().append(make_marker_link(&self.marker_id, href));
        Ok(())
    }

    /// Initial synchronization: resolve the control, parse its current
    /// value, apply it, and report what was applied.
    pub fn initialize(&self, document: &NodeRef) -> anyhow::Result<Selection> {
        let control = Control::find(document, &self.control_class)?;
        let raw = control.current_value();
        let selection: Selection = raw
            .parse()
            .with_context(|| format!("control value {:?}", raw))?;
        self.apply(document, &selection)?;
        Ok(selection)
    }

    /// Repoints the managed link at `href`, keeping its identity and rel.
    pub fn rewrite_marker_href(&self, document: &NodeRef, href: &str) -> anyhow::Result<()> {
        let Ok(nodes) = document.select("link[id]") else {
            anyhow::bail!("no marker link {:?} to rewrite", self.marker_id);
        };
        for node in nodes {
            let mut attrs = node.attributes.borrow_mut();
            if attrs.get("id") == Some(self.marker_id.as_str()) {
                attrs.insert("href", href.to_string());
                return Ok(());
            }
        }
        anyhow::bail!("no marker link {:?} to rewrite", self.marker_id);
    }

    pub fn state(&self, document: &NodeRef) -> SwitchState {
        let mut markers = 0usize;
        let mut href = None;
        if let Ok(nodes) = document.select("[id]") {
            for node in nodes {
                let attrs = node.attributes.borrow();
                if attrs.get("id") != Some(self.marker_id.as_str()) {
                    continue;
                }
                markers += 1;
                if href.is_none() && node.name.local.as_ref() == "link" {
                    href = attrs.get("href").map(|h| h.to_string());
                }
            }
        }
        SwitchState { markers, href }
    }
}

/// Detaches every element carrying `id`, not just the first. Collecting
/// before detaching keeps the traversal valid while the tree changes.
pub(crate) fn detach_by_id(document: &NodeRef, id: &str) {
    let Ok(nodes) = document.select("[id]") else {
        return;
    };
    let matches: Vec<_> = nodes
        .filter(|node| node.attributes.borrow().get("id") == Some(id))
        .collect();
    for node in matches {
        node.as_node().detach();
    }
}

fn make_marker_link(marker_id: &str, href: &str) -> NodeRef {
    let frag = format!(
        "<link type=\"text/css\" id=\"{}\" rel=\"stylesheet\" href=\"{}\">",
        html_escape_attr(marker_id),
        html_escape_attr(href)
    );
    let doc = kuchiki::parse_html().one(frag);
    doc.select_first("link").unwrap().as_node().clone()
}

pub(crate) fn html_escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::from_urls(vec!["a.css".to_string(), "b.css".to_string()])
    }

    fn page(body: &str) -> NodeRef {
        kuchiki::parse_html().one(format!(
            "<html><head><title>t</title></head><body>{}</body></html>",
            body
        ))
    }

    fn control_page(current: &str) -> NodeRef {
        let selected = |v: &str| if v == current { " selected" } else { "" };
        page(&format!(
            r#"<select class="swap_stylesheets">
                 <option value="off"{}>off</option>
                 <option value="0"{}>a</option>
                 <option value="1"{}>b</option>
               </select>"#,
            selected("off"),
            selected("0"),
            selected("1"),
        ))
    }

    #[test]
    fn valid_index_yields_exactly_one_link() {
        let switcher = Switcher::new(registry());
        let doc = page("");
        for i in 0..2u32 {
            switcher.apply(&doc, &Selection::Index(i)).unwrap();
            let state = switcher.state(&doc);
            assert_eq!(state.markers, 1);
            assert_eq!(state.href.as_deref(), switcher.registry().get(i));
        }
    }

    #[test]
    fn off_clears_regardless_of_prior_state() {
        let switcher = Switcher::new(registry());
        let doc = page("");
        switcher.apply(&doc, &Selection::Index(0)).unwrap();
        switcher.apply(&doc, &Selection::Off).unwrap();
        assert_eq!(switcher.state(&doc), SwitchState { markers: 0, href: None });
    }

    #[test]
    fn apply_is_idempotent() {
        let switcher = Switcher::new(registry());
        let doc = page("");
        switcher.apply(&doc, &Selection::Index(1)).unwrap();
        switcher.apply(&doc, &Selection::Index(1)).unwrap();
        let state = switcher.state(&doc);
        assert_eq!(state.markers, 1);
        assert_eq!(state.href.as_deref(), Some("b.css"));

        switcher.apply(&doc, &Selection::Off).unwrap();
        switcher.apply(&doc, &Selection::Off).unwrap();
        assert_eq!(switcher.state(&doc).markers, 0);
    }

    #[test]
    fn sequencing_keeps_only_the_last_selection() {
        let switcher = Switcher::new(registry());
        let doc = page("");
        for (selection, want) in [
            (Selection::Index(1), Some("b.css")),
            (Selection::Off, None),
            (Selection::Index(0), Some("a.css")),
        ] {
            switcher.apply(&doc, &selection).unwrap();
            let state = switcher.state(&doc);
            assert_eq!(state.markers, usize::from(want.is_some()));
            assert_eq!(state.href.as_deref(), want);
        }
    }

    #[test]
    fn out_of_range_degrades_to_remove_only() {
        let switcher = Switcher::new(registry());
        let doc = page("");
        switcher.apply(&doc, &Selection::Index(0)).unwrap();
        switcher.apply(&doc, &Selection::Index(9)).unwrap();
        assert_eq!(switcher.state(&doc).markers, 0);
    }

    #[test]
    fn stale_markers_of_any_tag_are_removed() {
        let switcher = Switcher::new(registry());
        let doc = kuchiki::parse_html().one(
            r#"<html><head>
                 <style id="new_css">body { color: red }</style>
                 <link id="new_css" rel="stylesheet" href="stale.css">
               </head><body></body></html>"#,
        );
        assert_eq!(switcher.state(&doc).markers, 2);
        switcher.apply(&doc, &Selection::Index(0)).unwrap();
        let state = switcher.state(&doc);
        assert_eq!(state.markers, 1);
        assert_eq!(state.href.as_deref(), Some("a.css"));
    }

    #[test]
    fn initialize_applies_the_control_value() {
        let switcher = Switcher::new(registry());

        let doc = control_page("off");
        assert_eq!(switcher.initialize(&doc).unwrap(), Selection::Off);
        assert_eq!(switcher.state(&doc).markers, 0);

        let doc = control_page("1");
        assert_eq!(switcher.initialize(&doc).unwrap(), Selection::Index(1));
        let state = switcher.state(&doc);
        assert_eq!(state.markers, 1);
        assert_eq!(state.href.as_deref(), Some("b.css"));
    }

    #[test]
    fn initialize_without_control_fails() {
        let switcher = Switcher::new(registry());
        let doc = page("<p>plain page</p>");
        assert!(switcher.initialize(&doc).is_err());
    }

    #[test]
    fn link_lands_in_head() {
        let switcher = Switcher::new(registry());
        let doc = page("");
        switcher.apply(&doc, &Selection::Index(0)).unwrap();
        let head = doc.select_first("head").unwrap();
        let in_head = head
            .as_node()
            .select("link")
            .unwrap()
            .any(|l| l.attributes.borrow().get("id") == Some("new_css"));
        assert!(in_head);
    }

    #[test]
    fn marker_href_can_be_rewritten() {
        let switcher = Switcher::new(registry());
        let doc = page("");
        switcher.apply(&doc, &Selection::Index(0)).unwrap();
        switcher
            .rewrite_marker_href(&doc, "data:text/css;base64,Lg==")
            .unwrap();
        let state = switcher.state(&doc);
        assert_eq!(state.href.as_deref(), Some("data:text/css;base64,Lg=="));

        let empty = page("");
        assert!(switcher.rewrite_marker_href(&empty, "x").is_err());
    }
}
