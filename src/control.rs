use kuchiki::{ElementData, NodeDataRef, NodeRef};

use crate::selection::Selection;

/// Handle to the switcher control, resolved once per document.
///
/// The original selector takes the first element carrying the control
/// class, whatever its tag; the same rule applies here.
pub struct Control {
    node: NodeDataRef<ElementData>,
}

impl Control {
    pub fn find(document: &NodeRef, control_class: &str) -> anyhow::Result<Self> {
        let Ok(nodes) = document.select("[class]") else {
            anyhow::bail!("no control element with class {:?}", control_class);
        };
        for node in nodes {
            let has_class = node
                .attributes
                .borrow()
                .get("class")
                .map(|c| c.split_ascii_whitespace().any(|t| t == control_class))
                .unwrap_or(false);
            if has_class {
                return Ok(Self { node });
            }
        }
        anyhow::bail!("no control element with class {:?}", control_class);
    }

    pub fn exists(document: &NodeRef, control_class: &str) -> bool {
        Self::find(document, control_class).is_ok()
    }

    /// Static rendition of the live `.value` property: for a `<select>`,
    /// the first selected option's value, else the first option's; for any
    /// other element, its `value` attribute.
    pub fn current_value(&self) -> String {
        if !self.is_select() {
            return self
                .node
                .attributes
                .borrow()
                .get("value")
                .unwrap_or("")
                .to_string();
        }

        let mut first = None;
        if let Ok(options) = self.node.as_node().select("option") {
            for option in options {
                let value = option_value(&option);
                if option.attributes.borrow().contains("selected") {
                    return value;
                }
                if first.is_none() {
                    first = Some(value);
                }
            }
        }
        first.unwrap_or_default()
    }

    /// Moves the `selected` attribute to the option matching `selection`,
    /// so a baked document's control agrees with its head state.
    pub fn set_selection(&self, selection: &Selection) {
        if !self.is_select() {
            tracing::debug!(control = %self.node.name.local.as_ref(), "control is not a select; leaving value as-is");
            return;
        }

        let target = selection.to_string();
        let mut matched = false;
        if let Ok(options) = self.node.as_node().select("option") {
            for option in options {
                if option_value(&option) == target {
                    option
                        .attributes
                        .borrow_mut()
                        .insert("selected", "selected".to_string());
                    matched = true;
                } else {
                    option.attributes.borrow_mut().remove("selected");
                }
            }
        }
        if !matched {
            tracing::debug!(%selection, "no option matches the applied selection");
        }
    }

    fn is_select(&self) -> bool {
        self.node.name.local.as_ref() == "select"
    }
}

fn option_value(option: &NodeDataRef<ElementData>) -> String {
    if let Some(value) = option.attributes.borrow().get("value") {
        return value.to_string();
    }
    option.as_node().text_contents().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchiki::traits::TendrilSink as _;

    fn doc(body: &str) -> NodeRef {
        kuchiki::parse_html().one(format!("<html><head></head><body>{}</body></html>", body))
    }

    #[test]
    fn reads_selected_option() {
        let doc = doc(
            r#"<select class="swap_stylesheets">
                 <option value="off">off</option>
                 <option value="0">plain</option>
                 <option value="1" selected>fancy</option>
               </select>"#,
        );
        let control = Control::find(&doc, "swap_stylesheets").unwrap();
        assert_eq!(control.current_value(), "1");
    }

    #[test]
    fn defaults_to_first_option() {
        let doc = doc(
            r#"<select class="swap_stylesheets">
                 <option value="off">off</option>
                 <option value="0">plain</option>
               </select>"#,
        );
        let control = Control::find(&doc, "swap_stylesheets").unwrap();
        assert_eq!(control.current_value(), "off");
    }

    #[test]
    fn option_without_value_uses_text() {
        let doc = doc(
            r#"<select class="swap_stylesheets"><option selected>off</option></select>"#,
        );
        let control = Control::find(&doc, "swap_stylesheets").unwrap();
        assert_eq!(control.current_value(), "off");
    }

    #[test]
    fn non_select_control_reads_value_attribute() {
        let doc = doc(r#"<input class="swap_stylesheets" value="2">"#);
        let control = Control::find(&doc, "swap_stylesheets").unwrap();
        assert_eq!(control.current_value(), "2");
    }

    #[test]
    fn first_matching_element_wins() {
        let doc = doc(
            r#"<select class="swap_stylesheets"><option value="0" selected>a</option></select>
               <select class="swap_stylesheets"><option value="1" selected>b</option></select>"#,
        );
        let control = Control::find(&doc, "swap_stylesheets").unwrap();
        assert_eq!(control.current_value(), "0");
    }

    #[test]
    fn missing_control_is_an_error() {
        let doc = doc("<p>no control here</p>");
        assert!(Control::find(&doc, "swap_stylesheets").is_err());
        assert!(!Control::exists(&doc, "swap_stylesheets"));
    }

    #[test]
    fn set_selection_moves_the_selected_attribute() {
        let doc = doc(
            r#"<select class="swap_stylesheets">
                 <option value="off" selected>off</option>
                 <option value="0">plain</option>
                 <option value="1">fancy</option>
               </select>"#,
        );
        let control = Control::find(&doc, "swap_stylesheets").unwrap();
        control.set_selection(&Selection::Index(1));
        assert_eq!(control.current_value(), "1");

        let selected: Vec<String> = doc
            .select("option[selected]")
            .unwrap()
            .map(|o| option_value(&o))
            .collect();
        assert_eq!(selected, ["1"]);

        control.set_selection(&Selection::Off);
        assert_eq!(control.current_value(), "off");
    }
}
