use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::registry::Registry;

/// Builds a complete demo page around the switcher: a labeled control with
/// the `off` option plus one numbered option per registry entry, and enough
/// sample content to make a restyle visible. Scripts and the initial
/// selection are applied by the bake pipeline afterwards.
pub fn build_page(registry: &Registry, title: &str, control_class: &str) -> String {
    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="color-scheme" content="light dark";
                title { (title) }
                style { (PreEscaped(builtin::DEMO_CSS)) }
            }
            body class="sws-demo" {
                header class="sws-picker" {
                    label for="sws-picker" { "Stylesheet:" }
                    select id="sws-picker" class=(control_class) {
                        option value="off" { "off" }
                        @for (i, entry) in registry.entries().iter().enumerate() {
                            option value=(i) { (entry_label(entry)) }
                        }
                    }
                }
                main class="sws-sample" {
                    h1 { (title) }
                    p {
                        "Pick a stylesheet above. The choice swaps a single "
                        code { "<link>" }
                        " element in the document head; "
                        code { "off" }
                        " falls back to the base styles."
                    }
                    blockquote {
                        "Every entry in the registry is addressed by its position, "
                        "so the control's numeric values map straight onto it."
                    }
                    ul {
                        @for (i, entry) in registry.entries().iter().enumerate() {
                            li { code { (i) } " → " (entry) }
                        }
                    }
                    pre {
                        code { "curl -s " (sample_entry(registry)) " | head" }
                    }
                }
            }
        }
    };
    markup.into_string()
}

fn sample_entry(registry: &Registry) -> &str {
    registry.entries().first().map(String::as_str).unwrap_or("styles.css")
}

/// Trailing file name of an entry, for option labels. Falls back to the
/// whole entry when there is no path to speak of.
fn entry_label(entry: &str) -> &str {
    let path = entry.split(['?', '#']).next().unwrap_or(entry);
    match path.rsplit('/').find(|seg| !seg.is_empty()) {
        Some(name) => name,
        None => entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchiki::traits::TendrilSink as _;

    fn registry() -> Registry {
        Registry::from_urls(vec![
            "https://cdn.example.com/themes/plain.css?v=3".to_string(),
            "fancy.css".to_string(),
        ])
    }

    #[test]
    fn labels_use_trailing_file_names() {
        assert_eq!(entry_label("https://cdn.example.com/themes/plain.css?v=3"), "plain.css");
        assert_eq!(entry_label("fancy.css"), "fancy.css");
        assert_eq!(entry_label("/static/a.css#frag"), "a.css");
        assert_eq!(entry_label("https://cdn.example.com/"), "cdn.example.com");
    }

    #[test]
    fn page_carries_the_control_and_all_options() {
        let html = build_page(&registry(), "Theme playground", "swap_stylesheets");
        let doc = kuchiki::parse_html().one(html.as_str());

        let select = doc.select_first("select.swap_stylesheets").unwrap();
        let options: Vec<(String, String)> = select
            .as_node()
            .select("option")
            .unwrap()
            .map(|o| {
                let value = o.attributes.borrow().get("value").unwrap_or("").to_string();
                (value, o.as_node().text_contents())
            })
            .collect();

        assert_eq!(options.len(), 3);
        assert_eq!(options[0].0, "off");
        assert_eq!(options[1], ("0".to_string(), "plain.css".to_string()));
        assert_eq!(options[2], ("1".to_string(), "fancy.css".to_string()));
    }

    #[test]
    fn page_has_no_marker_or_scripts_before_baking() {
        let html = build_page(&registry(), "Theme playground", "swap_stylesheets");
        let doc = kuchiki::parse_html().one(html.as_str());
        assert!(doc.select_first("link").is_err());
        assert!(doc.select_first("script").is_err());
        assert!(doc.select_first("style").is_ok());
    }
}
