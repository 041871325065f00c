use kuchiki::traits::TendrilSink as _;

/// Re-parses emitted HTML and checks the head-state invariants before
/// anything is written: at most one marker element ever; zero when no
/// stylesheet is expected; exactly one well-formed stylesheet link in the
/// head, pointing at the expected href, otherwise.
pub fn assert_switched(html: &str, marker_id: &str, want_href: Option<&str>) -> anyhow::Result<()> {
    let doc = kuchiki::parse_html().one(html);

    let markers: Vec<_> = doc
        .select("[id]")
        .ok()
        .into_iter()
        .flatten()
        .filter(|node| node.attributes.borrow().get("id") == Some(marker_id))
        .collect();

    if markers.len() > 1 {
        anyhow::bail!(
            "switch check failed: {} elements carry the marker id {:?}; expected at most one",
            markers.len(),
            marker_id
        );
    }

    let Some(want) = want_href else {
        if let Some(marker) = markers.first() {
            anyhow::bail!(
                "switch check failed: marker <{}> still present but no stylesheet was expected",
                marker.name.local.as_ref()
            );
        }
        return Ok(());
    };

    let Some(marker) = markers.first() else {
        anyhow::bail!(
            "switch check failed: expected a stylesheet link {:?} with href {:?}, found none",
            marker_id,
            want
        );
    };

    if marker.name.local.as_ref() != "link" {
        anyhow::bail!(
            "switch check failed: marker is <{}>, expected <link>",
            marker.name.local.as_ref()
        );
    }

    let attrs = marker.attributes.borrow();
    if attrs.get("rel") != Some("stylesheet") {
        anyhow::bail!(
            "switch check failed: marker link rel is {:?}, expected \"stylesheet\"",
            attrs.get("rel").unwrap_or("")
        );
    }
    if attrs.get("type") != Some("text/css") {
        anyhow::bail!(
            "switch check failed: marker link type is {:?}, expected \"text/css\"",
            attrs.get("type").unwrap_or("")
        );
    }
    if attrs.get("href") != Some(want) {
        anyhow::bail!(
            "switch check failed: marker link href is {:?}, expected {:?}",
            attrs.get("href").unwrap_or(""),
            want
        );
    }

    let in_head = marker
        .as_node()
        .ancestors()
        .any(|a| a.as_element().map(|e| e.name.local.as_ref() == "head").unwrap_or(false));
    if !in_head {
        anyhow::bail!("switch check failed: marker link is outside <head>");
    }

    Ok(())
}
