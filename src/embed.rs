use anyhow::Context as _;
use base64::Engine as _;

use crate::fetcher::Fetcher;
use crate::verify::EntrySource;

/// Loads a resolved stylesheet and returns it as a `data:text/css;base64`
/// URI, so the marker link works without touching the original location.
/// The bytes are carried opaquely; nothing inside the stylesheet is
/// rewritten.
pub async fn data_uri_for(source: &EntrySource, fetcher: &Fetcher) -> anyhow::Result<(String, usize)> {
    let bytes = match source {
        EntrySource::Inline(uri) => return Ok((uri.clone(), 0)),
        EntrySource::Local(path) => std::fs::read(path)
            .with_context(|| format!("read stylesheet {}", path.display()))?,
        EntrySource::Remote(url) => {
            let (bytes, _content_type) = fetcher
                .get_bytes(url.clone())
                .await
                .with_context(|| format!("download stylesheet {}", url))?;
            bytes.to_vec()
        }
    };

    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok((format!("data:text/css;base64,{}", b64), bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeds_a_local_stylesheet() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("theme.css");
        std::fs::write(&path, "body { color: teal }").unwrap();

        let fetcher = Fetcher::new("test-agent", 1).unwrap();
        let (uri, size) = data_uri_for(&EntrySource::Local(path), &fetcher)
            .await
            .unwrap();
        assert!(uri.starts_with("data:text/css;base64,"));
        assert_eq!(size, "body { color: teal }".len());

        let b64 = uri.strip_prefix("data:text/css;base64,").unwrap();
        let decoded = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        assert_eq!(decoded, b"body { color: teal }");
    }

    #[tokio::test]
    async fn inline_entries_pass_through() {
        let fetcher = Fetcher::new("test-agent", 1).unwrap();
        let source = EntrySource::Inline("data:text/css;base64,Lg==".to_string());
        let (uri, size) = data_uri_for(&source, &fetcher).await.unwrap();
        assert_eq!(uri, "data:text/css;base64,Lg==");
        assert_eq!(size, 0);
    }

    #[tokio::test]
    async fn missing_local_stylesheet_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new("test-agent", 1).unwrap();
        let source = EntrySource::Local(tmp.path().join("absent.css"));
        assert!(data_uri_for(&source, &fetcher).await.is_err());
    }
}
