mod audit;
mod builtin;
mod cli;
mod control;
mod embed;
mod fetcher;
mod inject;
mod progress;
mod registry;
mod scaffold;
mod selection;
mod switcher;
mod verify;

use std::path::Path;

use anyhow::Context as _;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

use cli::Args;
use control::Control;
use fetcher::Fetcher;
use registry::Registry;
use selection::Selection;
use switcher::Switcher;

pub use cli::{Args as CliArgs, InjectMode, LinkMode, Mode, ProgressMode};
pub use registry::Registry as StylesheetRegistry;
pub use selection::Selection as StylesheetSelection;
pub use switcher::{
    DEFAULT_CONTROL_CLASS, DEFAULT_MARKER_ID, SwitchState, Switcher as StylesheetSwitcher,
};

pub async fn run(args: Args) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    let res = match args.mode {
        Mode::Bake => bake(&args, &progress).await,
        Mode::Scaffold => scaffold_page(&args, &progress).await,
    };
    progress.finish();
    res
}

async fn bake(args: &Args, progress: &progress::Progress) -> anyhow::Result<()> {
    let input = args.input.as_deref().context("bake mode requires --input")?;

    progress.set_stage("读取输入");
    let html =
        std::fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let document = kuchiki::parse_html().one(html);

    progress.set_stage("解析样式表清单");
    let registry = resolve_registry(args, Some(&document))?;
    let switcher = Switcher::with_identities(registry, &args.marker_id, &args.control_class);

    progress.set_stage("应用选择");
    let selection = match args.select.as_deref() {
        Some(raw) => {
            let selection: Selection = raw.parse().context("parse --select")?;
            switcher.apply(&document, &selection)?;
            // Keep the control in agreement with the override, as if the
            // user had picked it.
            if let Ok(control) = Control::find(&document, &args.control_class) {
                control.set_selection(&selection);
            }
            selection
        }
        None => switcher
            .initialize(&document)
            .context("initialize from the input document")?,
    };

    finish_document(
        args,
        &switcher,
        &document,
        &selection,
        Some(parent_dir(input)),
        progress,
    )
    .await
}

async fn scaffold_page(args: &Args, progress: &progress::Progress) -> anyhow::Result<()> {
    let registry = resolve_registry(args, None)?;

    progress.set_stage("生成页面");
    let page = scaffold::build_page(&registry, &args.title, &args.control_class);
    let document = kuchiki::parse_html().one(page);
    let switcher = Switcher::with_identities(registry, &args.marker_id, &args.control_class);

    progress.set_stage("应用选择");
    let selection = match args.select.as_deref() {
        Some(raw) => raw.parse().context("parse --select")?,
        None => Selection::Off,
    };
    switcher.apply(&document, &selection)?;
    Control::find(&document, &args.control_class)?.set_selection(&selection);

    finish_document(args, &switcher, &document, &selection, None, progress).await
}

/// Shared tail of both modes: optional verification, link-mode rewrite,
/// script injection, then serialize, audit, and write.
async fn finish_document(
    args: &Args,
    switcher: &Switcher,
    document: &NodeRef,
    selection: &Selection,
    input_dir: Option<&Path>,
    progress: &progress::Progress,
) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(&args.user_agent, args.max_concurrency)?;

    if args.verify {
        progress.set_stage("校验样式表");
        verify::verify_registry(
            switcher.registry(),
            args.base_url.as_ref(),
            input_dir,
            &fetcher,
            progress,
        )
        .await?;
    }

    let want_href = effective_href(args, switcher, selection, input_dir, &fetcher, progress).await?;
    if matches!(args.link_mode, LinkMode::Embed) {
        if let Some(href) = want_href.as_deref() {
            switcher.rewrite_marker_href(document, href)?;
        }
    }

    let should_inject = match args.inject {
        InjectMode::Always => true,
        InjectMode::Never => false,
        InjectMode::Auto => Control::exists(document, &args.control_class),
    };
    if should_inject {
        progress.set_stage("注入脚本");
        inject::inject_runtime(
            document,
            switcher.registry(),
            switcher.marker_id(),
            switcher.control_class(),
        )?;
    }

    progress.set_stage("检查输出");
    let out_html = serialize_document(document)?;
    audit::assert_switched(&out_html, switcher.marker_id(), want_href.as_deref())?;

    progress.set_stage("写入输出");
    write_output(args.out.as_deref(), &out_html)
}

/// The href the emitted marker link must carry: the registry entry itself,
/// or its embedded `data:` form. `None` when no link is expected at all
/// (off, or an out-of-range index that degraded to remove-only).
async fn effective_href(
    args: &Args,
    switcher: &Switcher,
    selection: &Selection,
    input_dir: Option<&Path>,
    fetcher: &Fetcher,
    progress: &progress::Progress,
) -> anyhow::Result<Option<String>> {
    let Selection::Index(i) = *selection else {
        return Ok(None);
    };
    let Some(entry) = switcher.registry().get(i) else {
        return Ok(None);
    };

    match args.link_mode {
        LinkMode::Href => Ok(Some(entry.to_string())),
        LinkMode::Embed => {
            progress.set_stage("内联样式表");
            let source = verify::resolve_entry(entry, args.base_url.as_ref(), input_dir)
                .with_context(|| format!("embed stylesheet [{}] {}", i, entry))?;
            let (uri, bytes) = embed::data_uri_for(&source, fetcher)
                .await
                .with_context(|| format!("embed stylesheet [{}] {}", i, entry))?;
            progress.add_fetched(bytes);
            Ok(Some(uri))
        }
    }
}

fn resolve_registry(args: &Args, document: Option<&NodeRef>) -> anyhow::Result<Registry> {
    if !args.stylesheet.is_empty() {
        if args.registry.is_some() {
            tracing::warn!("--stylesheet is set; ignoring --registry");
        }
        return Ok(Registry::from_urls(args.stylesheet.clone()));
    }

    if let Some(path) = &args.registry {
        return Registry::from_json_file(path);
    }

    if let Some(document) = document {
        if let Some(registry) = Registry::discover_from_document(document) {
            tracing::info!(
                count = registry.len(),
                "recovered stylesheet registry from the document"
            );
            return Ok(registry);
        }
        anyhow::bail!(
            "no stylesheet registry; pass --stylesheet/--registry, or use a page that defines one"
        );
    }

    anyhow::bail!("scaffold mode requires --stylesheet or --registry");
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn serialize_document(document: &NodeRef) -> anyhow::Result<String> {
    let mut out = Vec::new();
    document.serialize(&mut out).context("serialize document")?;
    String::from_utf8(out).context("document not utf-8")
}

fn write_output(out: Option<&Path>, html: &str) -> anyhow::Result<()> {
    use std::io::Write as _;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
            }
            std::fs::write(path, html).with_context(|| format!("write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes()).context("write stdout")?;
            stdout.write_all(b"\n").context("write stdout")
        }
    }
}
