use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Transform an existing HTML document.
    Bake,
    /// Emit a fresh demo page built around the switcher.
    Scaffold,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InjectMode {
    /// Inject the runtime scripts when the document has a control.
    Auto,
    /// Always inject the runtime scripts.
    Always,
    /// Never inject; the output only carries the baked selection.
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LinkMode {
    /// Point the marker link at the registry URL.
    Href,
    /// Inline the selected stylesheet as a `data:` URI.
    Embed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Input HTML document (required for `bake` mode).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output path. Written to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Selection to apply instead of the control's current value: `off` or a
    /// zero-based registry index. Equivalent to one change event.
    #[arg(long)]
    pub select: Option<String>,

    /// Stylesheet URL appended to the registry, in order. Repeatable.
    ///
    /// If neither `--stylesheet` nor `--registry` is given in `bake` mode, the
    /// registry is recovered from the input document: the payload script this
    /// tool injects, or a legacy inline `stylesheets = [...]` assignment.
    #[arg(long)]
    pub stylesheet: Vec<String>,

    /// Registry JSON file: a bare array of URLs or `{"stylesheets": [...]}`.
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Base URL for resolving root- and protocol-relative registry entries
    /// (e.g. `https://demo.example.com`). Needed by `--verify` and
    /// `--link-mode embed` for such entries.
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Class naming the switcher control.
    #[arg(long, default_value = "swap_stylesheets")]
    pub control_class: String,

    /// Element id of the managed stylesheet link.
    #[arg(long, default_value = "new_css")]
    pub marker_id: String,

    /// Operation: `bake` or `scaffold`.
    #[arg(long, value_enum, default_value = "bake")]
    pub mode: Mode,

    /// Runtime script injection: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub inject: InjectMode,

    /// Marker link target: `href` or `embed`.
    #[arg(long, value_enum, default_value = "href")]
    pub link_mode: LinkMode,

    /// Verify that every registry entry loads before writing the output.
    #[arg(long)]
    pub verify: bool,

    /// Page title for `scaffold` mode.
    #[arg(long, default_value = "Stylesheet switcher demo")]
    pub title: String,

    /// Max concurrent downloads.
    #[arg(long, default_value_t = 8)]
    pub max_concurrency: usize,

    /// HTTP User-Agent used for downloading stylesheets.
    #[arg(long, default_value = "swap-stylesheets/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}
