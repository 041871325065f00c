use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{
    HumanBytes, HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle,
};

pub struct Progress {
    enabled: bool,
    start: Instant,

    // UI
    mp: Option<MultiProgress>,
    stage: ProgressBar,
    fetches: ProgressBar,

    // Counters
    fetch_done: AtomicU64,
    fetch_bytes: AtomicU64,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let start = Instant::now();

        if !enabled {
            return Arc::new(Self {
                enabled: false,
                start,
                mp: None,
                stage: ProgressBar::hidden(),
                fetches: ProgressBar::hidden(),
                fetch_done: AtomicU64::new(0),
                fetch_bytes: AtomicU64::new(0),
            });
        }

        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

        let stage = mp.add(ProgressBar::new_spinner());
        stage.set_style(
            ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]").unwrap(),
        );
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("准备开始");

        let fetches = mp.add(ProgressBar::new(0));
        fetches.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        fetches.set_message("样式表");

        Arc::new(Self {
            enabled: true,
            start,
            mp: Some(mp),
            stage,
            fetches,
            fetch_done: AtomicU64::new(0),
            fetch_bytes: AtomicU64::new(0),
        })
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn set_fetch_total(&self, total: usize) {
        if self.enabled {
            self.fetches.set_length(total as u64);
        }
    }

    pub fn add_fetched(&self, bytes: usize) {
        self.fetch_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn fetch_done(&self, label: &str) {
        self.fetch_done.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.fetches.inc(1);
            let bytes = self.fetch_bytes.load(Ordering::Relaxed);
            self.fetches
                .set_message(format!("{} | {}", label, HumanBytes(bytes)));
        }
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.stage.finish_with_message("完成");
        self.fetches.finish_and_clear();
        if let Some(mp) = &self.mp {
            // Best effort: ensure the last render flushes.
            let _ = mp.println(format!("Done in {}", HumanDuration(self.start.elapsed())));
        }
    }
}
