use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE_BAR: &str = "{spinner:.cyan} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar on stderr for a batch of directory analyses.
pub struct AnalysisProgress {
    bar: ProgressBar,
    failed: usize,
}

impl AnalysisProgress {
    pub fn new(total: usize) -> Self {
        let bar = if total > 1 {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE_BAR)
                .expect("valid progress template")
                .progress_chars("█▓▒░  "),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar, failed: 0 }
    }

    pub fn start(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    pub fn done(&self) {
        self.bar.inc(1);
    }

    pub fn failed(&mut self) {
        self.failed += 1;
        self.bar.inc(1);
    }

    /// Clear the bar and return how many directories failed.
    pub fn finish(self) -> usize {
        self.bar.finish_and_clear();
        self.failed
    }
}
