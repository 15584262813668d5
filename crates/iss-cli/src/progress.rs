use indicatif::{ProgressBar, ProgressStyle};
use iss_core::progress::ProgressReporter;

/// Drives an indicatif bar from per-slice progress.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:16} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        bar.set_message("Detecting spots");
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn begin(&self, total_items: usize) {
        self.bar.set_length(total_items as u64);
        self.bar.set_position(0);
    }

    // Workers finish out of order, so count rather than trust `items_done`.
    fn advance(&self, _items_done: usize) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}
