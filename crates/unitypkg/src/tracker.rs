use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;
use unitypkg_archive::Progress;

/// Resolution of the bar; fractions are scaled onto this range.
const PB_LEN: u64 = 1000;

const PB_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {percent}%";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<ProgressStyle> = Lazy::new(|| {
    ProgressStyle::with_template(PB_STYLE)
        .map(|style| style.tick_chars(TICK).progress_chars(PB_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Terminal rendering of extraction progress.
#[derive(Clone)]
pub struct ProgressTracker {
    pb: ProgressBar,
}

impl ProgressTracker {
    pub fn new(hidden: bool) -> Self {
        let pb = ProgressBar::new(PB_LEN);
        if hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_style(PB_TEMPLATE.clone());
        Self { pb }
    }

    pub fn update(&self, progress: Progress) {
        if let Some(fraction) = progress.fraction() {
            self.pb.set_position(scaled(fraction));
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

fn scaled(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * PB_LEN as f64).round() as u64
}
