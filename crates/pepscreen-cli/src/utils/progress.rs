use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pepscreen::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);
const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {prefix:.bold} {msg}";
const BAR_TEMPLATE: &str = "{prefix:.bold} [{bar:36.green/white}] {pos}/{len} {msg}";

/// Renders round progress on stderr: a spinner while a round sets up, a bar while it
/// scores, and one summary line per finished round.
#[derive(Clone)]
pub struct RoundProgress {
    bar: ProgressBar,
}

impl RoundProgress {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        bar.finish_and_clear();
        Self { bar }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        Box::new(move |event| render(&bar, event))
    }
}

impl Default for RoundProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn style(template: &str, fallback: fn() -> ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| fallback())
}

fn render(bar: &ProgressBar, event: Progress) {
    match event {
        Progress::PhaseStart { name } => {
            bar.reset();
            bar.set_length(0);
            bar.set_style(style(SPINNER_TEMPLATE, ProgressStyle::default_spinner));
            bar.set_prefix(name);
            bar.set_message("preparing");
            bar.enable_steady_tick(TICK);
        }
        Progress::TaskStart { total } => {
            bar.disable_steady_tick();
            bar.set_style(style(BAR_TEMPLATE, ProgressStyle::default_bar).progress_chars("=> "));
            bar.set_length(total);
            bar.set_position(0);
            bar.set_message("scoring");
        }
        Progress::TaskIncrement => bar.inc(1),
        Progress::TaskFinish => {
            if let Some(total) = bar.length() {
                bar.set_position(total);
            }
        }
        Progress::RoundFinished {
            round,
            accepted,
            rejected,
        } => bar.println(format!("✓ {round}: {accepted} kept, {rejected} dropped")),
        Progress::Message(text) => bar.println(format!("! {text}")),
        Progress::PhaseFinish => {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
