
use indicatif::{ProgressBar, ProgressState, ProgressStyle};

/// Shared function to pull our progress bar styling
pub fn get_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}); ETA: {eta_precise}; Speed: {per_sec} {msg}")
        .unwrap()
        .with_key("percent", |state: &ProgressState, w: &mut dyn std::fmt::Write| write!(w, "{:.1}%", state.fraction()*100.0).unwrap())
        .with_key("per_sec", |state: &ProgressState, w: &mut dyn std::fmt::Write| write!(w, "{:.0}/s", state.per_sec()).unwrap())
        .progress_chars("##-")
}

/// Progress bar for line-oriented ingestion; `expected_lines` is only an estimate, so the bar may stop early or overrun
pub fn line_progress_bar(expected_lines: usize, message: &str) -> ProgressBar {
    ProgressBar::new(expected_lines as u64)
        .with_style(get_progress_style())
        .with_message(message.to_string())
}
