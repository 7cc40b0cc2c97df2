use std::fmt::Write;

use crate::models::{Prediction, Probabilities};

pub const BAR_WIDTH: usize = 40;

/// Bar colours by class index, cycled when there are more labels.
pub const PALETTE: [(u8, u8, u8); 3] = [(0xFF, 0x6F, 0x61), (0x6B, 0x5B, 0x95), (0x88, 0xB0, 0x4B)];

const RESET: &str = "\x1b[0m";

fn paint(text: &str, index: usize) -> String {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    format!("\x1b[38;2;{r};{g};{b}m{text}{RESET}")
}

pub fn glyph(label: &str) -> &'static str {
    match label {
        "chicken" => "🐔",
        "slon" => "🐘",
        "horse" => "🐎",
        _ => "❓",
    }
}

pub fn headline(prediction: &Prediction) -> String {
    format!(
        "Predicted class: {} {}",
        glyph(&prediction.predicted_class),
        prediction.predicted_class
    )
}

/// Horizontal bar per label on a fixed `[0, 1]` axis, in response order.
/// With `color` set, each bar gets a 24-bit ANSI colour from [`PALETTE`].
pub fn bar_chart(probabilities: &Probabilities, width: usize, color: bool) -> String {
    let label_width = probabilities
        .labels()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (index, (label, p)) in probabilities.iter().enumerate() {
        let clamped = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        let filled = ((clamped * width as f32).round() as usize).min(width);
        let bar = "█".repeat(filled);
        let bar = if color && filled > 0 { paint(&bar, index) } else { bar };
        let _ = writeln!(
            out,
            "{label:>label_width$} |{}{}| {:.2}%",
            bar,
            " ".repeat(width - filled),
            p * 100.0
        );
    }
    out
}

pub fn render(prediction: &Prediction, width: usize, color: bool) -> String {
    format!(
        "{}\n\nClass probabilities\n{}",
        headline(prediction),
        bar_chart(&prediction.probabilities, width, color)
    )
}
