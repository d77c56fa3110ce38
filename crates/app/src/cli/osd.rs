//! Terminal stand-in for the on-screen volume indicator

use std::io::Write;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use volsync_core::domain::display::VolumeDisplay;

const BAR_WIDTH: usize = 16;

/// Prints a level bar and stays "visible" for a fixed duration
///
/// While visible, a notification that would draw the same bar again only
/// extends the visibility window.
pub struct TerminalOsd {
    duration: Duration,
    shown: Mutex<Option<Shown>>,
}

struct Shown {
    until: Instant,
    bar: String,
}

impl TerminalOsd {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            shown: Mutex::new(None),
        }
    }

    /// Restart the visibility window; returns the bar if it needs drawing
    fn show(&self, volume: f32, muted: bool) -> Option<String> {
        let bar = render_bar(volume, muted);
        let now = Instant::now();

        let mut shown = self.shown.lock().unwrap_or_else(PoisonError::into_inner);
        let redraw = match shown.as_ref() {
            Some(current) => now >= current.until || current.bar != bar,
            None => true,
        };
        *shown = Some(Shown {
            until: now + self.duration,
            bar: bar.clone(),
        });

        redraw.then_some(bar)
    }
}

/// One-line level bar, e.g. `[##########------] 63%`
pub fn render_bar(volume: f32, muted: bool) -> String {
    let level = if muted { 0.0 } else { volume.clamp(0.0, 1.0) };
    let filled = (level * BAR_WIDTH as f32).round() as usize;
    let icon = if muted || level == 0.0 { "muted" } else { "vol" };

    format!(
        "{:>5} [{}{}] {:>3.0}%",
        icon,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        level * 100.0
    )
}

impl VolumeDisplay for TerminalOsd {
    fn notify(&self, volume: f32, muted: bool) {
        if let Some(bar) = self.show(volume, muted) {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{}", bar);
        }
    }
}
