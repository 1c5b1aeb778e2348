use std::cell::Cell;

use clipqueue_core::ProgressSink;
use engine_logging::{engine_debug, engine_info};

/// Prints status lines to stdout and mirrors them into the log.
///
/// Percent updates are printed only when the whole-number value changes.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    last_percent: Cell<Option<u32>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for ConsoleProgress {
    fn status(&self, message: &str) {
        engine_info!("{}", message);
        println!("{message}");
    }

    fn percent(&self, value: f64) {
        let rounded = value.clamp(0.0, 100.0).round() as u32;
        if self.last_percent.replace(Some(rounded)) == Some(rounded) {
            return;
        }
        engine_debug!("Progress {:.1}%", value);
        println!("[{rounded:>3}%]");
    }
}
