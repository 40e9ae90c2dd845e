use std::{io::Write, sync::Arc, time::Duration};

use chrono::Local;

use crate::errlog::ErrorLog;

const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// First 50 characters of a message, newlines collapsed to spaces.
pub const PREVIEW_LEN: usize = 50;

pub fn preview(text: &str) -> String {
    text.chars()
        .take(PREVIEW_LEN)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

/// Class of a detection; selects console highlighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertClass {
    Private,
    Group,
}

impl AlertClass {
    fn tag(self) -> &'static str {
        match self {
            AlertClass::Private => "PM ALERT",
            AlertClass::Group => "GROUP ALERT",
        }
    }

    fn color(self) -> &'static str {
        match self {
            AlertClass::Private => YELLOW,
            AlertClass::Group => RED,
        }
    }
}

/// Where detections go. Implementations must never block or fail detection
/// logic.
pub trait AlertSink: Send + Sync {
    fn alert(&self, class: AlertClass, text: &str);
}

/// Console sink: highlighted tag + local time (minute precision), the alert
/// text, and an audible cue of three short pulses fired off-task.
pub struct ConsoleAlertSink {
    errlog: Arc<ErrorLog>,
}

impl ConsoleAlertSink {
    pub fn new(errlog: Arc<ErrorLog>) -> Self {
        Self { errlog }
    }
}

impl AlertSink for ConsoleAlertSink {
    fn alert(&self, class: AlertClass, text: &str) {
        let ts = Local::now().format("%m-%d %H:%M");
        println!("{}[{} {ts}]{} {text}", class.color(), class.tag(), RESET);

        // Audio must never interrupt detection; run it on its own task and
        // contain any failure. Called from runtime tasks only.
        let errlog = self.errlog.clone();
        tokio::spawn(async move {
            if let Err(e) = audible_cue().await {
                errlog.record(&format!("Error playing sound: {e}"));
            }
        });
    }
}

/// Terminal bell, three pulses.
async fn audible_cue() -> std::io::Result<()> {
    let mut out = std::io::stdout();
    for _ in 0..3 {
        out.write_all(b"\x07")?;
        out.flush()?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    Ok(())
}
