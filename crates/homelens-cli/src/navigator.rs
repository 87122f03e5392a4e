//! Report hand-off from the engine to the UI loop

use anyhow::Context;
use homelens_chat::Navigator;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;

/// Forwards the report payload to whoever owns the screen
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Value>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn open_report(&self, payload: Value) {
        if self.tx.send(payload).is_err() {
            tracing::warn!("report opened after the screen went away");
        }
    }
}

/// The report view: print the payload, or write it to `out`
pub fn write_report(payload: &Value, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(payload)?;
    match out {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("writing report to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_is_forwarded() {
        let (navigator, mut rx) = ChannelNavigator::new();
        navigator.open_report(json!({"type": "투자형"}));
        assert_eq!(rx.try_recv().unwrap(), json!({"type": "투자형"}));
    }

    #[test]
    fn test_closed_receiver_does_not_panic() {
        let (navigator, rx) = ChannelNavigator::new();
        drop(rx);
        navigator.open_report(json!(1));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let payload = json!({"score": 87, "tags": ["역세권"]});
        write_report(&payload, Some(&path)).unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, payload);
    }
}
