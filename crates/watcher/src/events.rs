use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

/// Tab/window observation event, as delivered by the browser bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TabEvent {
    /// A tab became the active tab.
    Activated { url: String },
    /// The active tab finished loading a new URL.
    Updated { url: String },
    /// Window focus moved; `url` is the newly focused active tab, absent
    /// when every browser window lost focus.
    FocusChanged { url: Option<String> },
}

/// Feeds newline-delimited JSON tab events into the driver channel, one
/// event per line. Unparseable lines are logged and skipped. Returns on end
/// of input or when the driver hangs up.
pub async fn read_events<R>(input: R, sender: mpsc::Sender<TabEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<TabEvent>(line) {
                    Ok(event) => {
                        if sender.send(event).await.is_err() {
                            return;
                        }
                    }
                    Err(err) => warn!("unparseable tab event: {err}"),
                }
            }
            Ok(None) => return,
            Err(err) => {
                warn!("event stream read failed: {err}");
                return;
            }
        }
    }
}
