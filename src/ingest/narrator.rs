//! Cycling progress captions for a running ingestion.
//!
//! The pipeline gives no real progress signal, so while the webhook call is
//! in flight a small ticker walks through a fixed list of stage captions and
//! publishes the current one on a watch channel. The captions are cosmetic;
//! they say nothing about how far ingestion actually got.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Ticker that cycles stage captions for as long as it is alive.
///
/// The first caption is published synchronously by [`StageNarrator::start`],
/// so a snapshot taken right after an upload begins already shows one.
/// Dropping the narrator stops the ticker and clears the caption; a tick
/// racing the teardown cannot land after the clear.
pub struct StageNarrator {
    ticker: JoinHandle<()>,
    caption: watch::Sender<String>,
    retired: Arc<AtomicBool>,
}

impl StageNarrator {
    pub fn start(
        stages: Vec<String>,
        period: Duration,
        caption: watch::Sender<String>,
    ) -> Self {
        if let Some(first) = stages.first() {
            caption.send_replace(first.clone());
        }

        let retired = Arc::new(AtomicBool::new(false));
        let ticker_caption = caption.clone();
        let ticker_retired = Arc::clone(&retired);
        let ticker = tokio::spawn(async move {
            if stages.len() < 2 {
                return;
            }
            let mut index = 0;
            loop {
                tokio::time::sleep(period).await;
                index = (index + 1) % stages.len();
                // The retired check runs under the channel's lock, so it
                // serializes against the clear in Drop.
                let published = ticker_caption.send_if_modified(|current| {
                    if ticker_retired.load(Ordering::SeqCst) {
                        return false;
                    }
                    current.clone_from(&stages[index]);
                    true
                });
                if !published {
                    return;
                }
            }
        });

        Self {
            ticker,
            caption,
            retired,
        }
    }
}

impl Drop for StageNarrator {
    fn drop(&mut self) {
        // Retire before clearing: any tick already past its sleep sees the
        // flag and publishes nothing.
        self.retired.store(true, Ordering::SeqCst);
        self.ticker.abort();
        self.caption.send_replace(String::new());
    }
}
