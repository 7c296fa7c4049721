use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::app::Result;
use crate::crawler::config::SettlePolicy;
use crate::crawler::page::PageSource;

impl SettlePolicy {
    /// Block until the page has had a chance to render `ready_selector`.
    ///
    /// A poll that times out returns normally; the caller finds out through
    /// the missing element when it parses the document.
    pub async fn settle<P: PageSource + ?Sized>(&self, page: &mut P, ready_selector: &str) -> Result<()> {
        let max_wait = self.max_wait();
        match *self {
            Self::Fixed { .. } => {
                tokio::time::sleep(max_wait).await;
            }
            Self::Poll { interval_ms, .. } => {
                let deadline = Instant::now() + max_wait;
                let interval = Duration::from_millis(interval_ms.max(1));
                loop {
                    if page.exists(ready_selector).await? {
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        debug!("Gave up waiting for {} after {:?}", ready_selector, max_wait);
                        return Ok(());
                    }
                    tokio::time::sleep(interval).await;
                }
            }
        }
        Ok(())
    }
}
