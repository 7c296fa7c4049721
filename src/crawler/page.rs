use async_trait::async_trait;

use crate::app::Result;

/// A navigable, rendered document.
///
/// Every rendering side effect of the crawler goes through this trait, so the
/// feed cursor and the extractor can run against a fake document in tests.
#[async_trait]
pub trait PageSource: Send {
    /// Navigate to an absolute URL and wait for it to load
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Serialize the currently rendered document to HTML
    async fn render(&mut self) -> Result<String>;

    /// Scroll the viewport to a vertical offset in pixels
    async fn scroll_to(&mut self, height: f64) -> Result<()>;

    /// Rendered height of the `index`-th element matching `selector`, if it exists yet
    async fn element_height(&mut self, selector: &str, index: usize) -> Result<Option<f64>>;

    /// Move the pointer over the first element matching `selector`.
    ///
    /// Fails with [`HarvestError::ElementNotFound`](crate::app::HarvestError::ElementNotFound)
    /// when nothing matches.
    async fn hover(&mut self, selector: &str) -> Result<()>;

    /// Whether any element matches `selector` right now
    async fn exists(&mut self, selector: &str) -> Result<bool>;

    /// Release the underlying browsing session
    async fn close(&mut self) -> Result<()>;
}
