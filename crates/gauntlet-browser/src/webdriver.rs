use crate::{Error, Result};
use crate::handle::DriverHandle;
use fantoccini::ClientBuilder;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::runtime::Runtime;

/// A [`DriverHandle`] backed by a WebDriver session (fantoccini).
///
/// Covers local browsers reached through chromedriver / geckodriver as well
/// as remote hub endpoints. The async client is driven by an owned
/// current-thread runtime, so every operation is a plain blocking call.
pub struct WebDriverSession {
    runtime: Runtime,
    client: Option<fantoccini::Client>,
    // Keeps the empty bookmarks file alive for the lifetime of a Firefox
    // session; deleted when the session is dropped.
    _bookmarks: Option<NamedTempFile>,
}

impl WebDriverSession {
    /// Open a new session against a WebDriver endpoint.
    pub fn connect(endpoint: &str, capabilities: Map<String, Value>) -> Result<Self> {
        Self::connect_with_bookmarks(endpoint, capabilities, None)
    }

    pub(crate) fn connect_with_bookmarks(
        endpoint: &str,
        capabilities: Map<String, Value>,
        bookmarks: Option<NamedTempFile>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        tracing::debug!(endpoint, "connecting WebDriver session");
        let client = runtime.block_on(
            ClientBuilder::native()
                .capabilities(capabilities)
                .connect(endpoint),
        )?;
        tracing::info!(endpoint, "WebDriver session established");

        Ok(Self {
            runtime,
            client: Some(client),
            _bookmarks: bookmarks,
        })
    }

    fn client(&self) -> Result<&fantoccini::Client> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::Session("session already closed".to_string()))
    }
}

impl DriverHandle for WebDriverSession {
    fn goto(&mut self, url: &str) -> Result<()> {
        let client = self.client()?;
        self.runtime.block_on(client.goto(url))?;
        Ok(())
    }

    fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.execute(script, args))?)
    }

    fn screenshot(&mut self) -> Result<Vec<u8>> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.screenshot())?)
    }

    fn current_url(&mut self) -> Result<String> {
        let client = self.client()?;
        let url = self.runtime.block_on(client.current_url())?;
        Ok(url.to_string())
    }

    fn quit(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            self.runtime.block_on(client.close())?;
        }
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = self.runtime.block_on(client.close()) {
                tracing::warn!(error = %e, "error closing leaked WebDriver session");
            }
        }
    }
}

// Session behavior against a live endpoint is covered by the runner's
// integration tests with a fake factory; connecting here would require a
// running chromedriver/geckodriver.
