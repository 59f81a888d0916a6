use crate::handle::DriverHandle;
use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::{
    EnableParams as RuntimeEnableParams, EventExceptionThrown,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Which browser the headless engine impersonates towards the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatedBrowser {
    Firefox,
    InternetExplorer,
}

impl EmulatedBrowser {
    pub fn user_agent(&self) -> &'static str {
        match self {
            EmulatedBrowser::Firefox => {
                "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0"
            }
            EmulatedBrowser::InternetExplorer => {
                "Mozilla/5.0 (Windows NT 10.0; Trident/7.0; rv:11.0) like Gecko"
            }
        }
    }
}

/// A strict in-process headless browser session over CDP.
///
/// Where a regular driver hides page problems, this one surfaces them:
/// uncaught JavaScript exceptions fail the call that triggered them, and a
/// navigation answered with an HTTP error status fails instead of silently
/// rendering the error page. Caution: a reported script error may be a real
/// one or an artifact of the page not expecting a headless engine.
pub struct HeadlessSession {
    runtime: Runtime,
    browser: Option<Browser>,
    page: Page,
    js_errors: Arc<Mutex<Vec<String>>>,
    document_status: Arc<Mutex<Option<i64>>>,
}

impl HeadlessSession {
    /// Launch a headless browser impersonating the given flavor.
    pub fn launch(flavor: EmulatedBrowser) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let js_errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let document_status: Arc<Mutex<Option<i64>>> = Arc::new(Mutex::new(None));

        let (browser, page) = runtime.block_on(async {
            let config = BrowserConfig::builder().build().map_err(Error::Cdp)?;
            let (browser, mut handler) = Browser::launch(config).await?;

            // The handler task must run for any CDP command to complete; on a
            // current-thread runtime it is polled during every block_on call.
            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!("CDP handler event error (continuing): {}", e);
                    }
                }
            });

            let page = browser.new_page("about:blank").await?;
            page.execute(SetUserAgentOverrideParams::new(flavor.user_agent()))
                .await?;
            page.execute(EnableParams::default()).await?;
            page.execute(RuntimeEnableParams::default()).await?;

            let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
            let sink = js_errors.clone();
            tokio::spawn(async move {
                while let Some(event) = exceptions.next().await {
                    let details = &event.exception_details;
                    let message = details
                        .exception
                        .as_ref()
                        .and_then(|e| e.description.clone())
                        .unwrap_or_else(|| details.text.clone());
                    tracing::debug!(error = %message, "page JavaScript exception");
                    if let Ok(mut errors) = sink.lock() {
                        errors.push(message);
                    }
                }
            });

            let mut responses = page.event_listener::<EventResponseReceived>().await?;
            let slot = document_status.clone();
            tokio::spawn(async move {
                while let Some(event) = responses.next().await {
                    if event.r#type == ResourceType::Document {
                        if let Ok(mut status) = slot.lock() {
                            *status = Some(event.response.status);
                        }
                    }
                }
            });

            tracing::info!(?flavor, "headless session started");
            Ok::<_, Error>((browser, page))
        })?;

        Ok(Self {
            runtime,
            browser: Some(browser),
            page,
            js_errors,
            document_status,
        })
    }

    fn clear_observations(&self) {
        if let Ok(mut errors) = self.js_errors.lock() {
            errors.clear();
        }
        if let Ok(mut status) = self.document_status.lock() {
            *status = None;
        }
    }

    /// Fail if the page raised uncaught JavaScript errors since the last
    /// check; drains the collected errors either way.
    fn check_js_errors(&self) -> Result<()> {
        let drained: Vec<String> = match self.js_errors.lock() {
            Ok(mut errors) => errors.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        if drained.is_empty() {
            Ok(())
        } else {
            Err(Error::Page(format!(
                "JavaScript error: {}",
                drained.join("; ")
            )))
        }
    }

    fn document_status(&self) -> Option<i64> {
        self.document_status.lock().ok().and_then(|status| *status)
    }
}

impl DriverHandle for HeadlessSession {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.clear_observations();

        self.runtime.block_on(async {
            self.page.goto(url).await?.wait_for_navigation().await?;
            // Give the listener tasks a chance to drain the queued events
            // before the status and error checks below.
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, Error>(())
        })?;

        if let Some(status) = self.document_status() {
            if status >= 400 {
                return Err(Error::Page(format!("HTTP error {status} loading {url}")));
            }
        }
        self.check_js_errors()
    }

    fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value> {
        // Same calling convention as WebDriver script execution: the body
        // sees its arguments through the implicit `arguments` array.
        let expression = format!(
            "(function() {{ return (function() {{ {script} }}).apply(null, {args}); }})()",
            args = Value::Array(args),
        );

        let result = self.runtime.block_on(async {
            let result = self.page.evaluate(expression).await?;
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, Error>(result)
        })?;

        self.check_js_errors()?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    fn screenshot(&mut self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        Ok(self.runtime.block_on(self.page.screenshot(params))?)
    }

    fn current_url(&mut self) -> Result<String> {
        let url = self.runtime.block_on(self.page.url())?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    fn quit(&mut self) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            self.runtime.block_on(async {
                browser.close().await?;
                browser.wait().await?;
                Ok::<_, Error>(())
            })?;
        }
        Ok(())
    }
}

impl Drop for HeadlessSession {
    fn drop(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            let result = self.runtime.block_on(async {
                browser.close().await?;
                browser.wait().await?;
                Ok::<_, Error>(())
            });
            if let Err(e) = result {
                tracing::warn!(error = %e, "error closing leaked headless session");
            }
        }
    }
}
