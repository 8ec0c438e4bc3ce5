use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Options for launching a browser session.
pub struct SessionOptions {
    /// Resolved path to the browser executable.
    pub executable: PathBuf,
    /// Profile directory handed to the browser.
    pub profile_dir: PathBuf,
    /// Run with a visible window instead of headless.
    pub headed: bool,
}

/// An exclusively owned browser with a single page.
///
/// The session must be closed on every exit path; the caller acquires it
/// before any page work and releases it unconditionally afterwards.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch the browser and open a blank page.
    pub async fn launch(options: &SessionOptions) -> Result<Self> {
        tracing::info!("launching browser: {}", options.executable.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(options.executable.clone())
            .user_data_dir(&options.profile_dir)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--window-size=1920,1080")
            .arg("--incognito");
        if options.headed {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| Error::Browser(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler stream must be polled for any CDP command to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate the page and wait for the load to settle.
    pub async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!("navigating to {url}");
        self.page.goto(url).await?;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    /// Current page URL, empty string when none is available.
    pub async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    /// Poll for an element until it appears or the timeout elapses.
    ///
    /// A missing element is not an error; session-level failures are.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Element>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                return Ok(Some(element));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    /// Type text into an element and submit it with Enter.
    pub async fn submit_text(&self, element: &Element, text: &str) -> Result<()> {
        element
            .click()
            .await?
            .type_str(text)
            .await?
            .press_key("Enter")
            .await?;
        Ok(())
    }

    /// Close the page and shut the browser down.
    ///
    /// The child process is reaped and the handler task stopped even when
    /// the close command itself fails.
    pub async fn close(mut self) -> Result<()> {
        tracing::info!("closing browser session");
        let _ = self.page.close().await;
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}
