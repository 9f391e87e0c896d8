//! Chromium-backed feed page using chromiumoxide.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use feed_harvest::{FeedPage, NavigationResult, PageError};

/// Environment variable pointing at a Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "FEED_HARVEST_CHROMIUM_PATH";

/// Interval between selector probes while waiting.
const WAIT_POLL: Duration = Duration::from_millis(250);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. FEED_HARVEST_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.feed-harvest/chromium/
    if let Some(home) = dirs::home_dir() {
        let root = home.join(".feed-harvest/chromium");
        let candidates = if cfg!(target_os = "macos") {
            vec![
                root.join("chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                root.join("chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                root.join("chrome"),
            ]
        } else {
            vec![root.join("chrome-linux64/chrome"), root.join("chrome")]
        };
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    // 3. System PATH
    ["google-chrome", "chromium", "chromium-browser"]
        .iter()
        .find_map(|bin| which::which(bin).ok())
}

/// How the browser is launched.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Persistent profile directory, so an existing signed-in session is reused.
    pub user_data_dir: Option<PathBuf>,
    /// Explicit binary; discovered with [`find_chromium`] when unset.
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1440,
            window_height: 900,
            user_data_dir: None,
            chrome_path: None,
        }
    }
}

/// One browser with a single page, driven through [`FeedPage`].
pub struct ChromiumPage {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumPage {
    /// Launch Chromium and open a blank page.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_path = match &options.chrome_path {
            Some(path) => path.clone(),
            None => find_chromium()
                .with_context(|| format!("Chromium not found. Set {CHROMIUM_PATH_ENV} or install Chromium."))?,
        };
        tracing::debug!("using Chromium at {}", chrome_path.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(options.window_width, options.window_height)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-sandbox");
        builder = if options.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        if let Some(dir) = &options.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler: {e}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Close the browser and stop its event loop.
    pub async fn close(mut self) -> Result<()> {
        let _ = self.page.clone().close().await;
        self.browser.close().await.context("failed to close Chromium")?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        Ok(())
    }
}

fn exists_script(selector: &str) -> String {
    let selector = serde_json::to_string(selector).unwrap_or_default();
    format!("document.querySelector({selector}) !== null")
}

#[async_trait]
impl FeedPage for ChromiumPage {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult, PageError> {
        let start = Instant::now();
        let result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;
        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());
                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => Err(PageError::Navigation(e.to_string())),
            Err(_) => Err(PageError::Timeout { ms: timeout_ms }),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<(), PageError> {
        let script = exists_script(selector);
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match self.evaluate(&script).await {
                Ok(serde_json::Value::Bool(true)) => return Ok(()),
                Ok(_) => {}
                Err(e) => tracing::trace!("probing {selector}: {e}"),
            }
            if Instant::now() >= deadline {
                return Err(PageError::Timeout { ms: timeout_ms });
            }
            tokio::time::sleep(WAIT_POLL).await;
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| PageError::Script(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| PageError::Script(format!("failed to convert JS result: {e:?}")))
    }

    async fn content(&self) -> Result<String, PageError> {
        self.page
            .content()
            .await
            .map_err(|e| PageError::Browser(e.to_string()))
    }
}
