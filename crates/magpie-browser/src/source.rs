use crate::{BrowserSession, Error, Result};
use async_trait::async_trait;
use chromiumoxide::page::Page;
use magpie_core::RawPost;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

const SEARCH_URL: &str = "https://x.com/search";
const SEARCH_SETTLE: Duration = Duration::from_secs(7);
const NUDGE_SETTLE: Duration = Duration::from_secs(2);
const CONTENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One snapshot pass over every post article currently in the DOM.
///
/// Extraction runs entirely in the page so one round-trip yields the whole
/// batch; a malformed article contributes nulls instead of failing the pass.
const EXTRACT_POSTS_JS: &str = r#"
(() => {
  const counter = (article, name) => {
    const el = article.querySelector(
      '[data-testid="' + name + '"] span[data-testid="app-text-transition-container"] span'
    );
    return el && el.textContent ? el.textContent : null;
  };
  const posts = [];
  for (const article of document.querySelectorAll('article[data-testid="tweet"]')) {
    try {
      const link = article.querySelector('a[href*="/status/"]');
      const handle = Array.from(article.querySelectorAll('span'))
        .find((s) => s.textContent.startsWith('@'));
      const text = article.querySelector('div[data-testid="tweetText"]');
      const time = article.querySelector('time');
      posts.push({
        url: link ? link.href : null,
        username: handle ? handle.textContent : null,
        content: text ? text.innerText : null,
        timestamp: time ? time.getAttribute('datetime') : null,
        replies: counter(article, 'reply'),
        retweets: counter(article, 'retweet'),
        likes: counter(article, 'like'),
      });
    } catch (e) {
      // skip this article
    }
  }
  return posts;
})()
"#;

const HAS_CONTENT_JS: &str =
    r#"document.querySelector('article[data-testid="tweet"]') !== null"#;
const SCROLL_TO_END_JS: &str = "window.scrollTo(0, document.body.scrollHeight)";
const SCROLL_POSITION_JS: &str = "window.pageYOffset";

/// A scrollable stream of post elements.
///
/// The collector only talks to this trait, so its termination and dedup
/// behavior can be exercised against a scripted source in tests.
#[async_trait]
pub trait ContentSource {
    /// Wait (bounded) until at least one post element is present.
    /// `false` means nothing appeared before the timeout.
    async fn await_content(&mut self, timeout: Duration) -> Result<bool>;

    /// Snapshot every currently visible post element.
    async fn visible_posts(&mut self) -> Result<Vec<RawPost>>;

    /// Trigger loading of further content.
    async fn scroll_to_end(&mut self) -> Result<()>;

    /// Current vertical scroll position, used to detect exhaustion.
    async fn scroll_position(&mut self) -> Result<f64>;
}

/// Live search-results timeline on the target site.
pub struct LiveTimeline {
    page: Page,
}

impl LiveTimeline {
    /// Navigate the session to keyword search results and nudge the page
    /// so the first batch of content renders.
    pub async fn open_search(session: &BrowserSession, query: &str) -> Result<Self> {
        let url = Url::parse_with_params(SEARCH_URL, &[("q", query), ("src", "typed_query")])
            .map_err(|e| Error::Browser(format!("invalid search query: {e}")))?;

        tracing::info!("searching for \"{query}\"");
        session.goto(url.as_str()).await?;
        tokio::time::sleep(SEARCH_SETTLE).await;

        let timeline = Self {
            page: session.page().clone(),
        };
        timeline.eval_unit("window.scrollTo(0, 200)").await?;
        tokio::time::sleep(NUDGE_SETTLE).await;

        Ok(timeline)
    }

    async fn eval_unit(&self, script: &str) -> Result<()> {
        self.page.evaluate(script).await?;
        Ok(())
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        self.page
            .evaluate(script)
            .await?
            .into_value()
            .map_err(|e| Error::Cdp(format!("failed to decode evaluation result: {e}")))
    }
}

#[async_trait]
impl ContentSource for LiveTimeline {
    async fn await_content(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval::<bool>(HAS_CONTENT_JS).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(CONTENT_POLL_INTERVAL).await;
        }
    }

    async fn visible_posts(&mut self) -> Result<Vec<RawPost>> {
        self.eval(EXTRACT_POSTS_JS).await
    }

    async fn scroll_to_end(&mut self) -> Result<()> {
        self.eval_unit(SCROLL_TO_END_JS).await
    }

    async fn scroll_position(&mut self) -> Result<f64> {
        self.eval(SCROLL_POSITION_JS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BrowserFinder, ProfileManager, SessionOptions};

    // A single synthetic post article matching the selectors the live
    // extraction script uses.
    const FIXTURE_HTML: &str = r#"data:text/html,
        <article data-testid="tweet">
          <span>@tester</span>
          <a href="https://x.com/tester/status/4242">permalink</a>
          <div data-testid="tweetText">synthetic post body</div>
          <time datetime="2024-03-01T12:00:00.000Z">Mar 1</time>
        </article>"#;

    #[tokio::test]
    #[ignore] // Requires a Chromium-family browser to be installed
    async fn test_live_extraction_against_fixture_page() {
        let executable = BrowserFinder::new(None).find().expect("no browser found");
        let profile = ProfileManager::temporary().unwrap();
        let session = BrowserSession::launch(&SessionOptions {
            executable,
            profile_dir: profile.path().to_path_buf(),
            headed: false,
        })
        .await
        .expect("failed to launch browser");

        session.goto(FIXTURE_HTML).await.expect("navigation failed");

        let mut timeline = LiveTimeline {
            page: session.page().clone(),
        };

        assert!(timeline
            .await_content(Duration::from_secs(5))
            .await
            .unwrap());

        let raw = timeline.visible_posts().await.unwrap();
        assert_eq!(raw.len(), 1);

        let post = raw[0].clone().into_post().unwrap();
        assert_eq!(post.id, "4242");
        assert_eq!(post.username, "@tester");
        assert_eq!(post.content, "synthetic post body");
        assert_eq!(post.replies, "0");

        session.close().await.expect("close failed");
    }
}
