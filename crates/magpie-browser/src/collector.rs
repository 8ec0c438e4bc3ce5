use crate::source::ContentSource;
use magpie_core::{Post, PostSet};
use std::time::Duration;

/// Tuning knobs for a collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Target minimum number of unique posts.
    pub min_posts: usize,
    /// Posts per batch; crossing a batch boundary triggers the courtesy wait.
    pub batch_size: usize,
    /// Courtesy delay after each completed batch, to reduce request rate.
    pub batch_wait: Duration,
    /// Hard ceiling on scroll iterations.
    pub max_scroll_attempts: usize,
    /// Bounded wait for the first post element in each pass.
    pub content_wait: Duration,
    /// Pause after each scroll before re-reading the position.
    pub scroll_pause: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            min_posts: 1000,
            batch_size: 100,
            batch_wait: Duration::from_secs(15),
            max_scroll_attempts: 500,
            content_wait: Duration::from_secs(15),
            scroll_pause: Duration::from_secs(6),
        }
    }
}

/// Why a collection run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `min_posts` unique posts were collected.
    TargetReached,
    /// Scrolling no longer changes position, or no content appeared.
    Exhausted,
    /// `max_scroll_attempts` iterations were used up.
    AttemptLimit,
    /// The browser session failed; collected posts were preserved.
    SessionError(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TargetReached => write!(f, "target count reached"),
            StopReason::Exhausted => write!(f, "source exhausted"),
            StopReason::AttemptLimit => write!(f, "scroll attempt limit reached"),
            StopReason::SessionError(e) => write!(f, "session error: {e}"),
        }
    }
}

/// The outcome of a collection run. Partial results survive every stop
/// reason, including session errors.
#[derive(Debug)]
pub struct Harvest {
    pub posts: Vec<Post>,
    pub stop: StopReason,
}

/// The scroll-and-scrape loop.
///
/// Sequential and single-consumer: one source, one pass at a time, every
/// wait bounded. Duplicate identifiers are rejected on insertion.
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub async fn collect<S: ContentSource>(&self, source: &mut S) -> Harvest {
        self.collect_with_progress(source, |_| {}).await
    }

    /// Run the loop, invoking `progress` with the running unique-post count.
    pub async fn collect_with_progress<S, F>(&self, source: &mut S, mut progress: F) -> Harvest
    where
        S: ContentSource,
        F: FnMut(usize),
    {
        let cfg = &self.config;
        let mut set = PostSet::new();

        if cfg.min_posts == 0 {
            return Harvest {
                posts: set.into_posts(),
                stop: StopReason::TargetReached,
            };
        }

        let mut last_position = match source.scroll_position().await {
            Ok(p) => p,
            Err(e) => return harvest_on_error(set, e),
        };

        let mut stop = StopReason::AttemptLimit;
        let mut batches_completed = 0usize;
        let mut attempts = 0usize;

        'collecting: while attempts < cfg.max_scroll_attempts {
            attempts += 1;

            match source.await_content(cfg.content_wait).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!("no content appeared within the wait, stopping");
                    stop = StopReason::Exhausted;
                    break;
                }
                Err(e) => return harvest_on_error(set, e),
            }

            let snapshot = match source.visible_posts().await {
                Ok(raw) => raw,
                Err(e) => return harvest_on_error(set, e),
            };

            let mut new_in_pass = 0usize;
            for raw in snapshot {
                // Elements without a derivable identifier are skipped, as
                // are ones already collected.
                let Some(post) = raw.into_post() else { continue };
                if set.contains(&post.id) {
                    continue;
                }
                set.insert(post);
                new_in_pass += 1;
                progress(set.len());

                if set.len() >= cfg.min_posts {
                    stop = StopReason::TargetReached;
                    break 'collecting;
                }
            }
            tracing::debug!(
                "pass {attempts}: {new_in_pass} new posts, {} total",
                set.len()
            );

            if let Err(e) = source.scroll_to_end().await {
                return harvest_on_error(set, e);
            }
            tokio::time::sleep(cfg.scroll_pause).await;

            let new_position = match source.scroll_position().await {
                Ok(p) => p,
                Err(e) => return harvest_on_error(set, e),
            };
            if new_position == last_position {
                tracing::info!("scroll position unchanged, source exhausted");
                stop = StopReason::Exhausted;
                break;
            }
            last_position = new_position;

            // Courtesy wait once per completed batch of batch_size new
            // posts. A batch size of zero disables the wait entirely.
            if new_in_pass > 0 && cfg.batch_size > 0 {
                let batch_index = set.len() / cfg.batch_size;
                if batch_index > batches_completed {
                    batches_completed = batch_index;
                    tracing::info!(
                        "collected {} posts, pausing {:?} before loading more",
                        set.len(),
                        cfg.batch_wait
                    );
                    tokio::time::sleep(cfg.batch_wait).await;
                }
            }
        }

        Harvest {
            posts: set.into_posts(),
            stop,
        }
    }
}

fn harvest_on_error(set: PostSet, error: crate::Error) -> Harvest {
    tracing::warn!("session error after {} posts: {error}", set.len());
    Harvest {
        posts: set.into_posts(),
        stop: StopReason::SessionError(error.to_string()),
    }
}
