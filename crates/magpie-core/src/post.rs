use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Sentinel used when a text field could not be read from the page.
pub const MISSING: &str = "N/A";

/// Default value for an absent engagement counter.
pub const ZERO: &str = "0";

/// One collected post, deduplicated by `id`.
///
/// Field order matters: the CSV header is derived from it
/// (username, content, timestamp, replies, retweets, likes, url).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub username: String,
    pub content: String,
    /// ISO-8601 timestamp as reported by the page, or "N/A".
    pub timestamp: String,
    pub replies: String,
    pub retweets: String,
    pub likes: String,
    pub url: String,
    /// Final path segment of `url`. Not a CSV column.
    #[serde(skip)]
    pub id: String,
}

/// A raw per-element snapshot as extracted from the page.
///
/// Every field is optional; conversion to [`Post`] applies the defaults
/// and derives the identifier from the permalink.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    pub url: Option<String>,
    pub username: Option<String>,
    pub content: Option<String>,
    pub timestamp: Option<String>,
    pub replies: Option<String>,
    pub retweets: Option<String>,
    pub likes: Option<String>,
}

impl RawPost {
    /// Convert to a [`Post`], or `None` when no identifier can be derived.
    ///
    /// Engagement counters default to "0"; the remaining text fields
    /// default to "N/A".
    pub fn into_post(self) -> Option<Post> {
        let url = self.url.filter(|u| !u.is_empty())?;
        let id = post_id(&url)?;

        Some(Post {
            username: non_empty_or(self.username, MISSING),
            content: non_empty_or(self.content, MISSING),
            timestamp: non_empty_or(self.timestamp, MISSING),
            replies: non_empty_or(self.replies, ZERO),
            retweets: non_empty_or(self.retweets, ZERO),
            likes: non_empty_or(self.likes, ZERO),
            url,
            id,
        })
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// Derive a post identifier: the final non-empty path segment of its URL.
pub fn post_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    Some(segment.to_string())
}

/// An ordered sequence of unique posts.
///
/// Invariant: no two posts in the sequence share an id. Insertion order
/// is preserved for serialization.
#[derive(Debug, Default)]
pub struct PostSet {
    posts: Vec<Post>,
    seen: HashSet<String>,
}

impl PostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a post unless its id was already collected.
    ///
    /// Returns `true` if the post was new.
    pub fn insert(&mut self, post: Post) -> bool {
        if !self.seen.insert(post.id.clone()) {
            return false;
        }
        self.posts.push(post);
        true
    }

    /// Check whether an id was already collected.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Consume the set, yielding posts in collection order.
    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_id(id: &str) -> Post {
        RawPost {
            url: Some(format!("https://x.com/someone/status/{id}")),
            ..Default::default()
        }
        .into_post()
        .unwrap()
    }

    #[test]
    fn test_post_id_takes_last_path_segment() {
        assert_eq!(
            post_id("https://x.com/alice/status/17291"),
            Some("17291".to_string())
        );
    }

    #[test]
    fn test_post_id_ignores_query_string() {
        assert_eq!(
            post_id("https://x.com/alice/status/17291?s=20"),
            Some("17291".to_string())
        );
    }

    #[test]
    fn test_post_id_ignores_trailing_slash() {
        assert_eq!(
            post_id("https://x.com/alice/status/17291/"),
            Some("17291".to_string())
        );
    }

    #[test]
    fn test_post_id_rejects_unparseable_url() {
        assert_eq!(post_id("not a url"), None);
        assert_eq!(post_id("https://x.com"), None);
    }

    #[test]
    fn test_raw_post_defaults_missing_counters_to_zero() {
        let post = RawPost {
            url: Some("https://x.com/a/status/1".to_string()),
            username: Some("@a".to_string()),
            content: Some("hello".to_string()),
            timestamp: Some("2024-01-01T00:00:00.000Z".to_string()),
            ..Default::default()
        }
        .into_post()
        .unwrap();

        assert_eq!(post.replies, "0");
        assert_eq!(post.retweets, "0");
        assert_eq!(post.likes, "0");
    }

    #[test]
    fn test_raw_post_defaults_missing_text_fields() {
        let post = RawPost {
            url: Some("https://x.com/a/status/2".to_string()),
            likes: Some("14".to_string()),
            ..Default::default()
        }
        .into_post()
        .unwrap();

        assert_eq!(post.username, "N/A");
        assert_eq!(post.content, "N/A");
        assert_eq!(post.timestamp, "N/A");
        assert_eq!(post.likes, "14");
    }

    #[test]
    fn test_raw_post_without_url_is_dropped() {
        let raw = RawPost {
            username: Some("@a".to_string()),
            ..Default::default()
        };
        assert!(raw.into_post().is_none());
    }

    #[test]
    fn test_post_set_rejects_duplicate_ids() {
        let mut set = PostSet::new();

        assert!(set.insert(post_with_id("1")));
        assert!(set.insert(post_with_id("2")));
        assert!(!set.insert(post_with_id("1")));

        assert_eq!(set.len(), 2);
        let ids: Vec<_> = set.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_post_set_preserves_insertion_order() {
        let mut set = PostSet::new();
        for id in ["9", "3", "7"] {
            set.insert(post_with_id(id));
        }

        let ids: Vec<_> = set.into_posts().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["9", "3", "7"]);
    }
}
