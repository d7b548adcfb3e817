#![allow(dead_code)]

use thiserror::Error;
use uuid::Uuid;

/// Shared error type stub for the feedlab pipeline crates.
#[derive(Debug, Error, Clone)]
pub enum FeedError {
    #[error("{message}")]
    Message { message: String },
}

impl FeedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Opaque id for one run of the instrument, generated once at load.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Self-reported id of the human operating one session.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ParticipantId(pub String);

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PostId(pub String);

/// Ordered list of the posts shown in the mock feed.
///
/// Order is significant: derived participant rows address posts by their
/// catalog position (`p1_`, `p2_`, ...), not by id.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PostCatalog {
    posts: Vec<PostId>,
}

impl PostCatalog {
    pub fn new(posts: Vec<PostId>) -> Self {
        Self { posts }
    }

    pub fn from_labels<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            posts: labels.into_iter().map(|s| PostId(s.into())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostId> {
        self.posts.iter()
    }

    pub fn ids(&self) -> &[PostId] {
        &self.posts
    }

    pub fn position(&self, post: &PostId) -> Option<usize> {
        self.posts.iter().position(|candidate| candidate == post)
    }

    pub fn contains(&self, post: &PostId) -> bool {
        self.position(post).is_some()
    }
}
