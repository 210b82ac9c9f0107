use serde::{Deserialize, Serialize};

use super::time::parse_and_format_time;

pub type PostId = i64;
pub type CommentId = i64;

pub const AUTHOR_MAX_CHARS: usize = 20;
pub const POST_CONTENT_MAX_CHARS: usize = 280;
pub const COMMENT_CONTENT_MAX_CHARS: usize = 200;

// --- Wire rows ---

/// A `posts` row as returned by the gateway, optionally joined with its comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRow {
    pub id: PostId,
    pub content: String,
    pub author: String,
    pub created_at: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: CommentId,
    pub post_id: PostId,
    pub nickname: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub content: String,
    pub author: String,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub nickname: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikesPatch {
    pub likes: u64,
}

// --- View models ---

#[derive(Debug, Clone, PartialEq)]
pub struct FeedComment {
    pub id: CommentId,
    pub post_id: PostId,
    pub nickname: String,
    pub content: String,
    pub created_at: String,
    pub timestamp: String,
    pub profile_image: Option<String>,
}

impl FeedComment {
    pub fn from_row(row: CommentRow) -> Self {
        let timestamp = parse_and_format_time(&row.created_at);
        Self {
            id: row.id,
            post_id: row.post_id,
            nickname: row.nickname,
            content: row.content,
            created_at: row.created_at,
            timestamp,
            profile_image: row.profile_image_url.filter(|src| !src.is_empty()),
        }
    }

    pub fn initial(&self) -> String {
        initial_of(&self.nickname)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub id: PostId,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub timestamp: String,
    pub likes: u64,
    pub profile_image: Option<String>,
    pub comments: Vec<FeedComment>,
}

impl FeedPost {
    pub fn from_row(row: PostRow) -> Self {
        let timestamp = parse_and_format_time(&row.created_at);
        let comments = row
            .comments
            .unwrap_or_default()
            .into_iter()
            .map(FeedComment::from_row)
            .collect();

        Self {
            id: row.id,
            content: row.content,
            author: row.author,
            created_at: row.created_at,
            timestamp,
            likes: row.likes,
            profile_image: row.profile_image_url.filter(|src| !src.is_empty()),
            comments,
        }
    }

    /// Derived from the comment list so it can never drift from what is shown.
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn initial(&self) -> String {
        initial_of(&self.author)
    }
}

fn initial_of(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}
