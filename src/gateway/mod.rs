// Remote data gateway - every read and write of posts/comments goes through here
mod memory;
mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{GatewayConfig, GatewayKind};
use crate::feed::models::{CommentRow, NewComment, NewPost, PostId, PostRow};

pub use memory::{GatewayCall, GatewayOp, MemoryGateway};
pub use rest::{RestGateway, FEED_SELECT};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Gateway returned no rows")]
    EmptyResponse,

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Gateway misconfigured: {0}")]
    Config(String),
}

/// Hosted query/mutation API for the `posts` and `comments` collections.
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// All posts newest first, each joined with its comments oldest first
    async fn select_feed(&self) -> Result<Vec<PostRow>, GatewayError>;

    /// Insert one post, returning the inserted row(s)
    async fn insert_post(&self, post: &NewPost) -> Result<Vec<PostRow>, GatewayError>;

    /// Insert one comment, returning the stored row with server-assigned fields
    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentRow, GatewayError>;

    /// `update posts set likes = <likes> where id = <post_id>`
    async fn update_likes(&self, post_id: PostId, likes: u64) -> Result<(), GatewayError>;
}

/// Build the gateway selected by configuration.
pub fn connect(config: &GatewayConfig) -> Result<Arc<dyn FeedGateway>, GatewayError> {
    match config.kind {
        GatewayKind::Memory => {
            tracing::warn!("Using in-memory gateway; posts are lost on restart");
            Ok(Arc::new(MemoryGateway::new()))
        }
        GatewayKind::Rest => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| GatewayError::Config("gateway.url is required".into()))?;
            let api_key = config
                .api_key
                .as_deref()
                .ok_or_else(|| GatewayError::Config("gateway.api_key is required".into()))?;
            let timeout = config.timeout_secs.map(Duration::from_secs);

            tracing::info!("Using REST gateway at {}", url);
            Ok(Arc::new(RestGateway::new(url, api_key, timeout)?))
        }
    }
}
