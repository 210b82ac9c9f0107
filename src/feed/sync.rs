use std::sync::Arc;

use tokio::sync::Mutex;

use super::models::{FeedComment, FeedPost, NewComment, PostId};
use super::store::{FeedAction, FeedStore, Generation};
use super::FeedError;
use crate::gateway::FeedGateway;
use crate::validation;

/// Read-only copy of the store for rendering.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub posts: Vec<FeedPost>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Moves feed data between the gateway and the store. The store lock is
/// never held across a gateway call; every result is applied under the
/// generation it was requested in.
#[derive(Clone)]
pub struct FeedSynchronizer {
    gateway: Arc<dyn FeedGateway>,
    store: Arc<Mutex<FeedStore>>,
}

impl FeedSynchronizer {
    pub fn new(gateway: Arc<dyn FeedGateway>) -> Self {
        Self {
            gateway,
            store: Arc::new(Mutex::new(FeedStore::new())),
        }
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let store = self.store.lock().await;
        FeedSnapshot {
            posts: store.posts().to_vec(),
            loading: store.is_loading(),
            error: store.last_error().map(str::to_string),
        }
    }

    pub async fn post(&self, post_id: PostId) -> Option<FeedPost> {
        self.store.lock().await.post(post_id).cloned()
    }

    /// Mount the feed view and issue its one load.
    pub async fn mount(&self) -> Result<(), FeedError> {
        let generation = self.store.lock().await.mount();
        self.load_for(generation).await
    }

    pub async fn unmount(&self) {
        self.store.lock().await.unmount();
    }

    /// Re-fetch the whole feed for the current mount.
    pub async fn load(&self) -> Result<(), FeedError> {
        let generation = self.store.lock().await.generation();
        self.load_for(generation).await
    }

    async fn load_for(&self, generation: Generation) -> Result<(), FeedError> {
        let started = {
            let mut store = self.store.lock().await;
            store.dispatch(generation, FeedAction::LoadStarted)
        };
        if !started {
            return Ok(());
        }

        match self.gateway.select_feed().await {
            Ok(rows) => {
                let count = rows.len();
                let mut store = self.store.lock().await;
                if store.dispatch(generation, FeedAction::LoadSucceeded(rows)) {
                    tracing::info!("Loaded {} posts", count);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("Feed load failed: {}", e);
                let mut store = self.store.lock().await;
                store.dispatch(generation, FeedAction::LoadFailed(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Add one like. The local count only moves once the gateway confirms.
    /// Returns the new count, or `None` when nothing was applied.
    pub async fn like(&self, post_id: PostId) -> Result<Option<u64>, FeedError> {
        let (generation, current) = {
            let store = self.store.lock().await;
            let generation = store.generation();
            let current = store
                .post(post_id)
                .filter(|_| store.is_current(generation))
                .map(|p| p.likes);
            (generation, current)
        };

        let Some(current) = current else {
            tracing::debug!(post_id, "Like ignored, post not in feed");
            return Ok(None);
        };

        let likes = current.saturating_add(1);
        if let Err(e) = self.gateway.update_likes(post_id, likes).await {
            tracing::warn!(post_id, "Like failed: {}", e);
            return Err(e.into());
        }

        let mut store = self.store.lock().await;
        let applied = store.dispatch(generation, FeedAction::LikeConfirmed { post_id, likes });
        Ok(applied.then_some(likes))
    }

    /// Insert a comment and splice the stored row into the post's list.
    pub async fn add_comment(
        &self,
        post_id: PostId,
        nickname: &str,
        content: &str,
    ) -> Result<FeedComment, FeedError> {
        validation::require("nickname", nickname)?;
        validation::require("comment", content)?;

        let generation = self.store.lock().await.generation();
        let new_comment = NewComment {
            post_id,
            nickname: nickname.to_string(),
            content: content.to_string(),
        };

        let row = match self.gateway.insert_comment(&new_comment).await {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(post_id, "Adding comment failed: {}", e);
                return Err(e.into());
            }
        };

        let comment = FeedComment::from_row(row.clone());
        let mut store = self.store.lock().await;
        if store.dispatch(generation, FeedAction::CommentAdded { post_id, comment: row }) {
            tracing::info!(post_id, comment_id = comment.id, "Comment added");
        }
        Ok(comment)
    }
}
