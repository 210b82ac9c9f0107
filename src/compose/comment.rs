use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::feed::models::{FeedComment, PostId, AUTHOR_MAX_CHARS, COMMENT_CONTENT_MAX_CHARS};
use crate::feed::{FeedError, FeedSynchronizer};
use crate::validation::{self, ValidationError};

/// Inputs of one expanded comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDraft {
    pub nickname: String,
    pub content: String,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentOutcome {
    Added(FeedComment),
    Rejected(ValidationError),
    Failed,
}

/// Per-post inline comment forms. A post without an entry is collapsed.
#[derive(Clone)]
pub struct CommentComposer {
    feed: FeedSynchronizer,
    forms: Arc<Mutex<HashMap<PostId, CommentDraft>>>,
}

impl CommentComposer {
    pub fn new(feed: FeedSynchronizer) -> Self {
        Self {
            feed,
            forms: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn form(&self, post_id: PostId) -> Option<CommentDraft> {
        self.forms.lock().await.get(&post_id).cloned()
    }

    pub async fn expand(&self, post_id: PostId) {
        self.forms.lock().await.entry(post_id).or_default();
    }

    /// Collapse and forget whatever was typed.
    pub async fn cancel(&self, post_id: PostId) {
        self.forms.lock().await.remove(&post_id);
    }

    /// Collapse every form, as when the feed view is rebuilt.
    pub async fn reset(&self) {
        self.forms.lock().await.clear();
    }

    /// Validation failures keep the form open with its inputs. Anything that
    /// reaches the gateway collapses the form afterwards, success or not.
    pub async fn submit(&self, post_id: PostId, nickname: String, content: String) -> CommentOutcome {
        if let Err(e) = validate(&nickname, &content) {
            self.reopen_with_prompt(post_id, nickname, content, &e).await;
            return CommentOutcome::Rejected(e);
        }

        let outcome = match self.feed.add_comment(post_id, &nickname, &content).await {
            Ok(comment) => CommentOutcome::Added(comment),
            Err(FeedError::Validation(e)) => {
                self.reopen_with_prompt(post_id, nickname, content, &e).await;
                return CommentOutcome::Rejected(e);
            }
            Err(FeedError::Gateway(_)) => CommentOutcome::Failed,
        };

        self.cancel(post_id).await;
        outcome
    }

    async fn reopen_with_prompt(
        &self,
        post_id: PostId,
        nickname: String,
        content: String,
        error: &ValidationError,
    ) {
        self.forms.lock().await.insert(
            post_id,
            CommentDraft {
                nickname,
                content,
                prompt: Some(error.to_string()),
            },
        );
    }
}

fn validate(nickname: &str, content: &str) -> Result<(), ValidationError> {
    validation::require_within("nickname", nickname, AUTHOR_MAX_CHARS)?;
    validation::require_within("comment", content, COMMENT_CONTENT_MAX_CHARS)?;
    Ok(())
}
