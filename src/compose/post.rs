use std::sync::Arc;

use tokio::sync::Mutex;

use super::Notice;
use crate::feed::models::{NewPost, AUTHOR_MAX_CHARS, POST_CONTENT_MAX_CHARS};
use crate::gateway::FeedGateway;
use crate::validation::{self, ValidationError};

/// What the write form currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub nickname: String,
    pub content: String,
    pub profile_image: Option<String>,
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require_within("nickname", &self.nickname, AUTHOR_MAX_CHARS)?;
        validation::require_within("post", &self.content, POST_CONTENT_MAX_CHARS)?;
        Ok(())
    }

    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    fn to_new_post(&self) -> NewPost {
        NewPost {
            content: self.content.clone(),
            author: self.nickname.clone(),
            profile_image_url: self.profile_image.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct ComposerState {
    draft: PostDraft,
    in_flight: bool,
}

/// The write page: one draft, submitted as a single insert.
#[derive(Clone)]
pub struct PostComposer {
    gateway: Arc<dyn FeedGateway>,
    state: Arc<Mutex<ComposerState>>,
}

impl PostComposer {
    pub fn new(gateway: Arc<dyn FeedGateway>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(ComposerState::default())),
        }
    }

    pub async fn draft(&self) -> PostDraft {
        self.state.lock().await.draft.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.lock().await.in_flight
    }

    /// Validate and insert a post. Inputs are cleared only on success.
    pub async fn submit_post(
        &self,
        nickname: String,
        content: String,
        profile_image: Option<String>,
    ) -> Notice {
        let new_post = {
            let mut state = self.state.lock().await;
            if state.in_flight {
                return Notice::Prompt(ValidationError::InFlight.to_string());
            }

            state.draft = PostDraft {
                nickname,
                content,
                profile_image,
            };
            if let Err(e) = state.draft.validate() {
                tracing::debug!("Post rejected before submission: {}", e);
                return Notice::Prompt(e.to_string());
            }

            state.in_flight = true;
            state.draft.to_new_post()
        };

        let result = self.gateway.insert_post(&new_post).await;

        let mut state = self.state.lock().await;
        state.in_flight = false;
        match result {
            Ok(rows) => {
                let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
                tracing::info!(?ids, author = %new_post.author, "Post created");
                state.draft = PostDraft::default();
                Notice::Posted
            }
            Err(e) => {
                tracing::error!("Post submission failed: {}", e);
                Notice::Alert("Something went wrong while posting. Please try again.".into())
            }
        }
    }
}
