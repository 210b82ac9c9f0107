use askama::Template;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::compose::CommentDraft;
use crate::error::{AppError, AppResult};
use crate::feed::{FeedPost, PostId};
use crate::nav::Tab;
use crate::routes::home::Html;
use crate::state::AppState;

// --- View structs ---

pub struct PostCard {
    pub post: FeedPost,
    /// `None` while the comment form is collapsed
    pub form: Option<CommentDraft>,
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/feed.html")]
pub struct FeedTemplate {
    pub cards: Vec<PostCard>,
    pub load_failed: bool,
    pub feed_active: bool,
}

#[derive(Template)]
#[template(path = "components/like_button.html")]
pub struct LikeButtonTemplate {
    pub card: PostCard,
}

#[derive(Template)]
#[template(path = "components/comment_section.html")]
pub struct CommentSectionTemplate {
    pub card: PostCard,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct CreateCommentForm {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub content: String,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed", get(feed_page))
        .route("/feed/posts/{id}/like", post(like_post))
        .route("/feed/posts/{id}/comments", post(create_comment))
        .route(
            "/feed/posts/{id}/comments/form",
            get(expand_comment_form).delete(cancel_comment_form),
        )
}

// --- Handlers ---

async fn feed_page(State(state): State<AppState>) -> AppResult<Html<FeedTemplate>> {
    state.nav.switch_to(Tab::Feed).await;
    state.comments.reset().await;

    if let Err(e) = state.feed.mount().await {
        tracing::debug!("Rendering feed without fresh data: {}", e);
    }
    let snapshot = state.feed.snapshot().await;

    let cards = snapshot
        .posts
        .into_iter()
        .map(|post| PostCard { post, form: None })
        .collect();

    Ok(Html(FeedTemplate {
        cards,
        load_failed: snapshot.error.is_some(),
        feed_active: true,
    }))
}

async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> AppResult<Html<LikeButtonTemplate>> {
    if let Err(e) = state.feed.like(post_id).await {
        tracing::debug!(post_id, "Keeping previous like count: {}", e);
    }
    let card = load_card(&state, post_id).await?;
    Ok(Html(LikeButtonTemplate { card }))
}

async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Form(form): Form<CreateCommentForm>,
) -> AppResult<Html<CommentSectionTemplate>> {
    require_post(&state, post_id).await?;
    state
        .comments
        .submit(post_id, form.nickname, form.content)
        .await;
    let card = load_card(&state, post_id).await?;
    Ok(Html(CommentSectionTemplate { card }))
}

async fn expand_comment_form(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> AppResult<Html<CommentSectionTemplate>> {
    require_post(&state, post_id).await?;
    state.comments.expand(post_id).await;
    let card = load_card(&state, post_id).await?;
    Ok(Html(CommentSectionTemplate { card }))
}

async fn cancel_comment_form(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> AppResult<Html<CommentSectionTemplate>> {
    state.comments.cancel(post_id).await;
    let card = load_card(&state, post_id).await?;
    Ok(Html(CommentSectionTemplate { card }))
}

/// Forms are only kept for posts the feed is showing.
async fn require_post(state: &AppState, post_id: PostId) -> AppResult<FeedPost> {
    state.feed.post(post_id).await.ok_or(AppError::NotFound)
}

async fn load_card(state: &AppState, post_id: PostId) -> AppResult<PostCard> {
    let post = require_post(state, post_id).await?;
    let form = state.comments.form(post_id).await;
    Ok(PostCard { post, form })
}
