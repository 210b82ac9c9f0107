use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use super::{FeedGateway, GatewayError};
use crate::feed::models::{CommentId, CommentRow, NewComment, NewPost, PostId, PostRow};

/// Operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    SelectFeed,
    InsertPost,
    InsertComment,
    UpdateLikes,
}

/// A call as seen by the gateway, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    SelectFeed,
    InsertPost(NewPost),
    InsertComment(NewComment),
    UpdateLikes { post_id: PostId, likes: u64 },
}

#[derive(Default)]
struct Tables {
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
    next_post_id: PostId,
    next_comment_id: CommentId,
    failing: HashSet<GatewayOp>,
    /// `None` unless call recording was asked for
    calls: Option<Vec<GatewayCall>>,
}

impl Tables {
    fn record(&mut self, op: GatewayOp, call: GatewayCall) -> Result<(), GatewayError> {
        if let Some(calls) = self.calls.as_mut() {
            calls.push(call);
        }
        if self.failing.contains(&op) {
            return Err(GatewayError::Unavailable(format!("{:?} is failing", op)));
        }
        Ok(())
    }
}

/// In-process stand-in for the hosted store with the same ordering and
/// foreign-key behaviour. Optionally records every call it receives.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store. Embedded comments are split out into the comments table.
    pub fn with_posts(rows: Vec<PostRow>) -> Self {
        let gateway = Self::new();
        {
            let mut tables = gateway.lock();
            for mut row in rows {
                for comment in row.comments.take().unwrap_or_default() {
                    tables.next_comment_id = tables.next_comment_id.max(comment.id);
                    tables.comments.push(comment);
                }
                tables.next_post_id = tables.next_post_id.max(row.id);
                tables.posts.push(row);
            }
        }
        gateway
    }

    /// Keep a log of every call for `calls()`. Off by default so a long
    /// running memory-backed server does not accumulate one.
    pub fn recording(self) -> Self {
        self.lock().calls.get_or_insert_with(Vec::new);
        self
    }

    pub fn fail(&self, op: GatewayOp) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: GatewayOp) {
        self.lock().failing.remove(&op);
    }

    /// Calls received since recording started; empty when not recording.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone().unwrap_or_default()
    }

    pub fn likes(&self, post_id: PostId) -> Option<u64> {
        self.lock()
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.likes)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl FeedGateway for MemoryGateway {
    async fn select_feed(&self) -> Result<Vec<PostRow>, GatewayError> {
        let mut tables = self.lock();
        tables.record(GatewayOp::SelectFeed, GatewayCall::SelectFeed)?;

        let mut posts = tables.posts.clone();
        posts.sort_by(|a, b| (&b.created_at, b.id).cmp(&(&a.created_at, a.id)));

        for post in &mut posts {
            let mut comments: Vec<CommentRow> = tables
                .comments
                .iter()
                .filter(|c| c.post_id == post.id)
                .cloned()
                .collect();
            comments.sort_by(|a, b| (&a.created_at, a.id).cmp(&(&b.created_at, b.id)));
            post.comments = Some(comments);
        }

        Ok(posts)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Vec<PostRow>, GatewayError> {
        let mut tables = self.lock();
        tables.record(GatewayOp::InsertPost, GatewayCall::InsertPost(post.clone()))?;

        tables.next_post_id += 1;
        let row = PostRow {
            id: tables.next_post_id,
            content: post.content.clone(),
            author: post.author.clone(),
            created_at: now(),
            likes: 0,
            profile_image_url: post.profile_image_url.clone(),
            comments: None,
        };
        tables.posts.push(row.clone());

        Ok(vec![row])
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentRow, GatewayError> {
        let mut tables = self.lock();
        tables.record(
            GatewayOp::InsertComment,
            GatewayCall::InsertComment(comment.clone()),
        )?;

        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(GatewayError::Status {
                status: 409,
                body: format!("post {} does not exist", comment.post_id),
            });
        }

        tables.next_comment_id += 1;
        let row = CommentRow {
            id: tables.next_comment_id,
            post_id: comment.post_id,
            nickname: comment.nickname.clone(),
            content: comment.content.clone(),
            created_at: now(),
            profile_image_url: None,
        };
        tables.comments.push(row.clone());

        Ok(row)
    }

    async fn update_likes(&self, post_id: PostId, likes: u64) -> Result<(), GatewayError> {
        let mut tables = self.lock();
        tables.record(
            GatewayOp::UpdateLikes,
            GatewayCall::UpdateLikes { post_id, likes },
        )?;

        // Matching no rows is not an error, same as a filtered PATCH
        if let Some(post) = tables.posts.iter_mut().find(|p| p.id == post_id) {
            post.likes = likes;
        }
        Ok(())
    }
}
