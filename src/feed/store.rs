// Feed state container - pure, synchronous transitions only
use super::models::{CommentRow, FeedComment, FeedPost, PostId, PostRow};

/// Identifies one mount of the feed view. Results captured under an older
/// generation are dropped instead of applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum FeedAction {
    LoadStarted,
    LoadSucceeded(Vec<PostRow>),
    LoadFailed(String),
    LikeConfirmed { post_id: PostId, likes: u64 },
    CommentAdded { post_id: PostId, comment: CommentRow },
}

#[derive(Debug, Default)]
pub struct FeedStore {
    posts: Vec<FeedPost>,
    loading: bool,
    last_error: Option<String>,
    generation: u64,
    mounted: bool,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[FeedPost] {
        &self.posts
    }

    pub fn post(&self, post_id: PostId) -> Option<&FeedPost> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// Start a new view mount; anything still in flight becomes stale.
    pub fn mount(&mut self) -> Generation {
        self.generation += 1;
        self.mounted = true;
        self.loading = false;
        self.generation()
    }

    /// Tear the view down. Posts are kept but no further results apply.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.mounted = false;
        self.loading = false;
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.mounted && generation == self.generation()
    }

    /// Apply `action` if it belongs to the current mount. Returns whether it
    /// was applied; stale actions are a no-op.
    pub fn dispatch(&mut self, generation: Generation, action: FeedAction) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(?generation, "Discarding stale feed result");
            return false;
        }

        match action {
            FeedAction::LoadStarted => self.load_started(),
            FeedAction::LoadSucceeded(rows) => self.load_succeeded(rows),
            FeedAction::LoadFailed(message) => self.load_failed(message),
            FeedAction::LikeConfirmed { post_id, likes } => self.like_confirmed(post_id, likes),
            FeedAction::CommentAdded { post_id, comment } => self.comment_added(post_id, comment),
        }
    }

    fn load_started(&mut self) -> bool {
        self.loading = true;
        true
    }

    fn load_succeeded(&mut self, rows: Vec<PostRow>) -> bool {
        self.posts = rows.into_iter().map(FeedPost::from_row).collect();
        self.loading = false;
        self.last_error = None;
        true
    }

    fn load_failed(&mut self, message: String) -> bool {
        self.loading = false;
        self.last_error = Some(message);
        true
    }

    fn like_confirmed(&mut self, post_id: PostId, likes: u64) -> bool {
        match self.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.likes = likes;
                true
            }
            None => false,
        }
    }

    fn comment_added(&mut self, post_id: PostId, comment: CommentRow) -> bool {
        match self.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.comments.push(FeedComment::from_row(comment));
                true
            }
            None => false,
        }
    }
}
