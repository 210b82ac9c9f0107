use std::sync::Arc;

use crate::compose::{CommentComposer, PostComposer};
use crate::feed::FeedSynchronizer;
use crate::gateway::FeedGateway;
use crate::nav::NavigationShell;

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedSynchronizer,
    pub composer: PostComposer,
    pub comments: CommentComposer,
    pub nav: NavigationShell,
}

impl AppState {
    pub fn new(gateway: Arc<dyn FeedGateway>) -> Self {
        let feed = FeedSynchronizer::new(gateway.clone());
        Self {
            composer: PostComposer::new(gateway),
            comments: CommentComposer::new(feed.clone()),
            nav: NavigationShell::new(feed.clone()),
            feed,
        }
    }
}
