pub mod models;
pub mod store;
pub mod sync;
pub mod time;

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::validation::ValidationError;

pub use models::{FeedComment, FeedPost, PostId};
pub use store::{FeedAction, FeedStore, Generation};
pub use sync::{FeedSnapshot, FeedSynchronizer};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
