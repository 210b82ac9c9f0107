pub mod comment;
pub mod image;
pub mod post;

pub use comment::{CommentComposer, CommentDraft, CommentOutcome};
pub use image::ImageUpload;
pub use post::{PostComposer, PostDraft};

/// Feedback shown on the write page after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Validation failed; nothing was sent.
    Prompt(String),
    /// The gateway rejected the submission; inputs are kept.
    Alert(String),
    Posted,
}

impl Notice {
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Prompt(_) => "prompt",
            Notice::Alert(_) => "alert",
            Notice::Posted => "posted",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Prompt(message) | Notice::Alert(message) => message,
            Notice::Posted => "Your post was published!",
        }
    }
}
