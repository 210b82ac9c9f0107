use askama::Template;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::compose::image::{self, MAX_IMAGE_BYTES};
use crate::compose::{ImageUpload, Notice, PostDraft};
use crate::error::AppResult;
use crate::feed::models::{AUTHOR_MAX_CHARS, POST_CONTENT_MAX_CHARS};
use crate::nav::Tab;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/write.html")]
pub struct WriteTemplate {
    pub draft: PostDraft,
    pub notice: Option<Notice>,
    pub submitting: bool,
    pub max_content: usize,
    pub max_nickname: usize,
    pub feed_active: bool,
}

impl WriteTemplate {
    fn new(draft: PostDraft, notice: Option<Notice>, submitting: bool) -> Self {
        Self {
            draft,
            notice,
            submitting,
            max_content: POST_CONTENT_MAX_CHARS,
            max_nickname: AUTHOR_MAX_CHARS,
            feed_active: false,
        }
    }
}

/// Fields of the multipart write form
#[derive(Default)]
struct WriteForm {
    nickname: String,
    content: String,
    image: Option<ImageUpload>,
    remove_image: bool,
    /// Set when the chosen file is not an acceptable image
    image_error: Option<String>,
}

/// Hard cap on a write request. Images between `MAX_IMAGE_BYTES` and this
/// are still read through so the text fields arrive with them.
pub const MAX_REQUEST_BYTES: usize = 4 * MAX_IMAGE_BYTES;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/write", get(write_page).post(submit_post))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}

async fn write_page(State(state): State<AppState>) -> AppResult<Html<WriteTemplate>> {
    state.nav.switch_to(Tab::Write).await;

    let draft = state.composer.draft().await;
    let submitting = state.composer.is_submitting().await;
    Ok(Html(WriteTemplate::new(draft, None, submitting)))
}

async fn submit_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Html<WriteTemplate>> {
    state.nav.switch_to(Tab::Write).await;

    let previous = state.composer.draft().await;
    let form = read_form(multipart).await?;

    if let Some(prompt) = form.image_error {
        // Keep what was typed; the rejected file is never attached
        let draft = PostDraft {
            nickname: form.nickname,
            content: form.content,
            profile_image: previous.profile_image,
        };
        let submitting = state.composer.is_submitting().await;
        return Ok(Html(WriteTemplate::new(draft, Some(Notice::Prompt(prompt)), submitting)));
    }

    let profile_image = match form.image {
        Some(upload) => Some(upload.into_data_url()),
        None if form.remove_image => None,
        None => previous.profile_image,
    };

    let submitted = PostDraft {
        nickname: form.nickname,
        content: form.content,
        profile_image,
    };
    let notice = state
        .composer
        .submit_post(
            submitted.nickname.clone(),
            submitted.content.clone(),
            submitted.profile_image.clone(),
        )
        .await;

    // A prompt never replaces the composer's draft while another submission
    // is in flight, so show this request's own inputs back
    let draft = match notice {
        Notice::Prompt(_) => submitted,
        _ => state.composer.draft().await,
    };
    let submitting = state.composer.is_submitting().await;
    Ok(Html(WriteTemplate::new(draft, Some(notice), submitting)))
}

async fn read_form(mut multipart: Multipart) -> AppResult<WriteForm> {
    let mut form = WriteForm::default();

    loop {
        match read_field(&mut multipart, &mut form).await {
            Ok(true) => {}
            Ok(false) => break,
            // Over the request cap; keep the text that already arrived
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::debug!("Upload cut off at the request limit: {}", e);
                form.image = None;
                form.image_error = Some(image::too_large().to_string());
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(form)
}

/// Read the next field into `form`. Returns `false` once the body is done.
async fn read_field(multipart: &mut Multipart, form: &mut WriteForm) -> Result<bool, MultipartError> {
    let Some(mut field) = multipart.next_field().await? else {
        return Ok(false);
    };

    let name = field.name().unwrap_or_default().to_string();
    match name.as_str() {
        "nickname" => form.nickname = field.text().await?,
        "content" => form.content = field.text().await?,
        "remove_image" => form.remove_image = !field.text().await?.is_empty(),
        "image" => {
            let content_type = field.content_type().map(str::to_string);
            let file_name = field.file_name().map(str::to_string);
            let upload = match read_capped(&mut field).await? {
                Some(bytes) => {
                    ImageUpload::from_parts(content_type.as_deref(), file_name.as_deref(), &bytes)
                }
                None => Err(image::too_large()),
            };
            match upload {
                Ok(upload) => form.image = upload,
                Err(e) => {
                    tracing::debug!("Image rejected: {}", e);
                    form.image_error = Some(e.to_string());
                }
            }
        }
        other => tracing::debug!("Ignoring unknown form field: {}", other),
    }

    Ok(true)
}

/// Buffer a file field up to `MAX_IMAGE_BYTES`. Anything longer is drained
/// without being kept and comes back as `None`.
async fn read_capped(field: &mut Field<'_>) -> Result<Option<Vec<u8>>, MultipartError> {
    let mut bytes = Vec::new();
    let mut overflowed = false;

    while let Some(chunk) = field.chunk().await? {
        if overflowed {
            continue;
        }
        if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
            overflowed = true;
            bytes = Vec::new();
        } else {
            bytes.extend_from_slice(&chunk);
        }
    }

    Ok((!overflowed).then_some(bytes))
}
