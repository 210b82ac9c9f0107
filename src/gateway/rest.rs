use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::{FeedGateway, GatewayError};
use crate::feed::models::{CommentRow, LikesPatch, NewComment, NewPost, PostId, PostRow};

/// Columns requested for the feed, with comments embedded through the
/// `comments.post_id` foreign key.
pub const FEED_SELECT: &str = "id,content,author,created_at,likes,profile_image_url,\
comments(id,post_id,nickname,content,created_at,profile_image_url)";

/// PostgREST client for a hosted project (`{base}/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestGateway {
    client: Client,
    rest_url: Url,
    api_key: String,
}

impl RestGateway {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| GatewayError::Config(format!("invalid gateway url {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "gateway url {} cannot be used as a base",
                base_url
            )));
        }

        // Without a trailing slash `join` would replace the last path segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base
            .join("rest/v1/")
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            rest_url,
            api_key: api_key.into(),
        })
    }

    pub fn table_url(&self, table: &str) -> Result<Url, GatewayError> {
        self.rest_url
            .join(table)
            .map_err(|e| GatewayError::Config(e.to_string()))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl FeedGateway for RestGateway {
    async fn select_feed(&self) -> Result<Vec<PostRow>, GatewayError> {
        let request = self.client.get(self.table_url("posts")?).query(&[
            ("select", FEED_SELECT),
            ("order", "created_at.desc"),
            ("comments.order", "created_at.asc"),
        ]);

        let response = self.authorized(request).send().await?;
        let rows: Vec<PostRow> = Self::read_json(response).await?;
        tracing::debug!("Fetched {} posts", rows.len());
        Ok(rows)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Vec<PostRow>, GatewayError> {
        let request = self
            .client
            .post(self.table_url("posts")?)
            .header("Prefer", "return=representation")
            .json(&[post]);

        let response = self.authorized(request).send().await?;
        Self::read_json(response).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentRow, GatewayError> {
        let request = self
            .client
            .post(self.table_url("comments")?)
            .header("Prefer", "return=representation")
            .json(comment);

        let response = self.authorized(request).send().await?;
        let rows: Vec<CommentRow> = Self::read_json(response).await?;
        rows.into_iter().next().ok_or(GatewayError::EmptyResponse)
    }

    async fn update_likes(&self, post_id: PostId, likes: u64) -> Result<(), GatewayError> {
        let request = self
            .client
            .patch(self.table_url("posts")?)
            .query(&[("id", format!("eq.{}", post_id))])
            .json(&LikesPatch { likes });

        let response = self.authorized(request).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
