use std::sync::Arc;

use axum::http::StatusCode;
use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, PostsRepo, RepoError};
use crate::domain::entities::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::pages::{HOME_STARTING_CONTENT, StaticPage};
use crate::domain::posts::{self, HUMAN_DATE_FORMAT, NewPost};
use crate::presentation::views::{HomeContext, PostCard, PostDetailContext, StaticPageContext};

const SOURCE: &str = "application::blog::BlogService";

pub const POSTS_CREATED_METRIC: &str = "journal_posts_created_total";
pub const STORE_FAILURES_METRIC: &str = "journal_store_failures_total";

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("content store unavailable during `{operation}`")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: RepoError,
    },
    #[error("`{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] DomainError),
}

impl BlogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BlogError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// The five journal operations, backed by a post repository.
#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostsRepo>,
}

impl BlogService {
    pub fn new(posts: Arc<dyn PostsRepo>) -> Self {
        Self { posts }
    }

    pub async fn list_posts(&self) -> Result<HomeContext, BlogError> {
        let records = self
            .posts
            .list_posts()
            .await
            .map_err(|err| store_failure("list_posts", err))?;

        Ok(HomeContext {
            starting_content: HOME_STARTING_CONTENT,
            posts: records.into_iter().map(post_card).collect(),
        })
    }

    pub async fn create_post(
        &self,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<PostRecord, BlogError> {
        let NewPost { title, content } = NewPost::from_form(title, content)?;

        let post = self
            .posts
            .create_post(CreatePostParams { title, content })
            .await
            .map_err(|err| store_failure("create_post", err))?;

        counter!(POSTS_CREATED_METRIC).increment(1);
        info!(target = SOURCE, post_id = %post.id, "post created");
        Ok(post)
    }

    pub async fn post_detail(&self, post_id: &str) -> Result<PostDetailContext, BlogError> {
        // Malformed ids can never match a stored post.
        let Ok(id) = Uuid::parse_str(post_id) else {
            return Err(BlogError::NotFound(post_id.to_string()));
        };

        let record = self
            .posts
            .find_post(id)
            .await
            .map_err(|err| store_failure("find_post", err))?
            .ok_or_else(|| BlogError::NotFound(post_id.to_string()))?;

        let published = match record.created_at.format(HUMAN_DATE_FORMAT) {
            Ok(published) => published,
            Err(err) => {
                warn!(
                    target = SOURCE,
                    post_id = %record.id,
                    error = %err,
                    "failed to format publish date"
                );
                String::new()
            }
        };

        Ok(PostDetailContext {
            title: record.title,
            content: record.content,
            published,
        })
    }

    /// Fixed pages never touch the store.
    pub fn static_page(&self, name: &str) -> Result<StaticPageContext, BlogError> {
        let page =
            StaticPage::from_name(name).ok_or_else(|| BlogError::NotFound(name.to_string()))?;

        Ok(StaticPageContext {
            name: page.name(),
            heading: page.heading(),
            content: page.content(),
        })
    }

    pub async fn health_check(&self) -> Result<(), RepoError> {
        self.posts.health_check().await
    }
}

fn post_card(record: PostRecord) -> PostCard {
    PostCard {
        href: format!("/posts/{}", record.id),
        excerpt: posts::excerpt(&record.content),
        id: record.id,
        title: record.title,
    }
}

fn store_failure(operation: &'static str, source: RepoError) -> BlogError {
    counter!(STORE_FAILURES_METRIC, "operation" => operation).increment(1);
    BlogError::StoreUnavailable { operation, source }
}
