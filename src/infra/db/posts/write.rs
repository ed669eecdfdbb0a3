use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, RepoError};
use crate::domain::entities::PostRecord;
use crate::infra::db::map_sqlx_error;

use super::PostgresRepositories;
use super::types::PostRow;

impl PostgresRepositories {
    pub(super) async fn insert_post(
        &self,
        params: CreatePostParams,
    ) -> Result<PostRecord, RepoError> {
        let CreatePostParams { title, content } = params;

        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, title, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }
}
