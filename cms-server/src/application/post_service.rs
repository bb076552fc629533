use crate::data::post_repository::PostRepository;
use crate::domain::post::{CreatePostRequest, PostResponse};
use crate::domain::DomainError;
use crate::infrastructure::jwt::Claims;
use std::sync::Arc;

pub struct PostService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
}

impl PostService {
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>) -> Self {
        Self { post_repo }
    }

    pub async fn create_post(
        &self,
        claims: &Claims,
        req: CreatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        // Validate input
        if req.title.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if req.content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }

        // Author identity comes from the verified claims, never the body
        let post = self
            .post_repo
            .create(claims.user_id, &claims.username, req)
            .await?;

        tracing::info!("Post created: id={}, author_id={}", post.id, claims.user_id);

        Ok(PostResponse::from(post))
    }

    pub async fn get_post(&self, id: i64) -> Result<PostResponse, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;
        Ok(PostResponse::from(post))
    }

    pub async fn delete_post(&self, id: i64, claims: &Claims) -> Result<(), DomainError> {
        // Ownership check and delete happen as one conditional statement,
        // so two racing requests cannot both pass a separate pre-check.
        let deleted = self.post_repo.delete_owned(id, claims.user_id).await?;

        if !deleted {
            // Nothing was removed: either the post never existed or it
            // belongs to someone else.
            return match self.post_repo.find_by_id(id).await {
                Ok(post) => {
                    tracing::warn!(
                        "User {} attempted to delete post {} owned by {}",
                        claims.user_id,
                        id,
                        post.author_id
                    );
                    Err(DomainError::Forbidden)
                }
                Err(e) => Err(e),
            };
        }

        tracing::info!("Post deleted: id={}, author_id={}", id, claims.user_id);

        Ok(())
    }

    pub async fn list_posts(&self) -> Result<Vec<PostResponse>, DomainError> {
        let posts = self.post_repo.list().await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn search_posts(&self, query: &str) -> Result<Vec<PostResponse>, DomainError> {
        let posts = self.post_repo.search(query).await?;

        tracing::debug!("Search for {:?} returned {} posts", query, posts.len());

        Ok(posts.into_iter().map(PostResponse::from).collect())
    }
}
