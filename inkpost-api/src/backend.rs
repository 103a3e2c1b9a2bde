use async_trait::async_trait;

use crate::{
    Article, AuthToken, Comment, CommentEdit, CommentId, Credentials, LikeStatus, NewComment,
    RequestError, TokenPair, User,
};

/// Remote operations of the blog service that the comment section relies on
#[async_trait]
pub trait CommentApi: Send + Sync {
    async fn login(&self, creds: Credentials) -> Result<TokenPair, RequestError>;
    async fn whoami(&self, token: &AuthToken) -> Result<User, RequestError>;

    /// `token` is optional, without it every `liked` flag comes back false
    async fn fetch_article(
        &self,
        token: Option<&AuthToken>,
        slug: &str,
    ) -> Result<Article, RequestError>;

    /// Returns the canonical comment, including its server-assigned id
    async fn create_comment(
        &self,
        token: &AuthToken,
        comment: NewComment,
    ) -> Result<Comment, RequestError>;
    async fn update_comment(
        &self,
        token: &AuthToken,
        id: CommentId,
        edit: CommentEdit,
    ) -> Result<(), RequestError>;
    async fn delete_comment(&self, token: &AuthToken, id: CommentId) -> Result<(), RequestError>;
    async fn toggle_like(&self, token: &AuthToken, id: CommentId)
        -> Result<LikeStatus, RequestError>;
}
