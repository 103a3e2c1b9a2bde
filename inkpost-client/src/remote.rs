use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::{
    self, Article, AuthToken, CommentApi, CommentEdit, CommentId, Credentials, LikeStatus,
    NewComment, RequestError, TokenPair, User,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the blog service, eg. `http://127.0.0.1:8000`
    pub host: String,
}

/// `CommentApi` over the blog service's REST endpoints
pub struct HttpApi {
    client: reqwest::Client,
    host: String,
}

impl HttpApi {
    pub fn new(config: ClientConfig) -> HttpApi {
        HttpApi {
            client: reqwest::Client::new(),
            host: String::from(config.host.trim_end_matches('/')),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.host, path)
    }
}

fn network_failure(e: reqwest::Error) -> RequestError {
    RequestError::NetworkFailure(e.to_string())
}

async fn send(req: reqwest::RequestBuilder) -> Result<reqwest::Response, RequestError> {
    let resp = req.send().await.map_err(network_failure)?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.bytes().await.map_err(network_failure)?;
    let reason = api::Error::parse_reason(&body);
    tracing::debug!(%status, ?reason, "blog service rejected request");
    Err(RequestError::RequestRejected { status, reason })
}

async fn fetch<R: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<R, RequestError> {
    send(req).await?.json().await.map_err(network_failure)
}

#[async_trait]
impl CommentApi for HttpApi {
    async fn login(&self, creds: Credentials) -> Result<TokenPair, RequestError> {
        fetch(self.client.post(self.url("auth/login/")).json(&creds)).await
    }

    async fn whoami(&self, token: &AuthToken) -> Result<User, RequestError> {
        fetch(self.client.get(self.url("profile/")).bearer_auth(&token.0)).await
    }

    async fn fetch_article(
        &self,
        token: Option<&AuthToken>,
        slug: &str,
    ) -> Result<Article, RequestError> {
        let mut req = self.client.get(self.url(&format!("blogs/slug/{slug}/")));
        if let Some(token) = token {
            req = req.bearer_auth(&token.0);
        }
        fetch(req).await
    }

    async fn create_comment(
        &self,
        token: &AuthToken,
        comment: NewComment,
    ) -> Result<api::Comment, RequestError> {
        fetch(
            self.client
                .post(self.url("comments/create/"))
                .bearer_auth(&token.0)
                .json(&comment),
        )
        .await
    }

    async fn update_comment(
        &self,
        token: &AuthToken,
        id: CommentId,
        edit: CommentEdit,
    ) -> Result<(), RequestError> {
        send(
            self.client
                .patch(self.url(&format!("comments/{}/update/", id.0)))
                .bearer_auth(&token.0)
                .json(&edit),
        )
        .await?;
        Ok(())
    }

    async fn delete_comment(&self, token: &AuthToken, id: CommentId) -> Result<(), RequestError> {
        send(
            self.client
                .delete(self.url(&format!("comments/{}/delete/", id.0)))
                .bearer_auth(&token.0),
        )
        .await?;
        Ok(())
    }

    async fn toggle_like(
        &self,
        token: &AuthToken,
        id: CommentId,
    ) -> Result<LikeStatus, RequestError> {
        fetch(
            self.client
                .post(self.url(&format!("comments/{}/like/", id.0)))
                .bearer_auth(&token.0),
        )
        .await
    }
}
