use crate::{Comment, Time, User};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

/// The subset of a blog post's detail view that the comment section needs
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Article {
    pub id: PostId,
    pub slug: String,
    pub title: String,
    pub author: User,
    pub created_at: Time,

    /// Top-level comments only, each carrying its nested replies
    #[serde(default)]
    pub comments: Vec<Comment>,

    #[serde(default)]
    pub total_comments: u64,
}
