use crate::{PostId, Time, User};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

/// A comment as serialized by the blog service, replies included
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post: PostId,
    pub author: User,
    #[serde(default)]
    pub parent: Option<CommentId>,
    pub content: String,
    #[serde(default = "default_approved")]
    pub is_approved: bool,
    pub created_at: Time,
    pub updated_at: Time,

    /// Approved replies, sorted by creation date
    #[serde(default)]
    pub replies: Vec<Comment>,

    #[serde(default)]
    pub total_likes: u64,

    /// Whether the requesting user liked this comment
    #[serde(default)]
    pub liked: bool,
}

fn default_approved() -> bool {
    true
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    /// Slug of the article being commented on
    pub slug: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentEdit {
    pub content: String,
}

/// Authoritative like state returned after toggling a like
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub total_likes: u64,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_comment() {
        let c: Comment = serde_json::from_str(
            r#"{
                "id": 7, "post": 3, "parent": null,
                "author": {"id": 2, "email": "bob@x.org", "full_name": "Bob",
                           "profile_picture": null, "is_active": true},
                "content": "*hi*", "is_approved": true,
                "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z",
                "replies": [{
                    "id": 8, "post": 3, "parent": 7,
                    "author": {"id": 1, "email": "ada@x.org"},
                    "content": "yo",
                    "created_at": "2024-05-01T11:00:00Z", "updated_at": "2024-05-01T11:00:00Z",
                    "total_likes": 2, "liked": true
                }],
                "total_likes": 0, "liked": false
            }"#,
        )
        .expect("parsing comment");
        assert_eq!(c.id, CommentId(7));
        assert_eq!(c.replies.len(), 1);
        assert_eq!(c.replies[0].parent, Some(CommentId(7)));
        assert_eq!(c.replies[0].total_likes, 2);
        assert!(c.replies[0].replies.is_empty());
    }

    #[test]
    fn top_level_comment_omits_parent() {
        let body = serde_json::to_value(NewComment {
            slug: String::from("rust-trees"),
            content: String::from("nice"),
            parent: None,
        })
        .expect("serializing new comment");
        assert_eq!(
            body,
            serde_json::json!({"slug": "rust-trees", "content": "nice"})
        );
    }
}
