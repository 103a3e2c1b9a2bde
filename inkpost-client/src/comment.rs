use crate::{
    api::{self, CommentId, LikeStatus, Time, UserId},
    Forest,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Author {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl Author {
    pub fn from_api(user: &api::User, media_host: &str) -> Author {
        Author {
            id: user.id,
            display_name: String::from(user.display_name()),
            avatar_url: user.avatar_url(media_host),
        }
    }
}

/// One comment or reply, as displayed for the current viewer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub id: CommentId,

    /// Markdown source
    pub content: String,

    pub author: Author,
    pub created_at: Time,

    // `liked` and `total_likes` only ever change together, see `with_like`
    pub liked: bool,
    pub total_likes: u64,

    /// Replies in server arrival order
    pub replies: Forest,
}

impl CommentNode {
    /// Converts a service comment and all its replies, resolving avatars against `media_host`
    pub fn from_api(c: api::Comment, media_host: &str) -> CommentNode {
        CommentNode {
            id: c.id,
            author: Author::from_api(&c.author, media_host),
            content: c.content,
            created_at: c.created_at,
            liked: c.liked,
            total_likes: c.total_likes,
            replies: Forest::from_api(c.replies, media_host),
        }
    }

    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author.id == user
    }

    pub fn with_content(&self, content: String) -> CommentNode {
        CommentNode {
            content,
            ..self.clone()
        }
    }

    pub fn with_like(&self, like: &LikeStatus) -> CommentNode {
        CommentNode {
            liked: like.liked,
            total_likes: like.total_likes,
            ..self.clone()
        }
    }

    pub fn with_reply(&self, reply: CommentNode) -> CommentNode {
        let mut res = self.clone();
        res.replies.push(reply);
        res
    }

    /// Number of nodes in this subtree, this one included
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.node_count()
    }
}
