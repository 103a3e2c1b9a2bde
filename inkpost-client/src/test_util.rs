use std::sync::Arc;

use chrono::TimeZone;
use inkpost_mock_server::MockServer;

use crate::{
    api::{CommentApi, CommentId, Credentials, LikeStatus, NewComment, UserId},
    Author, CommentNode, CommentSection, Forest, Viewer,
};

pub fn node(id: i64, replies: Vec<CommentNode>) -> CommentNode {
    CommentNode {
        id: CommentId(id),
        content: format!("comment {id}"),
        author: Author {
            id: UserId(1),
            display_name: String::from("Ada"),
            avatar_url: None,
        },
        created_at: chrono::Utc
            .timestamp_opt(1_700_000_000 + id, 0)
            .single()
            .expect("valid timestamp"),
        liked: false,
        total_likes: 0,
        replies: replies.into_iter().collect(),
    }
}

pub fn like(liked: bool, total_likes: u64) -> LikeStatus {
    LikeStatus {
        liked,
        total_likes,
        message: None,
    }
}

/// Top-level ids of `forest`
pub fn ids(forest: &Forest) -> Vec<i64> {
    forest.iter().map(|n| n.id.0).collect()
}

pub fn forest_of(nodes: Vec<CommentNode>) -> Forest {
    nodes.into_iter().collect()
}

pub const SLUG: &str = "trees";
pub const MEDIA_HOST: &str = "http://blog.test";

/// A mock blog with one article by ada, and both ada and bob signed in
pub struct Fixture {
    pub server: Arc<MockServer>,
    pub api: Arc<dyn CommentApi>,
    pub ada: Viewer,
    pub bob: Viewer,
}

pub async fn fixture() -> Fixture {
    let server = Arc::new(MockServer::new());
    let ada = server
        .admin_create_user("ada@x.org", Some("Ada"), "pass-a")
        .expect("creating ada");
    server
        .admin_create_user("bob@x.org", None, "pass-b")
        .expect("creating bob");
    server.admin_set_profile_picture(ada, "/media/pfp/ada.png");
    server
        .admin_create_post(ada, SLUG, "Trees")
        .expect("creating post");
    let ada = login(&server, "ada@x.org", "pass-a").await;
    let bob = login(&server, "bob@x.org", "pass-b").await;
    Fixture {
        api: server.clone(),
        server,
        ada,
        bob,
    }
}

async fn login(server: &MockServer, email: &str, password: &str) -> Viewer {
    server
        .login(Credentials {
            email: String::from(email),
            password: String::from(password),
        })
        .await
        .expect("logging in")
        .into()
}

impl Fixture {
    /// Posts a comment directly on the server, bypassing any section
    pub async fn seed(&self, who: &Viewer, parent: Option<CommentId>, text: &str) -> CommentId {
        self.server
            .create_comment(
                &who.token,
                NewComment {
                    slug: String::from(SLUG),
                    content: String::from(text),
                    parent,
                },
            )
            .await
            .expect("seeding comment")
            .id
    }

    pub async fn section(&self, viewer: &Viewer) -> CommentSection {
        let article = self
            .server
            .fetch_article(Some(&viewer.token), SLUG)
            .await
            .expect("fetching article");
        CommentSection::from_article(article, MEDIA_HOST)
    }
}
