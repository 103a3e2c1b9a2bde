use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use inkpost_api::{
    self as api, Article, AuthToken, CommentApi, CommentEdit, CommentId, Credentials, Error,
    LikeStatus, NewComment, PostId, RequestError, Time, TokenPair, User, UserId,
};
use parking_lot::{Mutex, MutexGuard};
use uuid::Uuid;

/// In-memory blog service following the same comment rules as the real one
pub struct MockServer(Mutex<State>);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verb {
    Comment,
    Reply,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub recipient: UserId,
    pub actor: UserId,
    pub verb: Verb,
    pub post: PostId,
    pub comment: CommentId,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, DbUser>,
    sessions: HashMap<AuthToken, UserId>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, StoredComment>,
    notifications: Vec<Notification>,
    last_id: i64,
    calls: usize,
    offline: bool,
}

#[derive(Debug)]
struct DbUser {
    user: User,
    pass: String,
}

#[derive(Debug)]
struct Post {
    slug: String,
    title: String,
    author: UserId,
    created_at: Time,
}

#[derive(Debug)]
struct StoredComment {
    post: PostId,
    author: UserId,
    parent: Option<CommentId>,
    content: String,
    created_at: Time,
    updated_at: Time,
    likes: HashSet<UserId>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn resolve(&self, tok: &AuthToken) -> Result<UserId, Error> {
        self.sessions
            .get(tok)
            .copied()
            .ok_or(Error::Unauthenticated)
    }

    fn user(&self, id: UserId) -> User {
        self.users
            .get(&id)
            .map(|u| u.user.clone())
            .unwrap_or_else(|| panic!("comment author {id:?} is not a known user"))
    }

    fn comment(&self, id: CommentId, missing: &str) -> Result<&StoredComment, Error> {
        self.comments
            .get(&id)
            .ok_or_else(|| Error::NotFound(String::from(missing)))
    }

    /// Children of `parent` within `post`, in creation order
    fn children(&self, post: PostId, parent: Option<CommentId>) -> Vec<CommentId> {
        let mut res = self
            .comments
            .iter()
            .filter(|(_, c)| c.post == post && c.parent == parent)
            .map(|(id, c)| (c.created_at, *id))
            .collect::<Vec<_>>();
        res.sort();
        res.into_iter().map(|(_, id)| id).collect()
    }

    fn render(&self, id: CommentId, viewer: Option<UserId>) -> api::Comment {
        let c = &self.comments[&id];
        api::Comment {
            id,
            post: c.post,
            author: self.user(c.author),
            parent: c.parent,
            content: c.content.clone(),
            is_approved: true,
            created_at: c.created_at,
            updated_at: c.updated_at,
            replies: self
                .children(c.post, Some(id))
                .into_iter()
                .map(|r| self.render(r, viewer))
                .collect(),
            total_likes: c.likes.len() as u64,
            liked: viewer.map(|v| c.likes.contains(&v)).unwrap_or(false),
        }
    }

    fn subtree(&self, id: CommentId) -> Vec<CommentId> {
        let post = self.comments[&id].post;
        let mut res = vec![id];
        for child in self.children(post, Some(id)) {
            res.extend(self.subtree(child));
        }
        res
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(State::default()))
    }

    // Every remote call goes through here, so that it gets counted and can be made to fail
    fn enter(&self) -> Result<MutexGuard<'_, State>, RequestError> {
        let mut s = self.0.lock();
        s.calls += 1;
        match s.offline {
            true => Err(RequestError::NetworkFailure(String::from(
                "connection refused",
            ))),
            false => Ok(s),
        }
    }

    pub fn admin_create_user(
        &self,
        email: &str,
        full_name: Option<&str>,
        password: &str,
    ) -> Result<UserId, Error> {
        let mut s = self.0.lock();
        if s.users.values().any(|u| u.user.email == email) {
            return Err(Error::InvalidField {
                field: String::from("email"),
                message: String::from("user with this email already exists."),
            });
        }
        let id = UserId(s.next_id());
        s.users.insert(
            id,
            DbUser {
                user: User {
                    id,
                    email: String::from(email),
                    full_name: full_name.map(String::from),
                    profile_picture: None,
                    is_active: true,
                },
                pass: String::from(password),
            },
        );
        Ok(id)
    }

    pub fn admin_set_profile_picture(&self, user: UserId, path: &str) {
        if let Some(u) = self.0.lock().users.get_mut(&user) {
            u.user.profile_picture = Some(String::from(path));
        }
    }

    pub fn admin_create_post(
        &self,
        author: UserId,
        slug: &str,
        title: &str,
    ) -> Result<PostId, Error> {
        let mut s = self.0.lock();
        if !s.users.contains_key(&author) {
            return Err(Error::NotFound(String::from("Author not found.")));
        }
        if s.posts.values().any(|p| p.slug == slug) {
            return Err(Error::InvalidField {
                field: String::from("slug"),
                message: String::from("blog post with this slug already exists."),
            });
        }
        let id = PostId(s.next_id());
        s.posts.insert(
            id,
            Post {
                slug: String::from(slug),
                title: String::from(title),
                author,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    /// Return the number of remote calls received so far
    pub fn test_num_calls(&self) -> usize {
        self.0.lock().calls
    }

    /// Return the number of stored comments, replies included
    pub fn test_num_comments(&self) -> usize {
        self.0.lock().comments.len()
    }

    pub fn test_notifications(&self) -> Vec<Notification> {
        self.0.lock().notifications.clone()
    }

    /// While offline, every remote call fails as if the host was unreachable
    pub fn test_set_offline(&self, offline: bool) {
        self.0.lock().offline = offline;
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentApi for MockServer {
    async fn login(&self, creds: Credentials) -> Result<TokenPair, RequestError> {
        let mut s = self.enter()?;
        let user = s
            .users
            .values()
            .find(|u| u.user.email == creds.email && u.pass == creds.password)
            .map(|u| u.user.clone())
            .ok_or(Error::InvalidCredentials)?;
        let access = AuthToken(Uuid::new_v4().to_string());
        s.sessions.insert(access.clone(), user.id);
        Ok(TokenPair {
            access,
            refresh: AuthToken(Uuid::new_v4().to_string()),
            user,
        })
    }

    async fn whoami(&self, token: &AuthToken) -> Result<User, RequestError> {
        let s = self.enter()?;
        let id = s.resolve(token)?;
        Ok(s.user(id))
    }

    async fn fetch_article(
        &self,
        token: Option<&AuthToken>,
        slug: &str,
    ) -> Result<Article, RequestError> {
        let s = self.enter()?;
        // an unknown token on a read-only endpoint is an error, a missing one is not
        let viewer = token.map(|t| s.resolve(t)).transpose()?;
        let (id, post) = s
            .posts
            .iter()
            .find(|(_, p)| p.slug == slug)
            .ok_or_else(|| Error::NotFound(String::from("Not found.")))?;
        let comments = s
            .children(*id, None)
            .into_iter()
            .map(|c| s.render(c, viewer))
            .collect::<Vec<_>>();
        Ok(Article {
            id: *id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            author: s.user(post.author),
            created_at: post.created_at,
            total_comments: s.comments.values().filter(|c| c.post == *id).count() as u64,
            comments,
        })
    }

    async fn create_comment(
        &self,
        token: &AuthToken,
        comment: NewComment,
    ) -> Result<api::Comment, RequestError> {
        let mut s = self.enter()?;
        let author = s.resolve(token)?;
        if comment.slug.is_empty() {
            return Err(Error::Invalid(String::from("Blog post slug is required.")).into());
        }
        let (post_id, post_author) = s
            .posts
            .iter()
            .find(|(_, p)| p.slug == comment.slug)
            .map(|(id, p)| (*id, p.author))
            .ok_or_else(|| Error::NotFound(String::from("Blog post not found.")))?;
        api::validate_content(&comment.content)?;
        let parent_author = match comment.parent {
            None => None,
            Some(p) => match s.comments.get(&p) {
                Some(parent) if parent.post == post_id => Some(parent.author),
                _ => {
                    return Err(Error::InvalidField {
                        field: String::from("parent"),
                        message: format!("Invalid pk \"{}\" - object does not exist.", p.0),
                    }
                    .into())
                }
            },
        };

        let id = CommentId(s.next_id());
        let now = Utc::now();
        s.comments.insert(
            id,
            StoredComment {
                post: post_id,
                author,
                parent: comment.parent,
                content: comment.content,
                created_at: now,
                updated_at: now,
                likes: HashSet::new(),
            },
        );

        let (recipient, verb) = match parent_author {
            Some(parent_author) => (parent_author, Verb::Reply),
            None => (post_author, Verb::Comment),
        };
        if recipient != author {
            s.notifications.push(Notification {
                recipient,
                actor: author,
                verb,
                post: post_id,
                comment: id,
            });
        }

        Ok(s.render(id, Some(author)))
    }

    async fn update_comment(
        &self,
        token: &AuthToken,
        id: CommentId,
        edit: CommentEdit,
    ) -> Result<(), RequestError> {
        let mut s = self.enter()?;
        let user = s.resolve(token)?;
        if s.comment(id, "Not found.")?.author != user {
            return Err(Error::PermissionDenied(String::from(
                "You do not have permission to edit this comment.",
            ))
            .into());
        }
        api::validate_content(&edit.content)?;
        let c = s.comments.get_mut(&id).expect("checked above");
        c.content = edit.content;
        c.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_comment(&self, token: &AuthToken, id: CommentId) -> Result<(), RequestError> {
        let mut s = self.enter()?;
        let user = s.resolve(token)?;
        if s.comment(id, "Not found.")?.author != user {
            return Err(Error::PermissionDenied(String::from(
                "You do not have permission to delete this comment.",
            ))
            .into());
        }
        for c in s.subtree(id) {
            s.comments.remove(&c);
        }
        Ok(())
    }

    async fn toggle_like(
        &self,
        token: &AuthToken,
        id: CommentId,
    ) -> Result<LikeStatus, RequestError> {
        let mut s = self.enter()?;
        let user = s.resolve(token)?;
        s.comment(id, "Comment not found.")?;
        let c = s.comments.get_mut(&id).expect("checked above");
        let liked = match c.likes.remove(&user) {
            true => false,
            false => c.likes.insert(user),
        };
        Ok(LikeStatus {
            liked,
            total_likes: c.likes.len() as u64,
            message: Some(String::from(match liked {
                true => "Comment liked.",
                false => "Comment unliked.",
            })),
        })
    }
}
