use std::{
    collections::HashMap,
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    api::{
        self, CommentApi, CommentEdit, CommentId, LikeStatus, NewComment, RequestError,
    },
    CommentNode, Forest, Parent, Viewer,
};

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// A user action on the comment section
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    Create { parent: Parent, content: String },
    Edit { id: CommentId, content: String },
    Delete { id: CommentId },
    Like { id: CommentId },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Create {
                parent: Parent::Root,
                ..
            } => ActionKind::Comment,
            Action::Create { .. } => ActionKind::Reply,
            Action::Edit { .. } => ActionKind::Edit,
            Action::Delete { .. } => ActionKind::Delete,
            Action::Like { .. } => ActionKind::Like,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ActionKind {
    Comment,
    Reply,
    Edit,
    Delete,
    Like,
}

impl ActionKind {
    /// Shown when the service rejects the action without saying why
    pub fn fallback_message(self) -> &'static str {
        match self {
            ActionKind::Comment => "Failed to post comment.",
            ActionKind::Reply => "Failed to post reply.",
            ActionKind::Edit => "Failed to edit comment.",
            ActionKind::Delete => "Failed to delete comment.",
            ActionKind::Like => "Failed to update like status.",
        }
    }

    pub fn user_message(self, err: &RequestError) -> String {
        match err {
            RequestError::NetworkFailure(_) => String::from(NETWORK_ERROR_MESSAGE),
            RequestError::RequestRejected { reason, .. } => reason
                .clone()
                .unwrap_or_else(|| String::from(self.fallback_message())),
        }
    }
}

/// Identifies one dispatched action until it completes
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ticket(u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionState {
    /// Unknown to this section
    Idle,
    Pending,
    /// The service confirmed, the tree was updated
    Applied,
    /// The action failed, the tree is as it was before dispatch
    RolledBack,
}

#[derive(Debug)]
pub enum Dispatch<P = PendingAction> {
    /// There is no viewer, nothing was sent
    SignInRequested,
    /// Blank comment body, nothing was sent
    Ignored,
    /// Refused before reaching the network
    Invalid(api::Error),
    Pending(P),
}

impl<P> Dispatch<P> {
    pub fn into_pending(self) -> Option<P> {
        match self {
            Dispatch::Pending(p) => Some(p),
            _ => None,
        }
    }

    pub fn map_pending<Q>(self, f: impl FnOnce(P) -> Q) -> Dispatch<Q> {
        match self {
            Dispatch::SignInRequested => Dispatch::SignInRequested,
            Dispatch::Ignored => Dispatch::Ignored,
            Dispatch::Invalid(e) => Dispatch::Invalid(e),
            Dispatch::Pending(p) => Dispatch::Pending(f(p)),
        }
    }
}

enum Outcome {
    Created {
        parent: Parent,
        result: Result<api::Comment, RequestError>,
    },
    Edited {
        id: CommentId,
        content: String,
        result: Result<(), RequestError>,
    },
    Deleted {
        id: CommentId,
        result: Result<(), RequestError>,
    },
    Liked {
        id: CommentId,
        result: Result<LikeStatus, RequestError>,
    },
}

/// Server answer to a dispatched action, to be fed back to `CommentSection::complete`
pub struct Completion {
    ticket: Ticket,
    kind: ActionKind,
    outcome: Outcome,
}

impl Completion {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("ticket", &self.ticket)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The network half of an action; resolves once the service answered
pub struct PendingAction {
    ticket: Ticket,
    kind: ActionKind,
    future: BoxFuture<'static, Completion>,
}

impl PendingAction {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

impl Future for PendingAction {
    type Output = Completion;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Completion> {
        self.future.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAction")
            .field("ticket", &self.ticket)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Comments of one article, kept in sync with the blog service
///
/// Actions go through two steps: `dispatch` sends the request and returns a
/// `PendingAction`, whose `Completion` must then be handed to `complete`. The
/// tree only changes in `complete`, and only when the service confirmed.
/// Several actions may be in flight at once; completions are applied in the
/// order they are handed back, so for two actions on the same comment the
/// last answer wins.
#[derive(Debug)]
pub struct CommentSection {
    slug: String,
    media_host: String,
    forest: Forest,
    error: Option<String>,
    delete_target: Option<CommentId>,
    sign_in_requested: bool,
    next_ticket: u64,
    actions: HashMap<Ticket, ActionState>,
}

impl CommentSection {
    pub fn new(slug: String, media_host: String, forest: Forest) -> CommentSection {
        CommentSection {
            slug,
            media_host,
            forest,
            error: None,
            delete_target: None,
            sign_in_requested: false,
            next_ticket: 0,
            actions: HashMap::new(),
        }
    }

    pub fn from_article(article: api::Article, media_host: &str) -> CommentSection {
        let forest = Forest::from_api(article.comments, media_host);
        CommentSection::new(article.slug, String::from(media_host), forest)
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Message of the last failed action
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn sign_in_requested(&self) -> bool {
        self.sign_in_requested
    }

    pub fn dismiss_sign_in(&mut self) {
        self.sign_in_requested = false;
    }

    /// Comment awaiting delete confirmation
    pub fn delete_target(&self) -> Option<CommentId> {
        self.delete_target
    }

    pub fn request_delete(&mut self, id: CommentId) {
        self.delete_target = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
    }

    pub fn in_flight(&self) -> usize {
        self.actions
            .values()
            .filter(|s| **s == ActionState::Pending)
            .count()
    }

    pub fn state(&self, ticket: Ticket) -> ActionState {
        self.actions
            .get(&ticket)
            .copied()
            .unwrap_or(ActionState::Idle)
    }

    /// Dispatches a delete of the comment passed to `request_delete`
    pub fn confirm_delete(
        &mut self,
        api: &Arc<dyn CommentApi>,
        viewer: Option<&Viewer>,
    ) -> Dispatch {
        match self.delete_target {
            Some(id) => self.dispatch(api, viewer, Action::Delete { id }),
            None => Dispatch::Ignored,
        }
    }

    pub fn dispatch(
        &mut self,
        api: &Arc<dyn CommentApi>,
        viewer: Option<&Viewer>,
        action: Action,
    ) -> Dispatch {
        let viewer = match viewer {
            Some(v) => v,
            None => {
                tracing::debug!(?action, "comment action without viewer, requesting sign-in");
                self.sign_in_requested = true;
                return Dispatch::SignInRequested;
            }
        };
        match &action {
            Action::Create { content, .. } if content.trim().is_empty() => {
                return Dispatch::Ignored;
            }
            Action::Create { content, .. } | Action::Edit { content, .. } => {
                if let Err(e) = api::validate_content(content) {
                    self.error = Some(e.to_string());
                    return Dispatch::Invalid(e);
                }
            }
            Action::Delete { .. } | Action::Like { .. } => (),
        }

        self.error = None;
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        let kind = action.kind();
        self.actions.insert(ticket, ActionState::Pending);
        tracing::debug!(?ticket, ?kind, "dispatching comment action");

        let api = api.clone();
        let token = viewer.token.clone();
        let outcome = match action {
            Action::Create { parent, content } => {
                let comment = NewComment {
                    slug: self.slug.clone(),
                    content,
                    parent: parent.comment_id(),
                };
                async move {
                    let result = api.create_comment(&token, comment).await;
                    Outcome::Created { parent, result }
                }
                .boxed()
            }
            Action::Edit { id, content } => async move {
                let edit = CommentEdit {
                    content: content.clone(),
                };
                let result = api.update_comment(&token, id, edit).await;
                Outcome::Edited {
                    id,
                    content,
                    result,
                }
            }
            .boxed(),
            Action::Delete { id } => async move {
                let result = api.delete_comment(&token, id).await;
                Outcome::Deleted { id, result }
            }
            .boxed(),
            Action::Like { id } => async move {
                let result = api.toggle_like(&token, id).await;
                Outcome::Liked { id, result }
            }
            .boxed(),
        };
        Dispatch::Pending(PendingAction {
            ticket,
            kind,
            future: outcome
                .map(move |outcome| Completion {
                    ticket,
                    kind,
                    outcome,
                })
                .boxed(),
        })
    }

    /// Applies the service's answer to an action dispatched from this section
    pub fn complete(&mut self, completion: Completion) -> ActionState {
        let Completion {
            ticket,
            kind,
            outcome,
        } = completion;
        if self.state(ticket) != ActionState::Pending {
            tracing::warn!(?ticket, ?kind, "completing comment action that was not in flight");
        }

        let res = match outcome {
            Outcome::Created { parent, result } => result.map(|c| {
                if let Parent::Comment(p) = parent {
                    if !self.forest.contains(p) {
                        tracing::warn!(parent = ?p, reply = ?c.id, "reply to comment no longer in tree");
                    }
                }
                let node = CommentNode::from_api(c, &self.media_host);
                self.forest = self.forest.insert_reply(parent, node);
            }),
            Outcome::Edited {
                id,
                content,
                result,
            } => result.map(|()| self.forest = self.forest.edit_content(id, content)),
            Outcome::Deleted { id, result } => {
                self.delete_target = None;
                result.map(|()| self.forest = self.forest.remove(id))
            }
            Outcome::Liked { id, result } => {
                result.map(|like| self.forest = self.forest.set_like(id, &like))
            }
        };

        let state = match res {
            Ok(()) => {
                tracing::debug!(?ticket, ?kind, "comment action applied");
                ActionState::Applied
            }
            Err(err) => {
                tracing::warn!(?ticket, ?kind, %err, "comment action failed");
                self.error = Some(kind.user_message(&err));
                ActionState::RolledBack
            }
        };
        self.actions.insert(ticket, state);
        state
    }
}
