use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use parking_lot::Mutex;

use crate::{
    api::{CommentApi, RequestError},
    Action, ActionState, CommentSection, Dispatch, Forest, Viewer,
};

/// Owns the comment section of the article currently on screen
///
/// Dropping the handle tears the section down. Actions still in flight at that
/// point complete against nothing: their result is discarded and their future
/// resolves to `None`.
pub struct SectionHandle {
    section: Arc<Mutex<CommentSection>>,
    api: Arc<dyn CommentApi>,
}

impl SectionHandle {
    pub fn new(section: CommentSection, api: Arc<dyn CommentApi>) -> SectionHandle {
        SectionHandle {
            section: Arc::new(Mutex::new(section)),
            api,
        }
    }

    /// Fetches the article `slug` and builds its comment section
    pub async fn load(
        api: Arc<dyn CommentApi>,
        viewer: Option<&Viewer>,
        slug: &str,
        media_host: &str,
    ) -> Result<SectionHandle, RequestError> {
        let article = api.fetch_article(viewer.map(|v| &v.token), slug).await?;
        tracing::info!(
            slug,
            num_comments = article.total_comments,
            "loaded comment section"
        );
        Ok(SectionHandle::new(
            CommentSection::from_article(article, media_host),
            api,
        ))
    }

    pub fn forest(&self) -> Forest {
        self.section.lock().forest().clone()
    }

    pub fn error(&self) -> Option<String> {
        self.section.lock().error().map(String::from)
    }

    /// Runs `f` on the section, for the state that does not involve the network
    pub fn with<R>(&self, f: impl FnOnce(&mut CommentSection) -> R) -> R {
        f(&mut self.section.lock())
    }

    /// Starts `action`; the returned future sends it and applies the answer
    ///
    /// The future resolves to the final state of the action, or to `None` if
    /// the section was torn down meanwhile.
    pub fn submit(
        &self,
        viewer: Option<&Viewer>,
        action: Action,
    ) -> Dispatch<BoxFuture<'static, Option<ActionState>>> {
        let dispatch = self.section.lock().dispatch(&self.api, viewer, action);
        self.settle(dispatch)
    }

    /// Like `submit`, for the delete awaiting confirmation
    pub fn confirm_delete(
        &self,
        viewer: Option<&Viewer>,
    ) -> Dispatch<BoxFuture<'static, Option<ActionState>>> {
        let dispatch = self.section.lock().confirm_delete(&self.api, viewer);
        self.settle(dispatch)
    }

    fn settle(&self, dispatch: Dispatch) -> Dispatch<BoxFuture<'static, Option<ActionState>>> {
        let section = Arc::downgrade(&self.section);
        dispatch.map_pending(move |pending| {
            async move {
                let completion = pending.await;
                match section.upgrade() {
                    Some(section) => Some(section.lock().complete(completion)),
                    None => {
                        tracing::debug!(
                            ticket = ?completion.ticket(),
                            kind = ?completion.kind(),
                            "comment section was torn down, discarding completion"
                        );
                        None
                    }
                }
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_util::{fixture, MEDIA_HOST, SLUG},
        Parent,
    };

    #[tokio::test]
    async fn load_and_reply() {
        let f = fixture().await;
        let root = f.seed(&f.ada, None, "root").await;
        let handle = SectionHandle::load(f.api.clone(), Some(&f.bob), SLUG, MEDIA_HOST)
            .await
            .expect("loading section");
        assert_eq!(handle.with(|s| String::from(s.slug())), SLUG);
        assert_eq!(handle.forest().node_count(), 1);

        let done = handle
            .submit(
                Some(&f.bob),
                Action::Create {
                    parent: Parent::Comment(root),
                    content: String::from("hi"),
                },
            )
            .into_pending()
            .expect("reply was not sent")
            .await;
        assert_eq!(done, Some(ActionState::Applied));
        assert_eq!(handle.forest().node_count(), 2);
        assert_eq!(handle.error(), None);
    }

    #[tokio::test]
    async fn loading_unknown_article_fails() {
        let f = fixture().await;
        let res = SectionHandle::load(f.api.clone(), None, "nope", MEDIA_HOST).await;
        assert!(matches!(
            res.err().and_then(|e| e.reason().map(String::from)).as_deref(),
            Some("Not found.")
        ));
    }

    #[tokio::test]
    async fn completion_after_teardown_is_discarded() {
        let f = fixture().await;
        let root = f.seed(&f.ada, None, "root").await;
        let handle = SectionHandle::new(f.section(&f.ada).await, f.api.clone());

        let pending = handle
            .submit(
                Some(&f.ada),
                Action::Edit {
                    id: root,
                    content: String::from("edited"),
                },
            )
            .into_pending()
            .expect("edit was not sent");
        drop(handle);

        assert_eq!(pending.await, None);
        // the service still saw the edit, only the local result was dropped
        let article = f
            .api
            .fetch_article(None, SLUG)
            .await
            .expect("fetching article");
        assert_eq!(article.comments[0].content, "edited");
    }

    #[tokio::test]
    async fn delete_through_handle() {
        let f = fixture().await;
        let root = f.seed(&f.ada, None, "root").await;
        let handle = SectionHandle::new(f.section(&f.ada).await, f.api.clone());

        assert!(matches!(handle.confirm_delete(Some(&f.ada)), Dispatch::Ignored));
        handle.with(|s| s.request_delete(root));
        let done = handle
            .confirm_delete(Some(&f.ada))
            .into_pending()
            .expect("delete was not sent")
            .await;
        assert_eq!(done, Some(ActionState::Applied));
        assert!(handle.forest().is_empty());
        assert_eq!(handle.with(|s| s.delete_target()), None);
    }

    #[tokio::test]
    async fn anonymous_like_requests_sign_in() {
        let f = fixture().await;
        let root = f.seed(&f.ada, None, "root").await;
        let handle = SectionHandle::load(f.api.clone(), None, SLUG, MEDIA_HOST)
            .await
            .expect("loading section");
        let calls = f.server.test_num_calls();

        assert!(matches!(
            handle.submit(None, Action::Like { id: root }),
            Dispatch::SignInRequested
        ));
        assert!(handle.with(|s| s.sign_in_requested()));
        assert_eq!(f.server.test_num_calls(), calls);
        assert!(!handle.forest().find(root).expect("root").liked);
    }
}
