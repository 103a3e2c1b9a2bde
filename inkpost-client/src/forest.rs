use std::sync::Arc;

use crate::{
    api::{self, CommentId, LikeStatus},
    CommentNode,
};

/// Where a new comment goes: at the top level of the article, or under an existing comment
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Parent {
    Root,
    Comment(CommentId),
}

impl Parent {
    pub fn comment_id(self) -> Option<CommentId> {
        match self {
            Parent::Root => None,
            Parent::Comment(id) => Some(id),
        }
    }
}

impl From<Option<CommentId>> for Parent {
    fn from(id: Option<CommentId>) -> Parent {
        id.map(Parent::Comment).unwrap_or(Parent::Root)
    }
}

/// Ordered sequence of comment trees
///
/// Every operation is pure and returns a new forest. Nodes are shared between
/// versions: a mutation only allocates new nodes along the path from the roots
/// to the nodes it touches, every other `Arc<CommentNode>` stays the same
/// allocation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Forest(im::Vector<Arc<CommentNode>>);

impl Forest {
    pub fn new() -> Forest {
        Forest(im::Vector::new())
    }

    pub fn from_api(comments: Vec<api::Comment>, media_host: &str) -> Forest {
        comments
            .into_iter()
            .map(|c| CommentNode::from_api(c, media_host))
            .collect()
    }

    /// Number of top-level nodes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of nodes at all nesting levels
    pub fn node_count(&self) -> usize {
        self.0.iter().map(|n| n.subtree_len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommentNode>> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<CommentNode>> {
        self.0.get(index)
    }

    /// Depth-first search for `id` at any nesting level
    pub fn find(&self, id: CommentId) -> Option<&Arc<CommentNode>> {
        self.0.iter().find_map(|n| match n.id == id {
            true => Some(n),
            false => n.replies.find(id),
        })
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.find(id).is_some()
    }

    pub(crate) fn push(&mut self, node: CommentNode) {
        self.0.push_back(Arc::new(node));
    }

    /// Replaces the node `id` with `f(node)`, rebuilding its ancestors
    ///
    /// Returns an unchanged forest if `id` is not found.
    pub fn update_in<F>(&self, id: CommentId, f: F) -> Forest
    where
        F: FnOnce(&CommentNode) -> CommentNode,
    {
        let mut f = Some(f);
        self.rebuild_path(id, &mut f).unwrap_or_else(|| self.clone())
    }

    fn rebuild_path<F>(&self, id: CommentId, f: &mut Option<F>) -> Option<Forest>
    where
        F: FnOnce(&CommentNode) -> CommentNode,
    {
        for (i, node) in self.0.iter().enumerate() {
            let updated = match node.id == id {
                true => (f.take()?)(&**node),
                false => match node.replies.rebuild_path(id, f) {
                    Some(replies) => CommentNode {
                        replies,
                        ..(**node).clone()
                    },
                    None => continue,
                },
            };
            return Some(Forest(self.0.update(i, Arc::new(updated))));
        }
        None
    }

    /// Appends `child` to the replies of `parent`, or to the roots for `Parent::Root`
    pub fn insert_reply(&self, parent: Parent, child: CommentNode) -> Forest {
        match parent {
            Parent::Root => {
                let mut res = self.clone();
                res.push(child);
                res
            }
            Parent::Comment(id) => self.update_in(id, move |p| p.with_reply(child)),
        }
    }

    pub fn edit_content(&self, id: CommentId, content: String) -> Forest {
        self.update_in(id, move |n| n.with_content(content))
    }

    pub fn set_like(&self, id: CommentId, like: &LikeStatus) -> Forest {
        self.update_in(id, |n| n.with_like(like))
    }

    /// Removes `id` and its whole subtree, wherever it is
    pub fn remove(&self, id: CommentId) -> Forest {
        self.filtered(id).unwrap_or_else(|| self.clone())
    }

    // Unlike `rebuild_path` this looks at every level and does not stop at the first hit
    fn filtered(&self, id: CommentId) -> Option<Forest> {
        let mut changed = false;
        let res = self
            .0
            .iter()
            .filter_map(|node| {
                if node.id == id {
                    changed = true;
                    return None;
                }
                Some(match node.replies.filtered(id) {
                    Some(replies) => {
                        changed = true;
                        Arc::new(CommentNode {
                            replies,
                            ..(**node).clone()
                        })
                    }
                    None => node.clone(),
                })
            })
            .collect::<im::Vector<_>>();
        changed.then(|| Forest(res))
    }
}

impl FromIterator<CommentNode> for Forest {
    fn from_iter<I: IntoIterator<Item = CommentNode>>(iter: I) -> Forest {
        Forest(iter.into_iter().map(Arc::new).collect())
    }
}
