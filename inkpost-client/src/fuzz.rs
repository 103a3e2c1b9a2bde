#![cfg(test)]

use std::{collections::HashSet, sync::Arc};

use crate::{api::CommentId, test_util::node, CommentNode, Forest, Parent};

const MAX_NODES: usize = 64;

/// A random forest, described by the parent of each node
///
/// Node `i` has id `i + 1`; its parent is either the root or one of the nodes
/// before it, so any byte string describes a valid forest.
struct Shape {
    parents: Vec<Option<usize>>,
}

impl Shape {
    fn new(mut bytes: Vec<u8>) -> Shape {
        bytes.truncate(MAX_NODES);
        let parents = bytes
            .into_iter()
            .enumerate()
            .map(|(i, b)| match b as usize % (i + 1) {
                0 => None,
                p => Some(p - 1),
            })
            .collect();
        Shape { parents }
    }

    fn len(&self) -> usize {
        self.parents.len()
    }

    fn build(&self) -> Forest {
        self.children_of(None).into_iter().collect()
    }

    fn children_of(&self, parent: Option<usize>) -> Vec<CommentNode> {
        (0..self.len())
            .filter(|i| self.parents[*i] == parent)
            .map(|i| node(i as i64 + 1, self.children_of(Some(i))))
            .collect()
    }

    /// Ids of `i` and all its ancestors
    fn path_to(&self, mut i: usize) -> HashSet<CommentId> {
        let mut res = HashSet::new();
        res.insert(CommentId(i as i64 + 1));
        while let Some(p) = self.parents[i] {
            res.insert(CommentId(p as i64 + 1));
            i = p;
        }
        res
    }

    fn ids(&self) -> impl Iterator<Item = CommentId> {
        (1..=self.len() as i64).map(CommentId)
    }
}

#[test]
fn update_only_rebuilds_path() {
    bolero::check!()
        .with_type::<(Vec<u8>, u8)>()
        .cloned()
        .for_each(|(bytes, target)| {
            let shape = Shape::new(bytes);
            if shape.len() == 0 {
                return;
            }
            let target = target as usize % shape.len();
            let path = shape.path_to(target);
            let forest = shape.build();
            let res = forest.edit_content(CommentId(target as i64 + 1), String::from("edited"));

            assert_eq!(res.node_count(), forest.node_count());
            for id in shape.ids() {
                let before = forest.find(id).expect("id in original forest");
                let after = res.find(id).expect("id in updated forest");
                assert_eq!(
                    Arc::ptr_eq(before, after),
                    !path.contains(&id),
                    "sharing of {id:?} when updating {target}"
                );
            }
        })
}

#[test]
fn update_of_absent_id_is_noop() {
    bolero::check!()
        .with_type::<Vec<u8>>()
        .cloned()
        .for_each(|bytes| {
            let shape = Shape::new(bytes);
            let forest = shape.build();
            let absent = CommentId(shape.len() as i64 + 1);
            let res = forest.update_in(absent, |n| n.with_content(String::from("edited")));
            assert_eq!(res, forest);
            for (a, b) in forest.iter().zip(res.iter()) {
                assert!(Arc::ptr_eq(a, b));
            }
        })
}

#[test]
fn delete_removes_exactly_the_subtree() {
    bolero::check!()
        .with_type::<(Vec<u8>, u8)>()
        .cloned()
        .for_each(|(bytes, target)| {
            let shape = Shape::new(bytes);
            if shape.len() == 0 {
                return;
            }
            let target = CommentId((target as usize % shape.len()) as i64 + 1);
            let forest = shape.build();
            let subtree = forest.find(target).expect("target in forest").subtree_len();
            let res = forest.remove(target);

            assert_eq!(res.node_count(), forest.node_count() - subtree);
            assert!(!res.contains(target));
            for id in shape.ids() {
                let in_subtree = forest
                    .find(target)
                    .map(|t| t.id == id || t.replies.contains(id))
                    .unwrap_or(false);
                assert_eq!(res.contains(id), !in_subtree, "presence of {id:?}");
            }
        })
}

#[test]
fn insert_reply_appends() {
    bolero::check!()
        .with_type::<(Vec<u8>, u8)>()
        .cloned()
        .for_each(|(bytes, target)| {
            let shape = Shape::new(bytes);
            let forest = shape.build();
            let child = node(shape.len() as i64 + 1, vec![]);
            let parent = match shape.len() {
                0 => Parent::Root,
                n => Parent::Comment(CommentId((target as usize % n) as i64 + 1)),
            };
            let res = forest.insert_reply(parent, child.clone());

            let (before, after) = match parent {
                Parent::Root => (forest.clone(), res.clone()),
                Parent::Comment(id) => (
                    forest.find(id).expect("parent in forest").replies.clone(),
                    res.find(id).expect("parent in result").replies.clone(),
                ),
            };
            assert_eq!(after.len(), before.len() + 1);
            for (i, prev) in before.iter().enumerate() {
                assert!(Arc::ptr_eq(prev, after.get(i).expect("prefix kept")));
            }
            assert_eq!(**after.get(before.len()).expect("appended child"), child);
            assert_eq!(res.node_count(), forest.node_count() + 1);
        })
}
