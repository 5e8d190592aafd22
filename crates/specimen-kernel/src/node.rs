//! Builder tree queries and rewriting
//!
//! Every operation here works on any [`BuilderNode`] and never mutates the
//! graph it is given: rewrites return a new root. Branches the rewrite did
//! not touch are shared (same `Arc`) between the old and the new tree,
//! touched branches are rebuilt through [`BuilderNode::compose`].

use crate::builder::BuilderRef;

/// Depth-first (pre-order) collection of every node satisfying `predicate`,
/// the root included
///
/// Leaf builders are never yielded; only builders with a node view are
/// candidates.
pub fn select_nodes<P>(graph: &BuilderRef, predicate: P) -> Vec<BuilderRef>
where
    P: Fn(&BuilderRef) -> bool,
{
    let mut found = Vec::new();
    select_into(graph, &predicate, &mut found);
    found
}

fn select_into<P>(graph: &BuilderRef, predicate: &P, found: &mut Vec<BuilderRef>)
where
    P: Fn(&BuilderRef) -> bool,
{
    let Some(node) = graph.as_node() else {
        return;
    };
    if predicate(graph) {
        found.push(graph.clone());
    }
    for child in node.children() {
        select_into(&child, predicate, found);
    }
}

/// First node satisfying `predicate` in depth-first order
pub fn find_node<P>(graph: &BuilderRef, predicate: P) -> Option<BuilderRef>
where
    P: Fn(&BuilderRef) -> bool,
{
    select_nodes(graph, predicate).into_iter().next()
}

/// Depth-first collection of every node with at least one immediate child
/// satisfying `predicate`
///
/// Each parent is yielded once, however many of its children match.
pub fn parents<P>(graph: &BuilderRef, predicate: P) -> Vec<BuilderRef>
where
    P: Fn(&BuilderRef) -> bool,
{
    let mut found = Vec::new();
    parents_into(graph, &predicate, &mut found);
    found
}

fn parents_into<P>(graph: &BuilderRef, predicate: &P, found: &mut Vec<BuilderRef>)
where
    P: Fn(&BuilderRef) -> bool,
{
    let Some(node) = graph.as_node() else {
        return;
    };
    let children = node.children();
    if children.iter().any(predicate) {
        found.push(graph.clone());
    }
    for child in &children {
        parents_into(child, predicate, found);
    }
}

/// Replace every node satisfying `when` by `with`
///
/// Matching nodes are not searched further; the replacement is inserted
/// as-is.
#[must_use]
pub fn replace_node<P>(graph: &BuilderRef, with: &BuilderRef, when: P) -> BuilderRef
where
    P: Fn(&BuilderRef) -> bool,
{
    rewrite(graph, &when, &|_| with.clone())
}

/// Recompose every node satisfying `when` around `children`
///
/// The matching node keeps its kind (and decorations) but loses its
/// previous children.
#[must_use]
pub fn replace_children<P>(graph: &BuilderRef, children: &[BuilderRef], when: P) -> BuilderRef
where
    P: Fn(&BuilderRef) -> bool,
{
    rewrite(graph, &when, &|matched| match matched.as_node() {
        Some(node) => node.compose(children.to_vec()),
        None => matched.clone(),
    })
}

/// Replace every node satisfying `when` by `with(node)`
#[must_use]
pub fn replace_nodes<P, W>(graph: &BuilderRef, with: W, when: P) -> BuilderRef
where
    P: Fn(&BuilderRef) -> bool,
    W: Fn(&BuilderRef) -> BuilderRef,
{
    rewrite(graph, &when, &with)
}

fn rewrite<P, W>(graph: &BuilderRef, when: &P, with: &W) -> BuilderRef
where
    P: Fn(&BuilderRef) -> bool,
    W: Fn(&BuilderRef) -> BuilderRef,
{
    let Some(node) = graph.as_node() else {
        return graph.clone();
    };
    if when(graph) {
        return with(graph);
    }

    let children = node.children();
    let rewritten: Vec<BuilderRef> = children.iter().map(|c| rewrite(c, when, with)).collect();
    let unchanged = children
        .iter()
        .zip(&rewritten)
        .all(|(before, after)| std::sync::Arc::ptr_eq(before, after));
    if unchanged {
        graph.clone()
    } else {
        node.compose(rewritten)
    }
}
