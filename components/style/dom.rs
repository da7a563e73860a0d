/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Types and traits used to access the DOM from style invalidation.
//!
//! The style system never owns DOM nodes. The embedder implements these
//! traits over handles to its own nodes and keeps the per-node state
//! (`InvalidationState`, `StyleChange`) with whatever interior mutability it
//! uses for the rest of its node data.

#![deny(missing_docs)]

use crate::data::{InvalidationState, StyleChange};
use crate::Atom;
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;

/// An iterator over the DOM children of a node.
pub struct DomChildren<N>(Option<N>);

impl<N> Iterator for DomChildren<N>
where
    N: TNode,
{
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let n = self.0.take()?;
        self.0 = n.next_sibling();
        Some(n)
    }
}

/// The `TNode` trait. This is the main generic trait over which the style
/// invalidation code is written.
pub trait TNode: Sized + Copy + Debug + PartialEq {
    /// The concrete `TElement` type.
    type ConcreteElement: TElement<ConcreteNode = Self>;

    /// Get this node's parent, or the host element if this node is a shadow
    /// root.
    fn parent_or_shadow_host_node(&self) -> Option<Self>;

    /// Get this node's first child.
    fn first_child(&self) -> Option<Self>;

    /// Get this node's next sibling.
    fn next_sibling(&self) -> Option<Self>;

    /// Get this node as an element, if it's one.
    fn as_element(&self) -> Option<Self::ConcreteElement>;

    /// The pending-invalidation bits of this node.
    fn invalidation_state(&self) -> InvalidationState;

    /// Overwrite the pending-invalidation bits of this node.
    fn set_invalidation_state(&self, state: InvalidationState);

    /// Iterate over the DOM children of a node, in tree order.
    #[inline(always)]
    fn dom_children(&self) -> DomChildren<Self> {
        DomChildren(self.first_child())
    }

    /// Whether invalidation sets were scheduled on this node.
    #[inline]
    fn needs_style_invalidation(&self) -> bool {
        self.invalidation_state().needs_invalidation()
    }

    /// Whether some descendant of this node has invalidation sets scheduled.
    #[inline]
    fn child_needs_style_invalidation(&self) -> bool {
        self.invalidation_state().child_needs_invalidation()
    }

    /// Mark this node as having scheduled invalidation sets, and every
    /// ancestor as having a dirty descendant.
    fn set_needs_style_invalidation(&self) {
        self.set_invalidation_state(self.invalidation_state().with_self_dirty());
        self.mark_ancestors_with_child_needs_style_invalidation();
    }

    /// Propagate the descendant-dirty bit up through parents and shadow
    /// hosts, stopping at the first ancestor that already has it.
    fn mark_ancestors_with_child_needs_style_invalidation(&self) {
        let mut current = self.parent_or_shadow_host_node();
        while let Some(node) = current {
            let state = node.invalidation_state();
            if state.child_needs_invalidation() {
                break;
            }
            node.set_invalidation_state(state.with_descendant_dirty());
            current = node.parent_or_shadow_host_node();
        }
    }

    /// Reset this node to `InvalidationState::Clean`.
    #[inline]
    fn clear_invalidation_state(&self) {
        self.set_invalidation_state(InvalidationState::Clean);
    }
}

/// The element trait, the main abstraction the invalidation code uses to
/// query an element.
pub trait TElement: Eq + Hash + Copy + Debug {
    /// The concrete node type.
    type ConcreteNode: TNode<ConcreteElement = Self>;

    /// Get this element as a node.
    fn as_node(&self) -> Self::ConcreteNode;

    /// The local name of this element.
    fn local_name(&self) -> &Atom;

    /// The id of this element, if it has one.
    fn id(&self) -> Option<&Atom>;

    /// Call `callback` once per class of this element.
    fn each_class<F>(&self, callback: F)
    where
        F: FnMut(&Atom);

    /// Whether this element carries `name` in its class list.
    fn has_class(&self, name: &Atom) -> bool {
        let mut found = false;
        self.each_class(|class| found |= class == name);
        found
    }

    /// The custom pseudo-element name this element is exposed as, for
    /// user-agent shadow tree parts like `::-webkit-slider-thumb`.
    fn shadow_pseudo_id(&self) -> Option<&Atom>;

    /// The shadow roots hosted by this element, oldest first.
    fn shadow_roots(&self) -> SmallVec<[Self::ConcreteNode; 1]>;

    /// The pending style recalc of this element.
    fn style_change(&self) -> StyleChange;

    /// Request at least `change` for this element. Implementations never
    /// lower an already pending change.
    fn set_needs_style_recalc(&self, change: StyleChange);
}

/// The `TDocument` trait, to represent a document node.
pub trait TDocument: Sized + Copy + Clone {
    /// The concrete `TNode` type.
    type ConcreteNode: TNode;

    /// Get this document as a `TNode`.
    fn as_node(&self) -> Self::ConcreteNode;

    /// The root element of the document, if any.
    fn document_element(
        &self,
    ) -> Option<<Self::ConcreteNode as TNode>::ConcreteElement> {
        self.as_node().dom_children().find_map(|n| n.as_element())
    }
}
