/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-node state used by style invalidation.

#![deny(missing_docs)]

/// Whether a node, or something below it, has pending style invalidations.
///
/// This is what lets the invalidation pass prune every clean branch of the
/// tree.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum InvalidationState {
    /// Nothing to do here or below.
    #[default]
    Clean,
    /// Invalidation sets were scheduled on this element.
    SelfDirty,
    /// Some descendant, possibly across a shadow boundary, is dirty.
    DescendantDirty,
    /// Both of the above.
    SelfAndDescendantDirty,
}

impl InvalidationState {
    /// Whether invalidation sets were scheduled on this node.
    #[inline]
    pub fn needs_invalidation(self) -> bool {
        matches!(
            self,
            InvalidationState::SelfDirty | InvalidationState::SelfAndDescendantDirty
        )
    }

    /// Whether some descendant has invalidation sets scheduled.
    #[inline]
    pub fn child_needs_invalidation(self) -> bool {
        matches!(
            self,
            InvalidationState::DescendantDirty | InvalidationState::SelfAndDescendantDirty
        )
    }

    /// This state with the self-dirty bit set.
    #[inline]
    pub fn with_self_dirty(self) -> Self {
        if self.child_needs_invalidation() {
            InvalidationState::SelfAndDescendantDirty
        } else {
            InvalidationState::SelfDirty
        }
    }

    /// This state with the descendant-dirty bit set.
    #[inline]
    pub fn with_descendant_dirty(self) -> Self {
        if self.needs_invalidation() {
            InvalidationState::SelfAndDescendantDirty
        } else {
            InvalidationState::DescendantDirty
        }
    }
}

/// How much of the tree a style recalc must cover, in increasing order.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StyleChange {
    /// The element's style is up to date.
    #[default]
    NoStyleChange,
    /// Only the element itself needs its style recomputed.
    LocalStyleChange,
    /// The element and all of its descendants need their style recomputed.
    SubtreeStyleChange,
}
