/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Scheduling and processing of descendant invalidation sets.
//!
//! Class changes schedule the invalidation sets of the changed classes on
//! the mutated element, and mark the path from it to the document. A single
//! pass over the marked parts of the tree then turns the pending sets into
//! style change requests on exactly the elements they describe.

use crate::data::StyleChange;
use crate::dom::{TDocument, TElement, TNode};
use crate::invalidation::{DescendantInvalidationSet, RuleFeatureSet};
use crate::Atom;
use fxhash::FxHashMap;
use servo_arc::Arc;
use smallvec::SmallVec;

type InvalidationList = SmallVec<[Arc<DescendantInvalidationSet>; 4]>;

/// The invalidation sets in effect while walking below an element.
#[derive(Default)]
struct RecursionData {
    invalidation_sets: InvalidationList,
    invalidate_custom_pseudo: bool,
    whole_subtree_invalid: bool,
}

#[derive(Clone, Copy)]
struct RecursionCheckpoint {
    invalidation_set_count: usize,
    invalidate_custom_pseudo: bool,
    whole_subtree_invalid: bool,
}

impl RecursionData {
    fn checkpoint(&self) -> RecursionCheckpoint {
        RecursionCheckpoint {
            invalidation_set_count: self.invalidation_sets.len(),
            invalidate_custom_pseudo: self.invalidate_custom_pseudo,
            whole_subtree_invalid: self.whole_subtree_invalid,
        }
    }

    fn restore(&mut self, checkpoint: RecursionCheckpoint) {
        self.invalidation_sets
            .truncate(checkpoint.invalidation_set_count);
        self.invalidate_custom_pseudo = checkpoint.invalidate_custom_pseudo;
        self.whole_subtree_invalid = checkpoint.whole_subtree_invalid;
    }

    fn push_invalidation_set(&mut self, set: &Arc<DescendantInvalidationSet>) {
        debug_assert!(!self.whole_subtree_invalid);
        if set.whole_subtree_invalid() {
            self.whole_subtree_invalid = true;
            return;
        }
        self.invalidate_custom_pseudo |= set.custom_pseudo_invalid();
        // A set with nothing in it only restyles the element it was
        // scheduled on.
        if !set.is_empty() {
            self.invalidation_sets.push(set.clone());
        }
    }

    fn has_invalidation_sets(&self) -> bool {
        !self.whole_subtree_invalid &&
            (self.invalidate_custom_pseudo || !self.invalidation_sets.is_empty())
    }

    fn matches_current_invalidation_sets<E>(&self, element: E) -> bool
    where
        E: TElement,
    {
        debug_assert!(!self.whole_subtree_invalid);
        if self.invalidate_custom_pseudo && element.shadow_pseudo_id().is_some() {
            return true;
        }
        self.invalidation_sets
            .iter()
            .any(|set| set.invalidates_element(element))
    }
}

/// Pending invalidation sets per element, and the pass that applies them.
pub struct StyleInvalidator<E>
where
    E: TElement,
{
    pending_invalidation_map: FxHashMap<E, InvalidationList>,
    shadow_dom_enabled: bool,
}

impl<E> Default for StyleInvalidator<E>
where
    E: TElement,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> StyleInvalidator<E>
where
    E: TElement,
{
    /// A scheduler that walks shadow trees if the
    /// `layout.css.shadow-dom.enabled` preference is set.
    pub fn new() -> Self {
        Self::with_shadow_dom_enabled(style_config::get_bool(style_config::SHADOW_DOM))
    }

    pub fn with_shadow_dom_enabled(enabled: bool) -> Self {
        StyleInvalidator {
            pending_invalidation_map: FxHashMap::default(),
            shadow_dom_enabled: enabled,
        }
    }

    /// Schedules `set` on `element`, and marks the path from it to the
    /// document.
    pub fn schedule_invalidation(&mut self, set: Arc<DescendantInvalidationSet>, element: E) {
        trace!("StyleInvalidator::schedule_invalidation({:?}, {:?})", element, set);
        self.pending_invalidation_map
            .entry(element)
            .or_default()
            .push(set);
        element.as_node().set_needs_style_invalidation();
    }

    /// Schedules the invalidation sets of `changed_classes`, which were
    /// added to or removed from `element`.
    pub fn schedule_style_invalidation_for_class_change(
        &mut self,
        features: &RuleFeatureSet,
        changed_classes: &[Atom],
        element: E,
    ) {
        for class in changed_classes {
            if let Some(set) = features.class_invalidation_set(class) {
                self.schedule_invalidation(set.clone(), element);
            }
        }
    }

    /// Schedules the invalidation sets of the classes present in only one of
    /// `old_classes` and `new_classes`.
    pub fn schedule_style_invalidation_for_class_diff(
        &mut self,
        features: &RuleFeatureSet,
        old_classes: &[Atom],
        new_classes: &[Atom],
        element: E,
    ) {
        if old_classes.is_empty() {
            self.schedule_style_invalidation_for_class_change(features, new_classes, element);
            return;
        }

        // Class lists tend to be very short, so this is faster than hashing.
        let mut remaining_class_bits: SmallVec<[bool; 8]> =
            SmallVec::from_elem(false, old_classes.len());
        for new_class in new_classes {
            let mut found = false;
            for (i, old_class) in old_classes.iter().enumerate() {
                if new_class == old_class {
                    // A class can appear more than once, so keep looking.
                    remaining_class_bits[i] = true;
                    found = true;
                }
            }
            if !found {
                self.schedule_style_invalidation_for_class_change(
                    features,
                    std::slice::from_ref(new_class),
                    element,
                );
            }
        }

        for (old_class, remaining) in old_classes.iter().zip(remaining_class_bits) {
            if !remaining {
                self.schedule_style_invalidation_for_class_change(
                    features,
                    std::slice::from_ref(old_class),
                    element,
                );
            }
        }
    }

    /// Forgets everything pending on `node`, which is about to be removed
    /// from the document.
    ///
    /// The node's dirty bits are reset too, so that marking it again after
    /// it is reinserted reaches its new ancestors.
    pub fn clear_style_invalidation(&mut self, node: E::ConcreteNode) {
        if let Some(element) = node.as_element() {
            self.pending_invalidation_map.remove(&element);
        }
        node.clear_invalidation_state();
    }

    pub fn has_pending_invalidations(&self) -> bool {
        !self.pending_invalidation_map.is_empty()
    }

    /// The number of sets scheduled on `element`.
    pub fn pending_invalidation_count(&self, element: E) -> usize {
        self.pending_invalidation_map
            .get(&element)
            .map_or(0, |list| list.len())
    }

    /// Applies every pending invalidation in `document`, then clears all
    /// pending state.
    ///
    /// Returns the number of elements whose style change was raised.
    pub fn invalidate<D>(&mut self, document: D) -> usize
    where
        D: TDocument<ConcreteNode = E::ConcreteNode>,
    {
        let document_node = document.as_node();
        debug!(
            "StyleInvalidator::invalidate: {} elements with pending sets",
            self.pending_invalidation_map.len()
        );

        let mut invalidated = 0;
        if document_node.child_needs_style_invalidation() {
            if let Some(root) = document.document_element() {
                let mut recursion_data = RecursionData::default();
                self.invalidate_element(root, &mut recursion_data, &mut invalidated);
            }
        }

        document_node.clear_invalidation_state();
        self.pending_invalidation_map.clear();
        debug!("StyleInvalidator::invalidate: raised {} elements", invalidated);
        invalidated
    }

    fn check_invalidation_sets_against_element(
        &self,
        element: E,
        recursion_data: &mut RecursionData,
    ) -> bool {
        if element.style_change() >= StyleChange::SubtreeStyleChange ||
            recursion_data.whole_subtree_invalid
        {
            recursion_data.whole_subtree_invalid = true;
            return false;
        }

        if element.as_node().needs_style_invalidation() {
            if let Some(list) = self.pending_invalidation_map.get(&element) {
                for set in list {
                    recursion_data.push_invalidation_set(set);
                    if recursion_data.whole_subtree_invalid {
                        break;
                    }
                }
                // The element itself restyles whenever a class of its
                // changed.
                return true;
            }
        }

        let matched = recursion_data.matches_current_invalidation_sets(element);
        if matched {
            trace!("{:?} matched an invalidation set", element);
        }
        matched
    }

    fn invalidate_element(
        &self,
        element: E,
        recursion_data: &mut RecursionData,
        invalidated: &mut usize,
    ) -> bool {
        let checkpoint = recursion_data.checkpoint();

        let this_element_needs_style_recalc =
            self.check_invalidation_sets_against_element(element, recursion_data);

        let node = element.as_node();
        if recursion_data.has_invalidation_sets() || node.child_needs_style_invalidation() {
            self.invalidate_children(element, recursion_data, invalidated);
        }

        if this_element_needs_style_recalc {
            let change = if recursion_data.whole_subtree_invalid {
                StyleChange::SubtreeStyleChange
            } else {
                StyleChange::LocalStyleChange
            };
            if element.style_change() < change {
                element.set_needs_style_recalc(change);
                *invalidated += 1;
            }
        }

        node.clear_invalidation_state();
        recursion_data.restore(checkpoint);
        this_element_needs_style_recalc
    }

    fn invalidate_children(
        &self,
        element: E,
        recursion_data: &mut RecursionData,
        invalidated: &mut usize,
    ) {
        for root in element.shadow_roots() {
            if !self.shadow_dom_enabled {
                clear_invalidation_state_in_subtree(root);
                continue;
            }
            if recursion_data.has_invalidation_sets() ||
                root.child_needs_style_invalidation() ||
                root.needs_style_invalidation()
            {
                for child in root.dom_children().filter_map(|n| n.as_element()) {
                    self.invalidate_element(child, recursion_data, invalidated);
                }
            }
            root.clear_invalidation_state();
        }

        for child in element.as_node().dom_children().filter_map(|n| n.as_element()) {
            self.invalidate_element(child, recursion_data, invalidated);
        }
    }
}

/// Clears the dirty bits of `node` and every marked node below it, shadow
/// trees included.
fn clear_invalidation_state_in_subtree<N>(node: N)
where
    N: TNode,
{
    let descend = node.child_needs_style_invalidation();
    node.clear_invalidation_state();
    if !descend {
        return;
    }
    if let Some(element) = node.as_element() {
        for root in element.shadow_roots() {
            clear_invalidation_state_in_subtree(root);
        }
    }
    for child in node.dom_children() {
        clear_invalidation_state_in_subtree(child);
    }
}
