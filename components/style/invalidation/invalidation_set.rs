/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The descendants a change to one class may restyle.

use crate::dom::TElement;
use crate::Atom;
use fxhash::FxHashSet;

/// The features that identify descendants of an element whose style may
/// change when one of the element's classes changes.
///
/// A set only ever grows. Once `whole_subtree_invalid` is set the feature
/// sets are dropped, since every descendant is affected anyway.
#[derive(Clone, Debug, Default)]
pub struct DescendantInvalidationSet {
    classes: FxHashSet<Atom>,
    ids: FxHashSet<Atom>,
    tag_names: FxHashSet<Atom>,
    whole_subtree_invalid: bool,
    custom_pseudo_invalid: bool,
}

impl DescendantInvalidationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: Atom) {
        if self.whole_subtree_invalid {
            return;
        }
        self.classes.insert(class);
    }

    pub fn add_id(&mut self, id: Atom) {
        if self.whole_subtree_invalid {
            return;
        }
        self.ids.insert(id);
    }

    pub fn add_tag_name(&mut self, local_name: Atom) {
        if self.whole_subtree_invalid {
            return;
        }
        self.tag_names.insert(local_name);
    }

    /// Every descendant is invalid.
    pub fn set_whole_subtree_invalid(&mut self) {
        if self.whole_subtree_invalid {
            return;
        }
        self.whole_subtree_invalid = true;
        self.custom_pseudo_invalid = false;
        self.classes = FxHashSet::default();
        self.ids = FxHashSet::default();
        self.tag_names = FxHashSet::default();
    }

    /// Elements exposed as custom pseudo-elements in shadow trees below are
    /// invalid.
    pub fn set_custom_pseudo_invalid(&mut self) {
        if self.whole_subtree_invalid {
            return;
        }
        self.custom_pseudo_invalid = true;
    }

    #[inline]
    pub fn whole_subtree_invalid(&self) -> bool {
        self.whole_subtree_invalid
    }

    #[inline]
    pub fn custom_pseudo_invalid(&self) -> bool {
        self.custom_pseudo_invalid
    }

    /// Unions `other` into this set.
    pub fn combine(&mut self, other: &DescendantInvalidationSet) {
        // No longer bother combining data structures, since the whole
        // subtree is deemed invalid.
        if self.whole_subtree_invalid {
            return;
        }
        if other.whole_subtree_invalid {
            self.set_whole_subtree_invalid();
            return;
        }
        if other.custom_pseudo_invalid {
            self.set_custom_pseudo_invalid();
        }
        self.classes.extend(other.classes.iter().cloned());
        self.ids.extend(other.ids.iter().cloned());
        self.tag_names.extend(other.tag_names.iter().cloned());
    }

    /// Whether `element`, a descendant of the element this set was
    /// scheduled on, must be restyled.
    pub fn invalidates_element<E>(&self, element: E) -> bool
    where
        E: TElement,
    {
        if self.whole_subtree_invalid {
            return true;
        }
        if self.tag_names.contains(element.local_name()) {
            return true;
        }
        if element.id().is_some_and(|id| self.ids.contains(id)) {
            return true;
        }
        if self.classes.is_empty() {
            return false;
        }
        let mut found = false;
        element.each_class(|class| found |= self.classes.contains(class));
        found
    }

    /// Whether this set invalidates nothing below the element.
    pub fn is_empty(&self) -> bool {
        !self.whole_subtree_invalid &&
            !self.custom_pseudo_invalid &&
            self.classes.is_empty() &&
            self.ids.is_empty() &&
            self.tag_names.is_empty()
    }

    pub fn contains_class(&self, class: &Atom) -> bool {
        self.classes.contains(class)
    }

    pub fn contains_id(&self, id: &Atom) -> bool {
        self.ids.contains(id)
    }

    pub fn contains_tag_name(&self, local_name: &Atom) -> bool {
        self.tag_names.contains(local_name)
    }
}
