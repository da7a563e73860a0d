/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Collection of the selector features style invalidation depends on.
//!
//! For every class that appears in an ancestor position of some selector,
//! the [`RuleFeatureSet`] keeps a [`DescendantInvalidationSet`] naming the
//! subject features (classes, ids, local names) of those selectors. When
//! the class changes on an element, only the descendants carrying one of
//! those features need their style recomputed.
//!
//! Selectors whose effect a set cannot describe fall back to coarser
//! invalidation: either the element alone, or its whole subtree.

use crate::invalidation::DescendantInvalidationSet;
use crate::rule_set::{self, AddRuleFlags, RuleData};
use crate::stylesheets::StyleRule;
use crate::Atom;
use fxhash::{FxHashMap, FxHashSet};
use selectors::parser::{Component, Match, Relation};
use selectors::pseudo::PseudoType;
use servo_arc::Arc;

/// How a selector contributes to invalidation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvalidationSetMode {
    /// Subject features are added to the sets of the ancestor classes.
    AddFeatures,
    /// A class change restyles the element itself; ancestor classes restyle
    /// their whole subtree.
    UseLocalStyleChange,
    /// A change to any class of the selector restyles the whole subtree.
    UseSubtreeStyleChange,
}

/// Facts about all the selectors seen, for the benefit of other parts of
/// the style system.
#[derive(Clone, Debug, Default)]
pub struct FeatureMetadata {
    pub uses_first_line_rules: bool,
    pub found_sibling_selector: bool,
    /// The longest run of `+` combinators in any selector.
    pub max_direct_adjacent_selectors: u32,
    pub ids_in_rules: FxHashSet<Atom>,
    /// Local names of the attributes tested by attribute selectors.
    pub attrs_in_rules: FxHashSet<Atom>,
}

impl FeatureMetadata {
    pub fn add(&mut self, other: &FeatureMetadata) {
        self.uses_first_line_rules |= other.uses_first_line_rules;
        self.found_sibling_selector |= other.found_sibling_selector;
        self.max_direct_adjacent_selectors = self
            .max_direct_adjacent_selectors
            .max(other.max_direct_adjacent_selectors);
        self.ids_in_rules.extend(other.ids_in_rules.iter().cloned());
        self.attrs_in_rules
            .extend(other.attrs_in_rules.iter().cloned());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A selector chain kept on one of the side lists of a `RuleFeatureSet`.
#[derive(Clone, Debug)]
pub struct RuleFeature {
    pub rule: Arc<StyleRule>,
    pub selector_index: usize,
    pub has_document_security_origin: bool,
}

/// Pseudo-classes whose state does not depend on anything an invalidation
/// set could miss, so they can be ignored when deciding whether a selector's
/// effect is described by invalidation sets.
static SAFE_PSEUDO_CLASSES: &[PseudoType] = &[
    PseudoType::Empty,
    PseudoType::FirstChild,
    PseudoType::FirstOfType,
    PseudoType::LastChild,
    PseudoType::LastOfType,
    PseudoType::OnlyChild,
    PseudoType::OnlyOfType,
    PseudoType::NthChild,
    PseudoType::NthOfType,
    PseudoType::NthLastChild,
    PseudoType::NthLastOfType,
    PseudoType::Link,
    PseudoType::Visited,
    PseudoType::AnyLink,
    PseudoType::Hover,
    PseudoType::Drag,
    PseudoType::Focus,
    PseudoType::Active,
    PseudoType::Checked,
    PseudoType::Enabled,
    PseudoType::Default,
    PseudoType::Disabled,
    PseudoType::Optional,
    PseudoType::Required,
    PseudoType::ReadOnly,
    PseudoType::ReadWrite,
    PseudoType::Valid,
    PseudoType::Invalid,
    PseudoType::Indeterminate,
    PseudoType::Target,
    PseudoType::Lang,
    PseudoType::Root,
    PseudoType::Scope,
    PseudoType::InRange,
    PseudoType::OutOfRange,
    PseudoType::Unresolved,
];

fn is_skippable_component_for_invalidation(component: &Component) -> bool {
    match component.match_kind() {
        Match::Tag | Match::Id => true,
        kind if kind.is_attribute() => true,
        Match::PseudoElement => matches!(
            component.pseudo_type(),
            PseudoType::Before | PseudoType::After | PseudoType::Backdrop
        ),
        Match::PseudoClass => SAFE_PSEUDO_CLASSES.contains(&component.pseudo_type()),
        _ => false,
    }
}

/// Whether `component` names something an invalidation set can carry.
fn is_invalidation_anchor(component: &Component) -> bool {
    match component.match_kind() {
        Match::Class | Match::Id => true,
        Match::Tag => component
            .tag_q_name()
            .is_some_and(|name| !name.is_universal()),
        _ => component.is_custom_pseudo_element(),
    }
}

/// The subject features of a selector, as added to the sets of the
/// selector's ancestor classes.
#[derive(Default)]
struct InvalidationSetFeatures {
    classes: Vec<Atom>,
    id: Option<Atom>,
    tag_name: Option<Atom>,
    custom_pseudo_element: bool,
}

impl InvalidationSetFeatures {
    fn extract(&mut self, component: &Component) {
        match component.match_kind() {
            Match::Class => self.classes.extend(component.value().cloned()),
            Match::Id => self.id = component.value().cloned(),
            Match::Tag => {
                if let Some(name) = component.tag_q_name() {
                    if !name.is_universal() {
                        self.tag_name = Some(name.local_name.clone());
                    }
                }
            },
            _ => {},
        }
        if component.is_custom_pseudo_element() {
            self.custom_pseudo_element = true;
        }
    }

    fn add_to(&self, set: &mut DescendantInvalidationSet) {
        if self.custom_pseudo_element {
            set.set_custom_pseudo_invalid();
        }
        for class in &self.classes {
            set.add_class(class.clone());
        }
        if let Some(ref id) = self.id {
            set.add_id(id.clone());
        }
        if let Some(ref tag_name) = self.tag_name {
            set.add_tag_name(tag_name.clone());
        }
    }
}

/// The invalidation features of a rule set.
#[derive(Clone, Debug)]
pub struct RuleFeatureSet {
    targeted_style_recalc: bool,
    metadata: FeatureMetadata,
    class_invalidation_sets: FxHashMap<Atom, Arc<DescendantInvalidationSet>>,
    sibling_rules: Vec<RuleFeature>,
    uncommon_attribute_rules: Vec<RuleFeature>,
}

impl Default for RuleFeatureSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleFeatureSet {
    /// An empty feature set, using targeted invalidation if the
    /// `layout.css.targeted-style-recalc.enabled` preference is set.
    pub fn new() -> Self {
        Self::with_targeted_style_recalc(style_config::get_bool(
            style_config::TARGETED_STYLE_RECALC,
        ))
    }

    /// An empty feature set. Without targeted style recalc every class change
    /// restyles the whole subtree.
    pub fn with_targeted_style_recalc(enabled: bool) -> Self {
        RuleFeatureSet {
            targeted_style_recalc: enabled,
            metadata: FeatureMetadata::default(),
            class_invalidation_sets: FxHashMap::default(),
            sibling_rules: Vec::new(),
            uncommon_attribute_rules: Vec::new(),
        }
    }

    /// Records the features of a bucketed rule.
    pub fn collect_features_from_rule_data(&mut self, rule_data: &RuleData) {
        self.collect_features(
            rule_data.rule(),
            rule_data.selector_index(),
            rule_data.has_document_security_origin(),
            rule_data.contains_uncommon_attribute_selector(),
        );
    }

    /// Records the features of the chain starting at `selector_index` in
    /// `rule`, for chains that are not bucketed.
    pub fn collect_features_from_rule(
        &mut self,
        rule: &Arc<StyleRule>,
        selector_index: usize,
        flags: AddRuleFlags,
    ) {
        let selector = rule.selectors.selector_at(selector_index);
        let uncommon = rule_set::contains_uncommon_attribute_selector(selector.components());
        self.collect_features(
            rule,
            selector_index,
            flags.contains(AddRuleFlags::RULE_HAS_DOCUMENT_SECURITY_ORIGIN),
            uncommon,
        );
    }

    fn collect_features(
        &mut self,
        rule: &Arc<StyleRule>,
        selector_index: usize,
        has_document_security_origin: bool,
        contains_uncommon_attribute_selector: bool,
    ) {
        let components = rule.selectors.selector_at(selector_index).components();

        let mut metadata = FeatureMetadata::default();
        let mode = self.invalidation_set_mode_for_selector(components);
        trace!(
            "RuleFeatureSet: {:?} for {:?}",
            mode,
            rule.selectors.selector_at(selector_index)
        );
        self.collect_features_from_selector(components, &mut metadata, mode, false);
        if mode == InvalidationSetMode::AddFeatures {
            self.update_invalidation_sets(components);
        }

        let feature = || RuleFeature {
            rule: rule.clone(),
            selector_index,
            has_document_security_origin,
        };
        if metadata.found_sibling_selector {
            self.sibling_rules.push(feature());
        }
        if contains_uncommon_attribute_selector {
            self.uncommon_attribute_rules.push(feature());
        }
        self.metadata.add(&metadata);
    }

    /// Decides whether the chain's effect on other elements is fully
    /// described by invalidation sets, and if not, which fallback is coarse
    /// enough.
    pub fn invalidation_set_mode_for_selector(&self, components: &[Component]) -> InvalidationSetMode {
        if !self.targeted_style_recalc {
            return InvalidationSetMode::UseSubtreeStyleChange;
        }

        let mut found_descendant_relation = false;
        let mut found_ident = false;
        for component in components {
            if !found_descendant_relation && is_invalidation_anchor(component) {
                found_ident = true;
            } else if component.match_kind() != Match::Class &&
                !is_skippable_component_for_invalidation(component)
            {
                return if found_descendant_relation {
                    InvalidationSetMode::UseLocalStyleChange
                } else {
                    InvalidationSetMode::UseSubtreeStyleChange
                };
            }

            match component.relation() {
                Relation::SubSelector => {},
                // The custom pseudo-element lives in its host's shadow tree.
                Relation::Descendant | Relation::Child | Relation::ShadowPseudo => {
                    found_descendant_relation = true
                },
                Relation::DirectAdjacent |
                Relation::IndirectAdjacent |
                Relation::ShadowDeep |
                Relation::ShadowContent => return InvalidationSetMode::UseSubtreeStyleChange,
            }
        }

        if found_ident {
            InvalidationSetMode::AddFeatures
        } else {
            InvalidationSetMode::UseLocalStyleChange
        }
    }

    fn ensure_class_invalidation_set(&mut self, class: &Atom) -> &mut DescendantInvalidationSet {
        let set = self
            .class_invalidation_sets
            .entry(class.clone())
            .or_insert_with(|| Arc::new(DescendantInvalidationSet::new()));
        Arc::make_mut(set)
    }

    /// Adds the subject features of the chain to the set of every class in
    /// its ancestor compounds.
    fn update_invalidation_sets(&mut self, components: &[Component]) {
        let mut features = InvalidationSetFeatures::default();
        let mut rest = components;
        while let Some((component, tail)) = rest.split_first() {
            rest = tail;
            features.extract(component);
            if component.relation() != Relation::SubSelector {
                break;
            }
        }

        for component in rest {
            if component.match_kind() != Match::Class {
                continue;
            }
            if let Some(class) = component.value() {
                features.add_to(self.ensure_class_invalidation_set(class));
            }
        }
    }

    /// Records metadata, and gives every class of the chain a set so that
    /// changing it at least restyles the element itself. In the fallback
    /// modes the sets are widened to the whole subtree where needed.
    ///
    /// Components of a nested selector list take the position of the
    /// component owning the list.
    fn collect_features_from_selector(
        &mut self,
        components: &[Component],
        metadata: &mut FeatureMetadata,
        mut mode: InvalidationSetMode,
        in_nested_list: bool,
    ) {
        let mut direct_adjacent_run = 0;
        for component in components {
            match component.match_kind() {
                Match::Id => {
                    if let Some(id) = component.value() {
                        metadata.ids_in_rules.insert(id.clone());
                    }
                },
                Match::Class => {
                    if let Some(class) = component.value() {
                        let set = self.ensure_class_invalidation_set(class);
                        if mode == InvalidationSetMode::UseSubtreeStyleChange {
                            set.set_whole_subtree_invalid();
                        }
                    }
                },
                kind if kind.is_attribute() => {
                    if let Some(name) = component.attribute() {
                        metadata.attrs_in_rules.insert(name.local_name.clone());
                    }
                },
                _ => {},
            }

            if component.pseudo_type() == PseudoType::FirstLine {
                metadata.uses_first_line_rules = true;
            }
            if component.is_direct_adjacent_selector() {
                direct_adjacent_run += 1;
            } else if direct_adjacent_run != 0 {
                metadata.max_direct_adjacent_selectors =
                    metadata.max_direct_adjacent_selectors.max(direct_adjacent_run);
                direct_adjacent_run = 0;
            }
            if component.is_sibling_selector() {
                metadata.found_sibling_selector = true;
            }

            if let Some(list) = component.selector_list() {
                for selector in list.iter() {
                    self.collect_features_from_selector(selector.components(), metadata, mode, true);
                }
            }

            if !in_nested_list &&
                mode == InvalidationSetMode::UseLocalStyleChange &&
                component.relation() != Relation::SubSelector
            {
                mode = InvalidationSetMode::UseSubtreeStyleChange;
            }
        }
        metadata.max_direct_adjacent_selectors =
            metadata.max_direct_adjacent_selectors.max(direct_adjacent_run);
    }

    /// Merges the features of `other` into this set.
    pub fn add(&mut self, other: &RuleFeatureSet) {
        self.metadata.add(&other.metadata);
        for (class, set) in &other.class_invalidation_sets {
            self.ensure_class_invalidation_set(class).combine(set);
        }
        self.sibling_rules
            .extend(other.sibling_rules.iter().cloned());
        self.uncommon_attribute_rules
            .extend(other.uncommon_attribute_rules.iter().cloned());
    }

    /// Forgets everything collected so far.
    pub fn clear(&mut self) {
        self.metadata.clear();
        self.class_invalidation_sets.clear();
        self.sibling_rules.clear();
        self.uncommon_attribute_rules.clear();
    }

    /// The set to schedule when `class` changes on an element, if any
    /// selector references the class.
    pub fn class_invalidation_set(&self, class: &Atom) -> Option<&Arc<DescendantInvalidationSet>> {
        self.class_invalidation_sets.get(class)
    }

    pub fn targeted_style_recalc(&self) -> bool {
        self.targeted_style_recalc
    }

    pub fn metadata(&self) -> &FeatureMetadata {
        &self.metadata
    }

    pub fn has_ids_in_selectors(&self) -> bool {
        !self.metadata.ids_in_rules.is_empty()
    }

    pub fn has_selector_for_id(&self, id: &Atom) -> bool {
        self.metadata.ids_in_rules.contains(id)
    }

    pub fn has_selector_for_attribute(&self, local_name: &Atom) -> bool {
        self.metadata.attrs_in_rules.contains(local_name)
    }

    pub fn uses_first_line_rules(&self) -> bool {
        self.metadata.uses_first_line_rules
    }

    pub fn uses_sibling_rules(&self) -> bool {
        !self.sibling_rules.is_empty()
    }

    pub fn max_direct_adjacent_selectors(&self) -> u32 {
        self.metadata.max_direct_adjacent_selectors
    }

    /// Chains whose matching depends on siblings.
    pub fn sibling_rules(&self) -> &[RuleFeature] {
        &self.sibling_rules
    }

    pub fn uncommon_attribute_rules(&self) -> &[RuleFeature] {
        &self.uncommon_attribute_rules
    }
}
