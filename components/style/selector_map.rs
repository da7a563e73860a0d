/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A data structure to efficiently index rules by id, class, local name and
//! the other keys a selector's subject can be filed under.

use crate::rule_set::RuleData;
use crate::Atom;
use fxhash::FxHashMap;
use selectors::parser::{Component, Match, Relation, Selector};
use selectors::pseudo::PseudoType;

/// The bucket a selector is filed under, most selective key first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Bucket {
    /// The subject compound tests an id.
    Id(Atom),
    /// The subject compound tests a class.
    Class(Atom),
    /// The subject is a custom pseudo-element like `::-webkit-slider-thumb`.
    ShadowPseudoElement(Atom),
    /// The subject is `::cue`.
    Cue,
    /// The subject is `:link`, `:visited` or `:-webkit-any-link`.
    LinkPseudoClass,
    /// The subject is `:focus`.
    FocusPseudoClass,
    /// The subject compound tests a local name.
    Tag(Atom),
    /// None of the above; the rule is tried against every element.
    Universal,
}

#[derive(Default)]
struct BucketKeys<'a> {
    id: Option<&'a Atom>,
    class: Option<&'a Atom>,
    custom_pseudo_element: Option<&'a Atom>,
    tag: Option<&'a Atom>,
}

impl<'a> BucketKeys<'a> {
    fn extract(&mut self, component: &'a Component) {
        match component.match_kind() {
            Match::Id => self.id = component.value(),
            Match::Class => self.class = component.value(),
            Match::Tag => {
                if let Some(name) = component.tag_q_name() {
                    if !name.is_universal() {
                        self.tag = Some(&name.local_name);
                    }
                }
            },
            _ => {},
        }
        if component.is_custom_pseudo_element() {
            self.custom_pseudo_element = component.value();
        }
    }
}

/// `:link`, `:visited`, `:-webkit-any-link` and `:focus` are common enough
/// to get buckets of their own.
fn is_common_pseudo_class(component: &Component) -> bool {
    component.match_kind() == Match::PseudoClass &&
        matches!(
            component.pseudo_type(),
            PseudoType::Link | PseudoType::Visited | PseudoType::AnyLink | PseudoType::Focus
        )
}

/// Picks the bucket for `selector`.
///
/// Looks at the subject compound and at the component the walk stops on,
/// which is how a custom pseudo-element linked to its host through
/// `Relation::ShadowPseudo` is found.
pub fn find_bucket(selector: &Selector) -> Bucket {
    let mut keys = BucketKeys::default();
    for component in selector.iter() {
        keys.extract(component);
        if component.relation() != Relation::SubSelector {
            break;
        }
    }

    if let Some(id) = keys.id {
        return Bucket::Id(id.clone());
    }
    if let Some(class) = keys.class {
        return Bucket::Class(class.clone());
    }
    if let Some(name) = keys.custom_pseudo_element {
        return Bucket::ShadowPseudoElement(name.clone());
    }

    let rightmost = selector.rightmost();
    if rightmost.pseudo_type() == PseudoType::Cue {
        return Bucket::Cue;
    }
    if is_common_pseudo_class(rightmost) {
        return match rightmost.pseudo_type() {
            PseudoType::Focus => Bucket::FocusPseudoClass,
            _ => Bucket::LinkPseudoClass,
        };
    }

    match keys.tag {
        Some(tag) => Bucket::Tag(tag.clone()),
        None => Bucket::Universal,
    }
}

/// Rules keyed by atom while a rule set is still being built. Each bucket
/// grows in source order.
#[derive(Debug, Default)]
pub struct PendingRuleMap {
    rules: FxHashMap<Atom, Vec<RuleData>>,
}

impl PendingRuleMap {
    /// Appends `rule` to the bucket for `key`.
    pub fn insert(&mut self, key: Atom, rule: RuleData) {
        self.rules.entry(key).or_default().push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rules keyed by atom, compacted into one boxed slice per key.
#[derive(Debug, Default)]
pub struct RuleMap {
    rules: FxHashMap<Atom, Box<[RuleData]>>,
}

impl RuleMap {
    /// The rules filed under `key`, in ascending source position.
    #[inline]
    pub fn get(&self, key: &Atom) -> Option<&[RuleData]> {
        self.rules.get(key).map(|rules| &**rules)
    }

    /// The number of keys.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Moves every pending bucket into this map, after any rules already
    /// compacted under the same key, and flags the last rule of each bucket.
    pub fn compact(&mut self, pending: PendingRuleMap) {
        for (key, rules) in pending.rules {
            let mut merged = match self.rules.remove(&key) {
                Some(existing) => {
                    let mut merged = existing.into_vec();
                    if let Some(last) = merged.last_mut() {
                        last.set_is_last_in_array(false);
                    }
                    merged.extend(rules);
                    merged
                },
                None => rules,
            };
            if let Some(last) = merged.last_mut() {
                last.set_is_last_in_array(true);
            }
            self.rules.insert(key, merged.into_boxed_slice());
        }
    }
}
