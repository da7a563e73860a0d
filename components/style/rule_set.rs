/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Compilation of style sheets into rule sets indexed for matching.
//!
//! Every selector chain of every style rule becomes a [`RuleData`], filed
//! under exactly one bucket (see [`find_bucket`]). While rules stream in the
//! buckets are growable vectors; [`RuleSet::compact_rules`] turns them into
//! one boxed slice per key, after which the rule set is read-only.

use crate::invalidation::RuleFeatureSet;
use crate::media_queries::{MediaQueryEvaluator, MediaQueryResult};
use crate::selector_map::{find_bucket, Bucket, PendingRuleMap, RuleMap};
use crate::stylesheets::{
    CssRule, FontFaceRule, KeyframesRule, PageRule, StyleRule, StylesheetContents, ViewportRule,
};
use crate::Atom;
use bitflags::bitflags;
use selectors::bloom::{collect_identifier_hashes, MAX_IDENTIFIER_HASHES};
use selectors::parser::{Component, Match, Relation, Selector};
use selectors::pseudo::PseudoType;
use servo_arc::Arc;

bitflags! {
    /// Properties of the sheet a rule comes from.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct AddRuleFlags: u8 {
        /// The sheet shares the document's security origin.
        const RULE_HAS_DOCUMENT_SECURITY_ORIGIN = 1 << 0;
        /// Rules may be matched with the fast selector checker.
        const RULE_CAN_USE_FAST_CHECK_SELECTOR = 1 << 1;
    }
}

bitflags! {
    /// The link states a rule can match in.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct LinkMatchMask: u8 {
        const MATCH_LINK = 1 << 0;
        const MATCH_VISITED = 1 << 1;
        const MATCH_ALL = Self::MATCH_LINK.bits() | Self::MATCH_VISITED.bits();
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    struct RuleDataFlags: u8 {
        const IS_LAST_IN_ARRAY = 1 << 0;
        const HAS_FAST_CHECKABLE_SELECTOR = 1 << 1;
        const HAS_MULTIPART_SELECTOR = 1 << 2;
        const HAS_RIGHTMOST_SELECTOR_MATCHING_HTML_BASED_ON_RULE_HASH = 1 << 3;
        const CONTAINS_UNCOMMON_ATTRIBUTE_SELECTOR = 1 << 4;
        const HAS_DOCUMENT_SECURITY_ORIGIN = 1 << 5;
    }
}

/// Which properties a matched rule is allowed to set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyWhitelistType {
    None,
    /// Rules for `::cue` only apply a restricted set of properties.
    Cue,
}

/// One selector chain of a style rule, with everything matching wants to
/// know about it precomputed.
#[derive(Clone, Debug)]
pub struct RuleData {
    rule: Arc<StyleRule>,
    selector_index: usize,
    position: u32,
    specificity: u32,
    flags: RuleDataFlags,
    link_match_type: LinkMatchMask,
    property_whitelist: PropertyWhitelistType,
    descendant_selector_identifier_hashes: [u32; MAX_IDENTIFIER_HASHES],
}

impl RuleData {
    /// Describes the chain starting at `selector_index` in `rule`, which is
    /// the `position`th rule added to its rule set.
    pub fn new(
        rule: Arc<StyleRule>,
        selector_index: usize,
        position: u32,
        add_rule_flags: AddRuleFlags,
    ) -> Self {
        let selector = rule.selectors.selector_at(selector_index);

        let mut flags = RuleDataFlags::empty();
        if add_rule_flags.contains(AddRuleFlags::RULE_CAN_USE_FAST_CHECK_SELECTOR) &&
            is_fast_checkable_selector(&selector)
        {
            flags.insert(RuleDataFlags::HAS_FAST_CHECKABLE_SELECTOR);
        }
        if selector.components().len() > 1 {
            flags.insert(RuleDataFlags::HAS_MULTIPART_SELECTOR);
        }
        if is_selector_matching_html_based_on_rule_hash(&selector) {
            flags.insert(RuleDataFlags::HAS_RIGHTMOST_SELECTOR_MATCHING_HTML_BASED_ON_RULE_HASH);
        }
        if contains_uncommon_attribute_selector(selector.components()) {
            flags.insert(RuleDataFlags::CONTAINS_UNCOMMON_ATTRIBUTE_SELECTOR);
        }
        if add_rule_flags.contains(AddRuleFlags::RULE_HAS_DOCUMENT_SECURITY_ORIGIN) {
            flags.insert(RuleDataFlags::HAS_DOCUMENT_SECURITY_ORIGIN);
        }

        let specificity = selector.specificity();
        let link_match_type = determine_link_match_type(&selector);
        let property_whitelist = determine_property_whitelist_type(&selector);
        let descendant_selector_identifier_hashes = collect_identifier_hashes(&selector);

        RuleData {
            rule,
            selector_index,
            position,
            specificity,
            flags,
            link_match_type,
            property_whitelist,
            descendant_selector_identifier_hashes,
        }
    }

    #[inline]
    pub fn rule(&self) -> &Arc<StyleRule> {
        &self.rule
    }

    /// The component offset of this chain within the rule's selector list.
    #[inline]
    pub fn selector_index(&self) -> usize {
        self.selector_index
    }

    #[inline]
    pub fn selector(&self) -> Selector<'_> {
        self.rule.selectors.selector_at(self.selector_index)
    }

    /// The order in which this rule was added to its rule set.
    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[inline]
    pub fn specificity(&self) -> u32 {
        self.specificity
    }

    /// Whether this is the last rule of its bucket.
    #[inline]
    pub fn is_last_in_array(&self) -> bool {
        self.flags.contains(RuleDataFlags::IS_LAST_IN_ARRAY)
    }

    pub(crate) fn set_is_last_in_array(&mut self, last: bool) {
        self.flags.set(RuleDataFlags::IS_LAST_IN_ARRAY, last);
    }

    /// Whether the chain only uses type, id and class selectors joined by
    /// descendant and child combinators, from a sheet that allows it.
    #[inline]
    pub fn has_fast_checkable_selector(&self) -> bool {
        self.flags.contains(RuleDataFlags::HAS_FAST_CHECKABLE_SELECTOR)
    }

    #[inline]
    pub fn has_multipart_selector(&self) -> bool {
        self.flags.contains(RuleDataFlags::HAS_MULTIPART_SELECTOR)
    }

    /// Whether finding this rule in its bucket is enough to know it matches
    /// an HTML element.
    #[inline]
    pub fn has_rightmost_selector_matching_html_based_on_rule_hash(&self) -> bool {
        self.flags
            .contains(RuleDataFlags::HAS_RIGHTMOST_SELECTOR_MATCHING_HTML_BASED_ON_RULE_HASH)
    }

    /// Whether matching depends on attributes other than the common ones,
    /// which prevents sharing styles between elements.
    #[inline]
    pub fn contains_uncommon_attribute_selector(&self) -> bool {
        self.flags
            .contains(RuleDataFlags::CONTAINS_UNCOMMON_ATTRIBUTE_SELECTOR)
    }

    #[inline]
    pub fn has_document_security_origin(&self) -> bool {
        self.flags.contains(RuleDataFlags::HAS_DOCUMENT_SECURITY_ORIGIN)
    }

    #[inline]
    pub fn link_match_type(&self) -> LinkMatchMask {
        self.link_match_type
    }

    #[inline]
    pub fn property_whitelist(&self) -> PropertyWhitelistType {
        self.property_whitelist
    }

    /// Hashes of identifiers every matching element's ancestors carry,
    /// zero-terminated.
    #[inline]
    pub fn descendant_selector_identifier_hashes(&self) -> &[u32; MAX_IDENTIFIER_HASHES] {
        &self.descendant_selector_identifier_hashes
    }
}

fn is_fast_checkable_selector(selector: &Selector) -> bool {
    selector.iter().all(|component| {
        matches!(
            component.relation(),
            Relation::SubSelector | Relation::Descendant | Relation::Child
        ) && matches!(component.match_kind(), Match::Tag | Match::Id | Match::Class)
    })
}

fn is_common_pseudo_class_selector(component: &Component) -> bool {
    component.match_kind() == Match::PseudoClass &&
        matches!(
            component.pseudo_type(),
            PseudoType::Link | PseudoType::Visited | PseudoType::AnyLink | PseudoType::Focus
        )
}

fn is_selector_matching_html_based_on_rule_hash(selector: &Selector) -> bool {
    let [component] = selector.components() else {
        return false;
    };
    match component.match_kind() {
        Match::Tag => component
            .tag_q_name()
            .is_some_and(|name| name.namespace.admits_html()),
        Match::Id | Match::Class => true,
        _ => is_common_pseudo_class_selector(component),
    }
}

/// `type` and `readonly` are common in user agent sheets.
fn is_common_attribute_selector_attribute(component: &Component) -> bool {
    component
        .attribute()
        .is_some_and(|name| matches!(&*name.local_name, "type" | "readonly"))
}

fn selector_list_contains_uncommon_attribute_selector(component: &Component) -> bool {
    component.selector_list().is_some_and(|list| {
        list.iter()
            .any(|selector| contains_uncommon_attribute_selector(selector.components()))
    })
}

pub(crate) fn contains_uncommon_attribute_selector(components: &[Component]) -> bool {
    let mut rest = components;
    while let Some((component, tail)) = rest.split_first() {
        rest = tail;
        if component.is_attribute_selector() && !is_common_attribute_selector_attribute(component) {
            return true;
        }
        if selector_list_contains_uncommon_attribute_selector(component) {
            return true;
        }
        if component.relation_is_affected_by_pseudo_content() {
            return true;
        }
        if component.relation() != Relation::SubSelector {
            break;
        }
    }
    rest.iter().any(|component| {
        component.is_attribute_selector() ||
            selector_list_contains_uncommon_attribute_selector(component)
    })
}

fn determine_link_match_type(selector: &Selector) -> LinkMatchMask {
    let mut link_match_type = LinkMatchMask::MATCH_ALL;
    for component in selector.iter() {
        match component.pseudo_type() {
            PseudoType::Not => {
                // :not(:visited) is equivalent to :link.
                if let Some(negated) = component.selector_list().and_then(|list| list.first()) {
                    for sub in negated.iter() {
                        match sub.pseudo_type() {
                            PseudoType::Visited => link_match_type.remove(LinkMatchMask::MATCH_VISITED),
                            PseudoType::Link => link_match_type.remove(LinkMatchMask::MATCH_LINK),
                            _ => {},
                        }
                    }
                }
            },
            PseudoType::Link => link_match_type.remove(LinkMatchMask::MATCH_VISITED),
            PseudoType::Visited => link_match_type.remove(LinkMatchMask::MATCH_LINK),
            _ => {},
        }
        match component.relation() {
            Relation::SubSelector => continue,
            Relation::Descendant | Relation::Child => {},
            _ => return link_match_type,
        }
        if link_match_type != LinkMatchMask::MATCH_ALL {
            return link_match_type;
        }
    }
    link_match_type
}

fn determine_property_whitelist_type(selector: &Selector) -> PropertyWhitelistType {
    if selector
        .iter()
        .any(|component| component.pseudo_type() == PseudoType::Cue)
    {
        return PropertyWhitelistType::Cue;
    }
    PropertyWhitelistType::None
}

/// The reduced form of a rule kept for chains matched in another tree
/// scope than the one the rule set belongs to.
#[derive(Clone, Debug)]
pub struct MinimalRuleData {
    pub rule: Arc<StyleRule>,
    pub selector_index: usize,
    pub flags: AddRuleFlags,
}

impl MinimalRuleData {
    #[inline]
    pub fn selector(&self) -> Selector<'_> {
        self.rule.selectors.selector_at(self.selector_index)
    }
}

#[derive(Debug, Default)]
struct PendingRuleMaps {
    id_rules: PendingRuleMap,
    class_rules: PendingRuleMap,
    tag_rules: PendingRuleMap,
    shadow_pseudo_element_rules: PendingRuleMap,
}

/// The rules of a set of style sheets, bucketed for matching.
#[derive(Debug, Default)]
pub struct RuleSet {
    id_rules: RuleMap,
    class_rules: RuleMap,
    tag_rules: RuleMap,
    shadow_pseudo_element_rules: RuleMap,
    link_pseudo_class_rules: Vec<RuleData>,
    cue_pseudo_rules: Vec<RuleData>,
    focus_pseudo_class_rules: Vec<RuleData>,
    universal_rules: Vec<RuleData>,
    features: RuleFeatureSet,
    page_rules: Vec<Arc<PageRule>>,
    font_face_rules: Vec<Arc<FontFaceRule>>,
    keyframes_rules: Vec<Arc<KeyframesRule>>,
    viewport_rules: Vec<Arc<ViewportRule>>,
    tree_boundary_crossing_rules: Vec<MinimalRuleData>,
    shadow_distributed_rules: Vec<MinimalRuleData>,
    viewport_dependent_media_query_results: Vec<MediaQueryResult>,
    rule_count: u32,
    pending_rules: Option<Box<PendingRuleMaps>>,
}

impl RuleSet {
    /// An empty rule set whose feature set follows the targeted style recalc
    /// preference.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty rule set whose feature set uses targeted invalidation only if
    /// `enabled`.
    pub fn with_targeted_style_recalc(enabled: bool) -> Self {
        RuleSet {
            features: RuleFeatureSet::with_targeted_style_recalc(enabled),
            ..Default::default()
        }
    }

    fn ensure_pending_rules(&mut self) -> &mut PendingRuleMaps {
        self.pending_rules.get_or_insert_with(Default::default)
    }

    /// Adds the chain starting at `selector_index` in `rule`.
    pub fn add_rule(&mut self, rule: &Arc<StyleRule>, selector_index: usize, flags: AddRuleFlags) {
        let rule_data = RuleData::new(rule.clone(), selector_index, self.rule_count, flags);
        self.rule_count += 1;
        self.features.collect_features_from_rule_data(&rule_data);

        let bucket = find_bucket(&rule_data.selector());
        trace!(
            "RuleSet::add_rule: {:?} -> {:?}",
            rule_data.selector(),
            bucket
        );
        match bucket {
            Bucket::Id(id) => self.ensure_pending_rules().id_rules.insert(id, rule_data),
            Bucket::Class(class) => self.ensure_pending_rules().class_rules.insert(class, rule_data),
            Bucket::ShadowPseudoElement(name) => self
                .ensure_pending_rules()
                .shadow_pseudo_element_rules
                .insert(name, rule_data),
            Bucket::Cue => self.cue_pseudo_rules.push(rule_data),
            Bucket::LinkPseudoClass => self.link_pseudo_class_rules.push(rule_data),
            Bucket::FocusPseudoClass => self.focus_pseudo_class_rules.push(rule_data),
            Bucket::Tag(name) => self.ensure_pending_rules().tag_rules.insert(name, rule_data),
            Bucket::Universal => self.universal_rules.push(rule_data),
        }
    }

    /// Adds every chain of `rule`.
    pub fn add_style_rule(&mut self, rule: &Arc<StyleRule>, flags: AddRuleFlags) {
        for selector in rule.selectors.iter() {
            self.add_rule(rule, selector.index(), flags);
        }
    }

    pub fn add_page_rule(&mut self, rule: Arc<PageRule>) {
        self.page_rules.push(rule);
    }

    pub fn add_font_face_rule(&mut self, rule: Arc<FontFaceRule>) {
        self.font_face_rules.push(rule);
    }

    pub fn add_keyframes_rule(&mut self, rule: Arc<KeyframesRule>) {
        self.keyframes_rules.push(rule);
    }

    pub fn add_viewport_rule(&mut self, rule: Arc<ViewportRule>) {
        self.viewport_rules.push(rule);
    }

    /// Adds the rules of `sheet` that apply to the medium `evaluator`
    /// describes, in document order.
    pub fn add_rules_from_sheet(
        &mut self,
        sheet: &StylesheetContents,
        evaluator: &MediaQueryEvaluator,
        flags: AddRuleFlags,
    ) {
        debug!(
            "RuleSet::add_rules_from_sheet: {} top-level rules, {:?}",
            sheet.rules.len(),
            flags
        );
        self.add_child_rules(
            &sheet.rules,
            evaluator,
            flags | AddRuleFlags::RULE_CAN_USE_FAST_CHECK_SELECTOR,
        );
    }

    fn add_child_rules(
        &mut self,
        rules: &[CssRule],
        evaluator: &MediaQueryEvaluator,
        flags: AddRuleFlags,
    ) {
        for rule in rules {
            match *rule {
                CssRule::Style(ref style_rule) => self.add_style_rule_checking_scopes(style_rule, flags),
                CssRule::Import(ref import_rule) => {
                    let Some(ref sheet) = import_rule.stylesheet else {
                        trace!("Skipping unloaded import {:?}", import_rule.url);
                        continue;
                    };
                    if evaluator.evaluate(
                        &import_rule.media,
                        Some(&mut self.viewport_dependent_media_query_results),
                    ) {
                        self.add_rules_from_sheet(sheet, evaluator, flags);
                    }
                },
                CssRule::Media(ref media_rule) => {
                    if evaluator.evaluate(
                        &media_rule.media,
                        Some(&mut self.viewport_dependent_media_query_results),
                    ) {
                        self.add_child_rules(&media_rule.rules, evaluator, flags);
                    }
                },
                CssRule::Supports(ref supports_rule) => {
                    if supports_rule.enabled {
                        self.add_child_rules(&supports_rule.rules, evaluator, flags);
                    }
                },
                CssRule::Page(ref page_rule) => self.add_page_rule(page_rule.clone()),
                CssRule::FontFace(ref font_face_rule) => {
                    self.add_font_face_rule(font_face_rule.clone())
                },
                CssRule::Keyframes(ref keyframes_rule) => {
                    self.add_keyframes_rule(keyframes_rule.clone())
                },
                CssRule::Viewport(ref viewport_rule) => {
                    self.add_viewport_rule(viewport_rule.clone())
                },
            }
        }
    }

    /// Like `add_style_rule`, but chains that reach into other tree scopes
    /// are set aside instead of bucketed.
    fn add_style_rule_checking_scopes(&mut self, rule: &Arc<StyleRule>, flags: AddRuleFlags) {
        let list = &rule.selectors;
        for selector in list.iter() {
            let selector_index = selector.index();
            let side_list = if list.selector_crosses_tree_scopes(selector_index) {
                &mut self.tree_boundary_crossing_rules
            } else if list.has_shadow_distributed_at(selector_index) {
                &mut self.shadow_distributed_rules
            } else {
                self.add_rule(rule, selector_index, flags);
                continue;
            };
            trace!("RuleSet: setting aside {:?}", selector);
            side_list.push(MinimalRuleData {
                rule: rule.clone(),
                selector_index,
                flags,
            });
            self.features.collect_features_from_rule(rule, selector_index, flags);
        }
    }

    /// Moves the pending buckets into their compact form. Lookups are only
    /// valid after this.
    pub fn compact_rules(&mut self) {
        debug!("RuleSet::compact_rules: {} rules", self.rule_count);
        if let Some(pending) = self.pending_rules.take() {
            let PendingRuleMaps {
                id_rules,
                class_rules,
                tag_rules,
                shadow_pseudo_element_rules,
            } = *pending;
            self.id_rules.compact(id_rules);
            self.class_rules.compact(class_rules);
            self.tag_rules.compact(tag_rules);
            self.shadow_pseudo_element_rules
                .compact(shadow_pseudo_element_rules);
        }

        for list in [
            &mut self.link_pseudo_class_rules,
            &mut self.cue_pseudo_rules,
            &mut self.focus_pseudo_class_rules,
            &mut self.universal_rules,
        ] {
            compact_rule_list(list);
        }
        self.page_rules.shrink_to_fit();
        self.font_face_rules.shrink_to_fit();
        self.keyframes_rules.shrink_to_fit();
        self.viewport_rules.shrink_to_fit();
        self.tree_boundary_crossing_rules.shrink_to_fit();
        self.shadow_distributed_rules.shrink_to_fit();
    }

    #[inline]
    fn assert_compacted(&self) {
        debug_assert!(
            self.pending_rules.is_none(),
            "RuleSet lookup before compact_rules"
        );
    }

    pub fn id_rules(&self, id: &Atom) -> Option<&[RuleData]> {
        self.assert_compacted();
        self.id_rules.get(id)
    }

    pub fn class_rules(&self, class: &Atom) -> Option<&[RuleData]> {
        self.assert_compacted();
        self.class_rules.get(class)
    }

    pub fn tag_rules(&self, local_name: &Atom) -> Option<&[RuleData]> {
        self.assert_compacted();
        self.tag_rules.get(local_name)
    }

    pub fn shadow_pseudo_element_rules(&self, name: &Atom) -> Option<&[RuleData]> {
        self.assert_compacted();
        self.shadow_pseudo_element_rules.get(name)
    }

    pub fn link_pseudo_class_rules(&self) -> &[RuleData] {
        self.assert_compacted();
        &self.link_pseudo_class_rules
    }

    pub fn cue_pseudo_rules(&self) -> &[RuleData] {
        self.assert_compacted();
        &self.cue_pseudo_rules
    }

    pub fn focus_pseudo_class_rules(&self) -> &[RuleData] {
        self.assert_compacted();
        &self.focus_pseudo_class_rules
    }

    pub fn universal_rules(&self) -> &[RuleData] {
        self.assert_compacted();
        &self.universal_rules
    }

    pub fn page_rules(&self) -> &[Arc<PageRule>] {
        &self.page_rules
    }

    pub fn font_face_rules(&self) -> &[Arc<FontFaceRule>] {
        &self.font_face_rules
    }

    pub fn keyframes_rules(&self) -> &[Arc<KeyframesRule>] {
        &self.keyframes_rules
    }

    pub fn viewport_rules(&self) -> &[Arc<ViewportRule>] {
        &self.viewport_rules
    }

    /// Chains using `/deep/` or `::shadow`.
    pub fn tree_boundary_crossing_rules(&self) -> &[MinimalRuleData] {
        &self.tree_boundary_crossing_rules
    }

    /// Chains matching content distributed through `::content`.
    pub fn shadow_distributed_rules(&self) -> &[MinimalRuleData] {
        &self.shadow_distributed_rules
    }

    pub fn features(&self) -> &RuleFeatureSet {
        &self.features
    }

    /// The number of chains that were bucketed.
    pub fn rule_count(&self) -> u32 {
        self.rule_count
    }

    /// The outcome of every width and height media feature evaluated while
    /// adding sheets.
    pub fn viewport_dependent_media_query_results(&self) -> &[MediaQueryResult] {
        &self.viewport_dependent_media_query_results
    }
}

fn compact_rule_list(list: &mut Vec<RuleData>) {
    let len = list.len();
    for (i, rule) in list.iter_mut().enumerate() {
        rule.set_is_last_in_array(i + 1 == len);
    }
    list.shrink_to_fit();
}
