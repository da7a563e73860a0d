/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::parsing::{parse_selectors, style_rule};
use style::Atom;
use style::invalidation::{DescendantInvalidationSet, InvalidationSetMode, RuleFeatureSet};
use style::rule_set::{AddRuleFlags, RuleSet};

fn features_for(text: &str) -> RuleFeatureSet {
    let mut features = RuleFeatureSet::with_targeted_style_recalc(true);
    add_to(&mut features, text);
    features
}

fn add_to(features: &mut RuleFeatureSet, text: &str) {
    let rule = style_rule(text);
    for selector in rule.selectors.iter() {
        features.collect_features_from_rule(&rule, selector.index(), AddRuleFlags::empty());
    }
}

fn set<'a>(features: &'a RuleFeatureSet, class: &str) -> &'a DescendantInvalidationSet {
    features
        .class_invalidation_set(&Atom::from(class))
        .unwrap_or_else(|| panic!("no invalidation set for .{}", class))
}

fn mode(text: &str) -> InvalidationSetMode {
    let features = RuleFeatureSet::with_targeted_style_recalc(true);
    let list = parse_selectors(text);
    features.invalidation_set_mode_for_selector(list.first().unwrap().components())
}

#[test]
fn test_invalidation_set_mode() {
    assert_eq!(mode(".a .b"), InvalidationSetMode::AddFeatures);
    assert_eq!(mode(".a > div#x"), InvalidationSetMode::AddFeatures);
    assert_eq!(mode(".a:hover .b:first-child"), InvalidationSetMode::AddFeatures);
    assert_eq!(mode(".a [title]"), InvalidationSetMode::UseLocalStyleChange);
    assert_eq!(mode(".a *"), InvalidationSetMode::UseLocalStyleChange);
    assert_eq!(mode(".a:not(.b) .c"), InvalidationSetMode::UseLocalStyleChange);
    assert_eq!(mode(".c:not(.b)"), InvalidationSetMode::UseSubtreeStyleChange);
    assert_eq!(mode(".a + .b"), InvalidationSetMode::UseSubtreeStyleChange);
    assert_eq!(mode(".a ~ .b"), InvalidationSetMode::UseSubtreeStyleChange);
    assert_eq!(mode(".a /deep/ .b"), InvalidationSetMode::UseSubtreeStyleChange);
    assert_eq!(
        mode(".host::-webkit-slider-thumb"),
        InvalidationSetMode::AddFeatures
    );

    let untargeted = RuleFeatureSet::with_targeted_style_recalc(false);
    let list = parse_selectors(".a .b");
    assert_eq!(
        untargeted.invalidation_set_mode_for_selector(list.first().unwrap().components()),
        InvalidationSetMode::UseSubtreeStyleChange
    );
}

#[test]
fn test_descendant_class_is_added_to_ancestor_set() {
    let features = features_for(".enabled .highlighted");

    let enabled = set(&features, "enabled");
    assert!(!enabled.whole_subtree_invalid());
    assert!(enabled.contains_class(&Atom::from("highlighted")));

    // The subject class restyles only its element.
    let highlighted = set(&features, "highlighted");
    assert!(highlighted.is_empty());
    assert!(!highlighted.whole_subtree_invalid());

    assert!(features.class_invalidation_set(&Atom::from("other")).is_none());
}

#[test]
fn test_subject_id_and_tag_are_added_to_ancestor_sets() {
    let features = features_for(".x div#y, .x .z > p");
    let x = set(&features, "x");
    assert!(x.contains_tag_name(&Atom::from("div")));
    assert!(x.contains_id(&Atom::from("y")));
    assert!(x.contains_tag_name(&Atom::from("p")));
    assert!(!x.contains_class(&Atom::from("z")));
    assert!(set(&features, "z").contains_tag_name(&Atom::from("p")));
}

#[test]
fn test_local_style_change_fallback() {
    let features = features_for(".a:not(.b) .c");

    let c = set(&features, "c");
    assert!(c.is_empty());
    assert!(!c.whole_subtree_invalid());
    assert!(set(&features, "a").whole_subtree_invalid());
    assert!(set(&features, "b").whole_subtree_invalid());
}

#[test]
fn test_sibling_combinators_use_subtree_change() {
    let features = features_for(".p + .q");

    assert!(set(&features, "p").whole_subtree_invalid());
    assert!(set(&features, "q").whole_subtree_invalid());
    assert!(features.uses_sibling_rules());
    assert_eq!(features.sibling_rules().len(), 1);
    assert_eq!(features.max_direct_adjacent_selectors(), 1);

    let features = features_for("a + b + c ~ d + e");
    assert_eq!(features.max_direct_adjacent_selectors(), 2);
}

#[test]
fn test_structural_pseudo_classes_count_as_sibling_rules() {
    let features = features_for(".list li:nth-child(2n+1)");
    assert!(features.uses_sibling_rules());
    assert_eq!(features.max_direct_adjacent_selectors(), 0);
    assert!(set(&features, "list").contains_tag_name(&Atom::from("li")));
}

#[test]
fn test_untargeted_recalc_invalidates_whole_subtrees() {
    let mut features = RuleFeatureSet::with_targeted_style_recalc(false);
    add_to(&mut features, ".x .y");
    assert!(!features.targeted_style_recalc());
    assert!(set(&features, "x").whole_subtree_invalid());
    assert!(set(&features, "y").whole_subtree_invalid());
}

#[test]
fn test_metadata() {
    let features = features_for("#main [data-foo] p::first-line, .a[type=checkbox]");

    assert!(features.has_ids_in_selectors());
    assert!(features.has_selector_for_id(&Atom::from("main")));
    assert!(!features.has_selector_for_id(&Atom::from("other")));
    assert!(features.has_selector_for_attribute(&Atom::from("data-foo")));
    assert!(features.has_selector_for_attribute(&Atom::from("type")));
    assert!(features.uses_first_line_rules());
    assert!(!features.uses_sibling_rules());

    // Only the first chain tests an uncommon attribute.
    assert_eq!(features.uncommon_attribute_rules().len(), 1);
    assert_eq!(features.uncommon_attribute_rules()[0].selector_index, 0);
}

#[test]
fn test_custom_pseudo_elements() {
    let features = features_for(".host::-webkit-slider-thumb");
    let host = set(&features, "host");
    assert!(host.custom_pseudo_invalid());
    assert!(!host.whole_subtree_invalid());
}

#[test]
fn test_add_merges_sets_and_lists() {
    let mut first = features_for(".a .b, #one");
    let second = features_for(".a .c, .s + .t");
    first.add(&second);

    let a = set(&first, "a");
    assert!(a.contains_class(&Atom::from("b")));
    assert!(a.contains_class(&Atom::from("c")));
    assert!(set(&first, "t").whole_subtree_invalid());
    assert!(first.has_selector_for_id(&Atom::from("one")));
    assert_eq!(first.sibling_rules().len(), 1);

    // Whole subtree wins over anything more targeted.
    first.add(&features_for(".a ~ .b"));
    assert!(set(&first, "a").whole_subtree_invalid());
    assert!(!set(&first, "a").contains_class(&Atom::from("b")));

    first.clear();
    assert!(first.class_invalidation_set(&Atom::from("a")).is_none());
    assert!(!first.has_ids_in_selectors());
    assert!(!first.uses_sibling_rules());
}

#[test]
fn test_sets_are_shared_until_written() {
    let features = features_for(".a .b");
    let copy = features.clone();
    let original = features.class_invalidation_set(&Atom::from("a")).unwrap();
    let cloned = copy.class_invalidation_set(&Atom::from("a")).unwrap();
    assert!(servo_arc::Arc::ptr_eq(original, cloned));
}

#[test]
fn test_default_follows_preference() {
    assert_eq!(
        RuleFeatureSet::new().targeted_style_recalc(),
        style_config::get_bool(style_config::TARGETED_STYLE_RECALC)
    );
    assert!(RuleSet::new().features().targeted_style_recalc());
}
