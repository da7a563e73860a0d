/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::dom::{NodeId, TestDom, TestElement};
use crate::parsing::style_rule;
use style::Atom;
use style::data::{InvalidationState, StyleChange};
use style::dom::{TElement, TNode};
use style::invalidation::{RuleFeatureSet, StyleInvalidator};
use style::rule_set::{AddRuleFlags, RuleSet};

fn features_for(text: &str) -> RuleFeatureSet {
    let mut rule_set = RuleSet::with_targeted_style_recalc(true);
    rule_set.add_style_rule(&style_rule(text), AddRuleFlags::empty());
    rule_set.compact_rules();
    rule_set.features().clone()
}

fn atoms(names: &[&str]) -> Vec<Atom> {
    names.iter().map(|name| Atom::from(*name)).collect()
}

/// `<html><body><div id=outer>`
struct Fixture {
    dom: TestDom,
    html: NodeId,
    body: NodeId,
    outer: NodeId,
}

impl Fixture {
    fn new() -> Self {
        let mut dom = TestDom::new();
        let html = dom.append_element(TestDom::DOCUMENT, "html", None, &[]);
        let body = dom.append_element(html, "body", None, &[]);
        let outer = dom.append_element(body, "div", Some("outer"), &[]);
        Fixture {
            dom,
            html,
            body,
            outer,
        }
    }
}

#[test]
fn test_descendant_class_invalidation() {
    crate::init_logger();

    let features = features_for(".enabled .highlighted");
    let mut f = Fixture::new();
    let a = f.dom.append_element(f.outer, "span", None, &["highlighted"]);
    let b = f.dom.append_element(f.outer, "p", None, &[]);
    let wrapper = f.dom.append_element(f.outer, "div", None, &[]);
    let c = f.dom.append_element(wrapper, "span", None, &["highlighted", "x"]);
    f.dom.append_text(wrapper);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    dom.set_classes(f.outer, &["enabled"]);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(f.outer),
    );
    assert!(invalidator.has_pending_invalidations());
    assert_eq!(invalidator.pending_invalidation_count(dom.element(f.outer)), 1);
    assert!(dom.node(f.outer).needs_style_invalidation());
    assert!(dom.node(f.body).child_needs_style_invalidation());

    assert_eq!(invalidator.invalidate(dom.document()), 3);

    assert_eq!(dom.style_change(f.outer), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(a), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(c), StyleChange::LocalStyleChange);
    for untouched in [f.html, f.body, b, wrapper] {
        assert_eq!(dom.style_change(untouched), StyleChange::NoStyleChange);
    }
    assert!(dom.all_clean());
    assert!(!invalidator.has_pending_invalidations());

    // Nothing left to do.
    assert_eq!(invalidator.invalidate(dom.document()), 0);
}

#[test]
fn test_subject_only_class_restyles_the_element() {
    let features = features_for(".enabled .highlighted");
    let mut f = Fixture::new();
    let child = f.dom.append_element(f.outer, "span", None, &["highlighted"]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["highlighted"]),
        dom.element(child),
    );
    assert_eq!(invalidator.invalidate(dom.document()), 1);
    assert_eq!(dom.style_change(child), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(f.outer), StyleChange::NoStyleChange);
}

#[test]
fn test_whole_subtree_invalidation() {
    let features = features_for(".p + .q");
    let mut f = Fixture::new();
    let child = f.dom.append_element(f.outer, "span", None, &["q"]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["p"]),
        dom.element(f.outer),
    );
    assert_eq!(invalidator.invalidate(dom.document()), 1);

    assert_eq!(dom.style_change(f.outer), StyleChange::SubtreeStyleChange);
    // Covered by the subtree change of its parent.
    assert_eq!(dom.style_change(child), StyleChange::NoStyleChange);
    assert!(dom.all_clean());
}

#[test]
fn test_pending_sets_below_a_subtree_change_are_dropped() {
    let features = features_for(".p + .q, .enabled .highlighted");
    let mut f = Fixture::new();
    let inner = f.dom.append_element(f.outer, "div", None, &[]);
    let deep = f.dom.append_element(inner, "b", None, &["highlighted"]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(inner),
    );
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["p"]),
        dom.element(f.outer),
    );

    assert_eq!(invalidator.invalidate(dom.document()), 1);
    assert_eq!(dom.style_change(f.outer), StyleChange::SubtreeStyleChange);
    assert_eq!(dom.style_change(inner), StyleChange::NoStyleChange);
    assert_eq!(dom.style_change(deep), StyleChange::NoStyleChange);
    assert!(dom.all_clean());
}

#[test]
fn test_only_raised_elements_are_counted() {
    let features = features_for(".enabled .highlighted");
    let mut f = Fixture::new();
    let child = f.dom.append_element(f.outer, "span", None, &["highlighted"]);
    let dom = &f.dom;

    dom.element(f.outer).set_needs_style_recalc(StyleChange::LocalStyleChange);
    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(f.outer),
    );
    assert_eq!(invalidator.invalidate(dom.document()), 1);
    assert_eq!(dom.style_change(child), StyleChange::LocalStyleChange);
}

#[test]
fn test_unreferenced_class_schedules_nothing() {
    let features = features_for(".enabled .highlighted");
    let f = Fixture::new();
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["unused"]),
        dom.element(f.outer),
    );
    assert!(!invalidator.has_pending_invalidations());
    assert!(dom.all_clean());
    assert_eq!(invalidator.invalidate(dom.document()), 0);
}

#[test]
fn test_clear_style_invalidation() {
    let features = features_for(".enabled .highlighted");
    let mut f = Fixture::new();
    let child = f.dom.append_element(f.outer, "span", None, &["highlighted"]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(f.outer),
    );
    invalidator.clear_style_invalidation(dom.node(f.outer));
    assert_eq!(dom.invalidation_state(f.outer), InvalidationState::Clean);
    assert!(!invalidator.has_pending_invalidations());

    assert_eq!(invalidator.invalidate(dom.document()), 0);
    assert_eq!(dom.style_change(child), StyleChange::NoStyleChange);
    assert!(dom.all_clean());
}

#[test]
fn test_reinserted_subtree_is_invalidated() {
    let features = features_for(".enabled .highlighted");
    let mut f = Fixture::new();
    let removed = f.dom.append_element(f.outer, "section", None, &[]);
    let container = f.dom.append_element(removed, "div", None, &[]);
    let leaf = f.dom.append_element(container, "span", None, &["highlighted"]);

    {
        let dom = &f.dom;
        let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
        invalidator.schedule_style_invalidation_for_class_change(
            &features,
            &atoms(&["enabled"]),
            dom.element(container),
        );
        // The subtree is about to leave the document.
        for id in [removed, container, leaf] {
            invalidator.clear_style_invalidation(dom.node(id));
            assert_eq!(dom.invalidation_state(id), InvalidationState::Clean);
        }
        assert!(!invalidator.has_pending_invalidations());
    }

    f.dom.remove_child(removed);
    {
        let mut invalidator = StyleInvalidator::<TestElement>::with_shadow_dom_enabled(true);
        assert_eq!(invalidator.invalidate(f.dom.document()), 0);
        assert!(f.dom.all_clean());
    }

    f.dom.append_child(f.body, removed);
    let dom = &f.dom;
    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(container),
    );
    for id in [removed, f.body, f.html, TestDom::DOCUMENT] {
        assert!(dom.node(id).child_needs_style_invalidation(), "node {} not marked", id);
    }

    assert_eq!(invalidator.invalidate(dom.document()), 2);
    assert_eq!(dom.style_change(container), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(leaf), StyleChange::LocalStyleChange);
    assert!(dom.all_clean());
}

#[test]
fn test_class_diff() {
    let features = features_for(".a .x, .b .y, .c .z");
    let mut f = Fixture::new();
    let x = f.dom.append_element(f.outer, "i", None, &["x"]);
    let y = f.dom.append_element(f.outer, "i", None, &["y"]);
    let z = f.dom.append_element(f.outer, "i", None, &["z"]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_diff(
        &features,
        &atoms(&["a", "b", "b"]),
        &atoms(&["b", "c"]),
        dom.element(f.outer),
    );
    assert_eq!(invalidator.pending_invalidation_count(dom.element(f.outer)), 2);

    assert_eq!(invalidator.invalidate(dom.document()), 3);
    assert_eq!(dom.style_change(x), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(y), StyleChange::NoStyleChange);
    assert_eq!(dom.style_change(z), StyleChange::LocalStyleChange);
}

#[test]
fn test_class_diff_without_old_classes() {
    let features = features_for(".a .x, .b .y");
    let f = Fixture::new();
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_diff(
        &features,
        &[],
        &atoms(&["a", "b"]),
        dom.element(f.outer),
    );
    assert_eq!(invalidator.pending_invalidation_count(dom.element(f.outer)), 2);
}

#[test]
fn test_id_and_tag_features() {
    let features = features_for(".on #target, .on em");
    let mut f = Fixture::new();
    let target = f.dom.append_element(f.outer, "span", Some("target"), &[]);
    let em = f.dom.append_element(target, "em", None, &[]);
    let other = f.dom.append_element(f.outer, "span", Some("other"), &[]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["on"]),
        dom.element(f.outer),
    );
    assert_eq!(invalidator.invalidate(dom.document()), 3);
    assert_eq!(dom.style_change(target), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(em), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(other), StyleChange::NoStyleChange);
}

fn shadow_fixture() -> (Fixture, NodeId, NodeId) {
    let mut f = Fixture::new();
    let root = f.dom.attach_shadow_root(f.outer);
    let in_shadow = f.dom.append_element(root, "span", None, &["highlighted"]);
    let light = f.dom.append_element(f.outer, "span", None, &["highlighted"]);
    (f, in_shadow, light)
}

#[test]
fn test_shadow_trees_are_walked_when_enabled() {
    let features = features_for(".enabled .highlighted");
    let (f, in_shadow, light) = shadow_fixture();
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(f.outer),
    );
    assert_eq!(invalidator.invalidate(dom.document()), 3);
    assert_eq!(dom.style_change(in_shadow), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(light), StyleChange::LocalStyleChange);
    assert!(dom.all_clean());
}

#[test]
fn test_shadow_trees_are_skipped_when_disabled() {
    let features = features_for(".enabled .highlighted");
    let (f, in_shadow, light) = shadow_fixture();
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(false);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(f.outer),
    );
    // An invalidation scheduled inside the shadow tree is dropped, but its
    // dirty bits are still cleared.
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(in_shadow),
    );

    assert_eq!(invalidator.invalidate(dom.document()), 2);
    assert_eq!(dom.style_change(in_shadow), StyleChange::NoStyleChange);
    assert_eq!(dom.style_change(light), StyleChange::LocalStyleChange);
    assert!(dom.all_clean());
}

#[test]
fn test_invalidation_scheduled_inside_a_shadow_tree() {
    let features = features_for(".enabled .highlighted");
    let mut f = Fixture::new();
    let root = f.dom.attach_shadow_root(f.outer);
    let container = f.dom.append_element(root, "div", None, &[]);
    let inner = f.dom.append_element(container, "span", None, &["highlighted"]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["enabled"]),
        dom.element(container),
    );
    assert!(dom.node(f.outer).child_needs_style_invalidation());
    assert!(dom.node(root).child_needs_style_invalidation());

    assert_eq!(invalidator.invalidate(dom.document()), 2);
    assert_eq!(dom.style_change(container), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(inner), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(f.outer), StyleChange::NoStyleChange);
    assert!(dom.all_clean());
}

#[test]
fn test_custom_pseudo_element_invalidation() {
    let features = features_for(".host::-webkit-slider-thumb");
    let mut f = Fixture::new();
    let root = f.dom.attach_shadow_root(f.outer);
    let thumb = f.dom.append_element(root, "div", None, &[]);
    f.dom.set_shadow_pseudo_id(thumb, "-webkit-slider-thumb");
    let track = f.dom.append_element(root, "div", None, &[]);
    let dom = &f.dom;

    let mut invalidator = StyleInvalidator::with_shadow_dom_enabled(true);
    invalidator.schedule_style_invalidation_for_class_change(
        &features,
        &atoms(&["host"]),
        dom.element(f.outer),
    );
    assert_eq!(invalidator.invalidate(dom.document()), 2);
    assert_eq!(dom.style_change(f.outer), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(thumb), StyleChange::LocalStyleChange);
    assert_eq!(dom.style_change(track), StyleChange::NoStyleChange);
}
