/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::parsing::parse_selectors;
use selectors::parser::{Match, Relation};
use selectors::PseudoType;

fn assert_roundtrip(text: &str) {
    assert_eq!(parse_selectors(text).selectors_text(), text);
}

#[test]
fn test_serialization() {
    assert_roundtrip("div.a > p + span");
    assert_roundtrip("#x:not(.b)");
    assert_roundtrip("ul li ~ li:nth-child(2n+1)");
    assert_roundtrip("input[type=\"text\" i]");
    assert_roundtrip("a[href^=\"http\"], a[href$=\".pdf\"], a[rel~=\"me\"]");
    assert_roundtrip(".a:-webkit-any(.b, .c)");
    assert_roundtrip("div /deep/ .inner");
    assert_roundtrip("input::-webkit-slider-thumb");
    assert_roundtrip("::cue");
}

#[test]
fn test_css2_pseudo_elements_serialize_with_two_colons() {
    assert_eq!(parse_selectors("p:before").selectors_text(), "p::before");
}

#[test]
fn test_chain_offsets() {
    let list = parse_selectors(".x.y, #z, p q");
    let starts: Vec<usize> = list.iter().map(|s| s.index()).collect();
    assert_eq!(starts, vec![0, 2, 3]);
    assert_eq!(list.length(), 3);
    assert!(list.components()[1].is_last_in_chain());
    assert!(list.components()[4].is_last_in_list());
}

#[test]
fn test_shadow_pseudo_element_leads_its_compound() {
    let list = parse_selectors("input.range::-webkit-slider-thumb");
    let selector = list.first().unwrap();
    let components = selector.components();
    assert!(components[0].is_custom_pseudo_element());
    assert_eq!(components[0].relation(), Relation::ShadowPseudo);
    assert_eq!(components[1].match_kind(), Match::Tag);
    assert_eq!(components[2].match_kind(), Match::Class);
    assert!(selector.is_compound());
}

#[test]
fn test_specificity() {
    let list = parse_selectors("#a .b div::before, *, li[title]:hover, p:not(#x)");
    let specificities: Vec<u32> = list.iter().map(|s| s.specificity()).collect();
    assert_eq!(specificities, vec![0x10102, 0, 0x201, 0x10001]);
}

#[test]
fn test_tree_scope_queries() {
    let list = parse_selectors("div /deep/ span, .a, :-webkit-any(.b /deep/ .c), content::content .d");
    let starts: Vec<usize> = list.iter().map(|s| s.index()).collect();

    assert!(list.selector_crosses_tree_scopes(starts[0]));
    assert!(!list.selector_crosses_tree_scopes(starts[1]));
    assert!(list.selector_crosses_tree_scopes(starts[2]));
    assert!(!list.selector_crosses_tree_scopes(starts[3]));

    assert!(!list.has_shadow_distributed_at(starts[0]));
    assert!(list.has_shadow_distributed_at(starts[3]));
}

#[test]
fn test_pseudo_classification() {
    let list = parse_selectors(":-webkit-any-link, ::-webkit-foo, ::-internal-media-controls, :bogus");
    let types: Vec<PseudoType> = list.iter().map(|s| s.rightmost().pseudo_type()).collect();
    assert_eq!(
        types,
        vec![
            PseudoType::AnyLink,
            PseudoType::WebKitCustomElement,
            PseudoType::UserAgentCustomElement,
            PseudoType::Unknown,
        ]
    );
}
