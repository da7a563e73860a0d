/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::parser::{Component, Match};
use crate::pseudo::PseudoType;

const ID_MASK: u32 = 0xff0000;
const CLASS_MASK: u32 = 0x00ff00;
const ELEMENT_MASK: u32 = 0x0000ff;

const ID_WEIGHT: u32 = 0x10000;
const CLASS_WEIGHT: u32 = 0x100;
const ELEMENT_WEIGHT: u32 = 1;

/// Sums the chain's weights, clamping each tier to its maximum instead of
/// carrying into the next one.
pub(crate) fn specificity(components: &[Component]) -> u32 {
    components.iter().fold(0, |total, component| {
        let sum = total + specificity_for_one_selector(component);
        if sum & ID_MASK < total & ID_MASK {
            total | ID_MASK
        } else if sum & CLASS_MASK < total & CLASS_MASK {
            total | CLASS_MASK
        } else if sum & ELEMENT_MASK < total & ELEMENT_MASK {
            total | ELEMENT_MASK
        } else {
            sum
        }
    })
}

fn specificity_for_one_selector(component: &Component) -> u32 {
    match component.match_kind() {
        Match::Id => ID_WEIGHT,
        Match::PseudoClass => match component.pseudo_type() {
            PseudoType::Host | PseudoType::HostContext => 0,
            // :not() weighs as much as its argument.
            PseudoType::Not => component
                .selector_list()
                .and_then(|list| list.first())
                .map_or(0, |selector| specificity_for_one_selector(selector.rightmost())),
            _ => CLASS_WEIGHT,
        },
        Match::Class |
        Match::Exact |
        Match::Set |
        Match::List |
        Match::Hyphen |
        Match::Contain |
        Match::Begin |
        Match::End => CLASS_WEIGHT,
        Match::PseudoElement => ELEMENT_WEIGHT,
        Match::Tag => match component.tag_q_name() {
            Some(name) if !name.is_universal() => ELEMENT_WEIGHT,
            _ => 0,
        },
        Match::Unknown | Match::PagePseudoClass => 0,
    }
}

pub(crate) fn specificity_for_page(components: &[Component]) -> u32 {
    let total = components.iter().fold(0u32, |total, component| {
        let weight = match component.match_kind() {
            Match::Tag => match component.tag_q_name() {
                Some(name) if !name.is_universal() => 4,
                _ => 0,
            },
            Match::PagePseudoClass => match component.pseudo_type() {
                PseudoType::FirstPage => 2,
                PseudoType::LeftPage | PseudoType::RightPage => 1,
                _ => 0,
            },
            _ => 0,
        };
        total.saturating_add(weight)
    });
    total & (ID_MASK | CLASS_MASK | ELEMENT_MASK)
}
