/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Assembly of selector chains from simple selectors given in source order.

use crate::Atom;
use crate::attr::{CaseSensitivity, QualName};
use crate::parser::{Component, Match, Relation, SelectorList};
use std::mem;

#[derive(Debug, Default)]
struct Compound {
    components: Vec<Component>,
    /// The combinator written before this compound.
    combinator: Option<Relation>,
}

/// Builds one selector chain.
///
/// Simple selectors and combinators are fed left to right, as they appear
/// in the source text; `build` emits the chain in matching order, ready for
/// `SelectorList::adopt`.
///
/// Pseudo-elements that live in a shadow tree (`::-webkit-*`, `::cue`,
/// `::shadow`) are moved to the front of their compound and linked to the
/// rest of it with `Relation::ShadowPseudo`. The compound that follows a
/// `::content` compound is linked to it with `Relation::ShadowContent`.
#[derive(Debug, Default)]
pub struct SelectorBuilder {
    compounds: Vec<Compound>,
}

impl SelectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, component: Component) -> &mut Self {
        match self.compounds.last_mut() {
            Some(compound) => compound.components.push(component),
            None => self.compounds.push(Compound {
                components: vec![component],
                combinator: None,
            }),
        }
        self
    }

    fn simple(&mut self, match_kind: Match, value: &str) -> &mut Self {
        let mut component = Component::new();
        component.set_match(match_kind);
        component.set_value(Atom::from(value));
        self.push(component)
    }

    fn pseudo(match_kind: Match, name: &str) -> Component {
        let mut component = Component::new();
        component.set_match(match_kind);
        component.set_value(Atom::from(name));
        // `:before` and friends are pseudo-elements whatever the colons.
        if match_kind == Match::PseudoClass && component.pseudo_type().is_css2_compat_element() {
            component.set_match(Match::PseudoElement);
        }
        component
    }

    /// A type selector in any namespace.
    pub fn tag(&mut self, local_name: &str) -> &mut Self {
        self.push(Component::from_tag(QualName::new(local_name)))
    }

    pub fn qualified_tag(&mut self, name: QualName) -> &mut Self {
        self.push(Component::from_tag(name))
    }

    /// `*`
    pub fn universal(&mut self) -> &mut Self {
        self.push(Component::from_tag(QualName::any_name()))
    }

    pub fn id(&mut self, name: &str) -> &mut Self {
        self.simple(Match::Id, name)
    }

    pub fn class(&mut self, name: &str) -> &mut Self {
        self.simple(Match::Class, name)
    }

    /// `[name]`
    pub fn attribute_exists(&mut self, name: &str) -> &mut Self {
        self.qualified_attribute(QualName::new(name), Match::Set, None, CaseSensitivity::CaseSensitive)
    }

    /// `[name<op>"value"]`
    pub fn attribute(&mut self, name: &str, match_kind: Match, value: &str) -> &mut Self {
        self.qualified_attribute(
            QualName::new(name),
            match_kind,
            Some(value),
            CaseSensitivity::CaseSensitive,
        )
    }

    pub fn qualified_attribute(
        &mut self,
        name: QualName,
        match_kind: Match,
        value: Option<&str>,
        case_sensitivity: CaseSensitivity,
    ) -> &mut Self {
        debug_assert!(match_kind.is_attribute());
        let mut component = Component::new();
        component.set_match(match_kind);
        component.set_attribute(name, case_sensitivity);
        if let Some(value) = value {
            component.set_value(Atom::from(value));
        }
        self.push(component)
    }

    pub fn pseudo_class(&mut self, name: &str) -> &mut Self {
        let component = Self::pseudo(Match::PseudoClass, name);
        self.push(component)
    }

    /// A functional pseudo-class with a raw argument, like `:lang(en)` or
    /// `:nth-child(2n+1)`.
    pub fn pseudo_class_with_argument(&mut self, name: &str, argument: &str) -> &mut Self {
        let mut component = Self::pseudo(Match::PseudoClass, name);
        component.set_argument(Atom::from(argument));
        self.push(component)
    }

    /// A functional pseudo-class taking selectors, like `:-webkit-any()` or
    /// `:host()`.
    pub fn pseudo_class_with_selectors(&mut self, name: &str, list: SelectorList) -> &mut Self {
        let mut component = Self::pseudo(Match::PseudoClass, name);
        component.set_selector_list(list);
        self.push(component)
    }

    /// `:not(...)`
    pub fn negation(&mut self, list: SelectorList) -> &mut Self {
        self.pseudo_class_with_selectors("not", list)
    }

    pub fn pseudo_element(&mut self, name: &str) -> &mut Self {
        let component = Self::pseudo(Match::PseudoElement, name);
        self.push(component)
    }

    /// A functional pseudo-element, like `::cue(b)`.
    pub fn pseudo_element_with_selectors(&mut self, name: &str, list: SelectorList) -> &mut Self {
        let mut component = Self::pseudo(Match::PseudoElement, name);
        component.set_selector_list(list);
        self.push(component)
    }

    /// `:first`, `:left` or `:right` in an `@page` prelude.
    pub fn page_pseudo_class(&mut self, name: &str) -> &mut Self {
        let component = Self::pseudo(Match::PagePseudoClass, name);
        self.push(component)
    }

    fn combinator(&mut self, relation: Relation) -> &mut Self {
        debug_assert!(
            self.compounds.last().is_some_and(|c| !c.components.is_empty()),
            "combinator without a compound on its left"
        );
        self.compounds.push(Compound {
            components: Vec::new(),
            combinator: Some(relation),
        });
        self
    }

    /// ` `
    pub fn descendant(&mut self) -> &mut Self {
        self.combinator(Relation::Descendant)
    }

    /// ` > `
    pub fn child(&mut self) -> &mut Self {
        self.combinator(Relation::Child)
    }

    /// ` + `
    pub fn direct_adjacent(&mut self) -> &mut Self {
        self.combinator(Relation::DirectAdjacent)
    }

    /// ` ~ `
    pub fn indirect_adjacent(&mut self) -> &mut Self {
        self.combinator(Relation::IndirectAdjacent)
    }

    /// ` /deep/ `
    pub fn shadow_deep(&mut self) -> &mut Self {
        self.combinator(Relation::ShadowDeep)
    }

    /// Emits the chain in matching order and resets the builder.
    pub fn build(&mut self) -> Vec<Component> {
        let compounds = mem::take(&mut self.compounds);
        let follows_content: Vec<bool> = compounds
            .iter()
            .map(|compound| {
                compound
                    .components
                    .iter()
                    .any(Component::is_content_pseudo_element)
            })
            .collect();

        let mut chain = Vec::with_capacity(compounds.iter().map(|c| c.components.len() + 1).sum());
        for (i, compound) in compounds.into_iter().enumerate().rev() {
            let Compound {
                components,
                combinator,
            } = compound;
            append_compound(&mut chain, components);
            if i == 0 {
                continue;
            }
            let relation = if follows_content[i - 1] {
                Relation::ShadowContent
            } else {
                combinator.unwrap_or(Relation::Descendant)
            };
            if let Some(last) = chain.last_mut() {
                last.set_relation(relation);
            }
        }
        chain
    }
}

fn append_compound(chain: &mut Vec<Component>, components: Vec<Component>) {
    debug_assert!(!components.is_empty(), "empty compound selector");
    let (shadow, mut rest): (Vec<Component>, Vec<Component>) = components
        .into_iter()
        .partition(Component::needs_implicit_shadow_combinator);
    if !shadow.is_empty() && rest.is_empty() {
        rest.push(Component::implicit_universal());
    }
    for mut component in shadow {
        component.set_relation(Relation::ShadowPseudo);
        chain.push(component);
    }
    for mut component in rest {
        component.set_relation(Relation::SubSelector);
        chain.push(component);
    }
}
