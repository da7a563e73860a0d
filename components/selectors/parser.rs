/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The flattened selector representation.
//!
//! A `SelectorList` owns one contiguous array of `Component`s holding every
//! chain of a comma-separated selector group, plus the offset at which each
//! chain starts. A chain is stored subject first: `a > b.c` is stored as
//! `b`, `.c`, `a`, with `Relation::Child` on `.c`.

use crate::Atom;
use crate::attr::{CaseSensitivity, QualName};
use crate::pseudo::{self, PseudoType};
use crate::specificity;
use bitflags::bitflags;
use cssparser::{Parser as CssParser, ParserInput, ToCss, parse_nth, serialize_identifier, serialize_string};
use std::cell::Cell;
use std::fmt::{self, Debug};

/// How a simple selector tests an element.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Match {
    Unknown,
    Tag,
    Id,
    Class,
    /// `[att=val]`
    Exact,
    /// `[att]`
    Set,
    /// `[att~=val]`
    List,
    /// `[att|=val]`
    Hyphen,
    PseudoClass,
    PseudoElement,
    /// `:first`, `:left` and `:right` in an `@page` prelude.
    PagePseudoClass,
    /// `[att*=val]`
    Contain,
    /// `[att^=val]`
    Begin,
    /// `[att$=val]`
    End,
}

impl Match {
    /// Whether this is one of the attribute match kinds.
    #[inline]
    pub fn is_attribute(self) -> bool {
        matches!(
            self,
            Match::Exact |
                Match::Set |
                Match::List |
                Match::Hyphen |
                Match::Contain |
                Match::Begin |
                Match::End
        )
    }
}

/// How a component relates to the component stored after it, which is the
/// one to its left in the source text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Relation {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    DirectAdjacent,
    /// `a ~ b`
    IndirectAdjacent,
    /// Both components test the same element.
    SubSelector,
    /// Links a pseudo-element that lives in a shadow tree to its host.
    ShadowPseudo,
    /// `a /deep/ b`
    ShadowDeep,
    /// The link out of a compound into the compound holding `::content`.
    ShadowContent,
}

impl ToCss for Relation {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            Relation::Descendant | Relation::ShadowContent => " ",
            Relation::Child => " > ",
            Relation::DirectAdjacent => " + ",
            Relation::IndirectAdjacent => " ~ ",
            Relation::ShadowDeep => " /deep/ ",
            Relation::SubSelector | Relation::ShadowPseudo => "",
        })
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    struct ComponentFlags: u8 {
        const LAST_IN_CHAIN = 1 << 0;
        const LAST_IN_LIST = 1 << 1;
        /// A universal type selector the source text never spelled out.
        const IMPLICIT = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Nth {
    NotParsed,
    Invalid,
    Parsed(i32, i32),
}

#[derive(Clone, Debug)]
struct RareData {
    attribute: Option<QualName>,
    case_sensitivity: CaseSensitivity,
    argument: Option<Atom>,
    nth: Cell<Nth>,
    selector_list: Option<Box<SelectorList>>,
}

impl RareData {
    fn new() -> Self {
        RareData {
            attribute: None,
            case_sensitivity: CaseSensitivity::CaseSensitive,
            argument: None,
            nth: Cell::new(Nth::NotParsed),
            selector_list: None,
        }
    }
}

#[derive(Clone, Debug)]
enum Payload {
    Empty,
    Tag(QualName),
    Value(Atom),
}

/// One simple selector together with its relation to the next component of
/// its chain.
#[derive(Clone, Debug)]
pub struct Component {
    match_kind: Match,
    relation: Relation,
    flags: ComponentFlags,
    pseudo_type: Cell<PseudoType>,
    payload: Payload,
    /// Attribute names, arguments and nested lists, which most components
    /// never carry.
    rare: Option<Box<RareData>>,
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

impl Component {
    /// An unknown component, to be filled in through the setters.
    pub fn new() -> Self {
        Component {
            match_kind: Match::Unknown,
            relation: Relation::SubSelector,
            flags: ComponentFlags::empty(),
            pseudo_type: Cell::new(PseudoType::NotParsed),
            payload: Payload::Empty,
            rare: None,
        }
    }

    /// A type selector.
    pub fn from_tag(name: QualName) -> Self {
        Component {
            match_kind: Match::Tag,
            payload: Payload::Tag(name),
            ..Self::new()
        }
    }

    pub(crate) fn implicit_universal() -> Self {
        let mut component = Self::from_tag(QualName::any_name());
        component.flags.insert(ComponentFlags::IMPLICIT);
        component
    }

    #[inline]
    pub fn match_kind(&self) -> Match {
        self.match_kind
    }

    #[inline]
    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn set_match(&mut self, match_kind: Match) {
        self.match_kind = match_kind;
        self.pseudo_type.set(PseudoType::NotParsed);
    }

    pub fn set_relation(&mut self, relation: Relation) {
        self.relation = relation;
    }

    /// Sets the id, class, attribute value or pseudo name. May only be
    /// called once.
    pub fn set_value(&mut self, value: Atom) {
        match self.payload {
            Payload::Empty => self.payload = Payload::Value(value),
            Payload::Value(ref mut current) => {
                debug_assert!(false, "selector value set twice");
                *current = value;
            },
            Payload::Tag(..) => debug_assert!(false, "type selectors have no value"),
        }
        self.pseudo_type.set(PseudoType::NotParsed);
    }

    /// Sets the attribute name of an attribute selector. May only be called
    /// once.
    pub fn set_attribute(&mut self, name: QualName, case_sensitivity: CaseSensitivity) {
        let rare = self.rare_data_mut();
        debug_assert!(rare.attribute.is_none(), "selector attribute set twice");
        rare.attribute = Some(name);
        rare.case_sensitivity = case_sensitivity;
    }

    /// Sets the raw argument of a functional pseudo-class such as `:lang()`
    /// or `:nth-child()`. May only be called once.
    pub fn set_argument(&mut self, argument: Atom) {
        let rare = self.rare_data_mut();
        debug_assert!(rare.argument.is_none(), "selector argument set twice");
        rare.argument = Some(argument);
        rare.nth.set(Nth::NotParsed);
    }

    /// Sets the nested selector list of `:not()`, `:-webkit-any()`,
    /// `:host()` or `::cue()`. May only be called once.
    pub fn set_selector_list(&mut self, list: SelectorList) {
        let rare = self.rare_data_mut();
        debug_assert!(rare.selector_list.is_none(), "selector list set twice");
        rare.selector_list = Some(Box::new(list));
    }

    fn rare_data_mut(&mut self) -> &mut RareData {
        debug_assert!(
            !matches!(self.payload, Payload::Tag(..)),
            "type selectors have no rare data"
        );
        self.rare.get_or_insert_with(|| Box::new(RareData::new()))
    }

    fn rare_data(&self) -> Option<&RareData> {
        self.rare.as_deref()
    }

    /// The qualified name of a type selector.
    pub fn tag_q_name(&self) -> Option<&QualName> {
        match self.payload {
            Payload::Tag(ref name) => Some(name),
            _ => None,
        }
    }

    /// The id, class, attribute value or pseudo name. For type selectors,
    /// the local name.
    pub fn value(&self) -> Option<&Atom> {
        match self.payload {
            Payload::Empty => None,
            Payload::Tag(ref name) => Some(&name.local_name),
            Payload::Value(ref value) => Some(value),
        }
    }

    pub fn attribute(&self) -> Option<&QualName> {
        self.rare_data().and_then(|rare| rare.attribute.as_ref())
    }

    pub fn attribute_case_sensitivity(&self) -> CaseSensitivity {
        self.rare_data()
            .map_or(CaseSensitivity::CaseSensitive, |rare| rare.case_sensitivity)
    }

    pub fn argument(&self) -> Option<&Atom> {
        self.rare_data().and_then(|rare| rare.argument.as_ref())
    }

    pub fn selector_list(&self) -> Option<&SelectorList> {
        self.rare_data().and_then(|rare| rare.selector_list.as_deref())
    }

    #[inline]
    pub fn is_last_in_chain(&self) -> bool {
        self.flags.contains(ComponentFlags::LAST_IN_CHAIN)
    }

    #[inline]
    pub fn is_last_in_list(&self) -> bool {
        self.flags.contains(ComponentFlags::LAST_IN_LIST)
    }

    /// Whether this is a universal type selector inserted by the builder.
    #[inline]
    pub fn is_implicit(&self) -> bool {
        self.flags.contains(ComponentFlags::IMPLICIT)
    }

    /// The pseudo-class or pseudo-element kind, classified from the name on
    /// first read. `NotParsed` for components that are not pseudos.
    pub fn pseudo_type(&self) -> PseudoType {
        let cached = self.pseudo_type.get();
        if cached != PseudoType::NotParsed {
            return cached;
        }
        let classified = match self.value() {
            Some(name) => pseudo::classify(self.match_kind, name),
            None => PseudoType::NotParsed,
        };
        self.pseudo_type.set(classified);
        classified
    }

    #[inline]
    pub fn is_attribute_selector(&self) -> bool {
        self.match_kind.is_attribute()
    }

    /// `::-webkit-*` and user-agent-internal pseudo-elements.
    pub fn is_custom_pseudo_element(&self) -> bool {
        self.match_kind == Match::PseudoElement &&
            matches!(
                self.pseudo_type(),
                PseudoType::UserAgentCustomElement | PseudoType::WebKitCustomElement
            )
    }

    /// Whether matching this component depends on the element's siblings.
    pub fn is_sibling_selector(&self) -> bool {
        matches!(
            self.relation,
            Relation::DirectAdjacent | Relation::IndirectAdjacent
        ) || (self.match_kind == Match::PseudoClass && self.pseudo_type().is_structural())
    }

    #[inline]
    pub fn is_direct_adjacent_selector(&self) -> bool {
        self.relation == Relation::DirectAdjacent
    }

    pub fn is_shadow_pseudo_element(&self) -> bool {
        self.match_kind == Match::PseudoElement && self.pseudo_type() == PseudoType::Shadow
    }

    pub fn is_content_pseudo_element(&self) -> bool {
        self.match_kind == Match::PseudoElement && self.pseudo_type() == PseudoType::Content
    }

    pub fn is_host_pseudo_class(&self) -> bool {
        self.match_kind == Match::PseudoClass &&
            matches!(self.pseudo_type(), PseudoType::Host | PseudoType::HostContext)
    }

    #[inline]
    pub fn relation_is_affected_by_pseudo_content(&self) -> bool {
        self.relation == Relation::ShadowContent
    }

    /// Pseudo-elements that live inside their host's shadow tree, and so
    /// are matched through an implicit `ShadowPseudo` link to the host.
    pub fn needs_implicit_shadow_combinator(&self) -> bool {
        self.match_kind == Match::PseudoElement &&
            matches!(
                self.pseudo_type(),
                PseudoType::UserAgentCustomElement |
                    PseudoType::WebKitCustomElement |
                    PseudoType::Cue |
                    PseudoType::Shadow
            )
    }

    fn nth(&self) -> Option<(i32, i32)> {
        let rare = self.rare_data()?;
        match rare.nth.get() {
            Nth::Parsed(a, b) => return Some((a, b)),
            Nth::Invalid => return None,
            Nth::NotParsed => {},
        }
        let parsed = match rare.argument {
            Some(ref argument) => parse_nth_argument(argument),
            None => Err(()),
        };
        rare.nth.set(match parsed {
            Ok((a, b)) => Nth::Parsed(a, b),
            Err(()) => Nth::Invalid,
        });
        parsed.ok()
    }

    /// Parses the `an+b` argument of an nth pseudo-class, caching the
    /// result. Returns false if the argument is missing or malformed.
    pub fn parse_nth(&self) -> bool {
        self.nth().is_some()
    }

    /// Whether the 1-based position `count` satisfies this component's
    /// `an+b` argument.
    pub fn matches_nth(&self, count: i32) -> bool {
        let Some((a, b)) = self.nth() else {
            debug_assert!(false, "matches_nth on a component without a valid nth argument");
            return false;
        };
        // Arguments may sit at the ends of the i32 range.
        let (a, b, count) = (i64::from(a), i64::from(b), i64::from(count));
        if a == 0 {
            count == b
        } else if a > 0 {
            count >= b && (count - b) % a == 0
        } else {
            count <= b && (b - count) % -a == 0
        }
    }

    fn pseudo_to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        if let Some(name) = self.value() {
            serialize_identifier(name, dest)?;
        }
        if let Some(list) = self.selector_list() {
            dest.write_char('(')?;
            list.to_css(dest)?;
            dest.write_char(')')?;
        } else if let Some(argument) = self.argument() {
            dest.write_char('(')?;
            dest.write_str(argument)?;
            dest.write_char(')')?;
        }
        Ok(())
    }

    fn attribute_to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_char('[')?;
        if let Some(name) = self.attribute() {
            name.to_css(dest)?;
        }
        let operator = match self.match_kind {
            Match::Exact => "=",
            Match::List => "~=",
            Match::Hyphen => "|=",
            Match::Begin => "^=",
            Match::End => "$=",
            Match::Contain => "*=",
            _ => return dest.write_char(']'),
        };
        dest.write_str(operator)?;
        serialize_string(self.value().map_or("", |value| &**value), dest)?;
        if self.attribute_case_sensitivity() == CaseSensitivity::AsciiCaseInsensitive {
            dest.write_str(" i")?;
        }
        dest.write_char(']')
    }
}

/// Parses an `an+b` expression, including `odd` and `even`.
pub fn parse_nth_argument(text: &str) -> Result<(i32, i32), ()> {
    let mut input = ParserInput::new(text);
    let mut parser = CssParser::new(&mut input);
    let nth = parse_nth(&mut parser).map_err(|_| ())?;
    parser.expect_exhausted().map_err(|_| ())?;
    Ok(nth)
}

impl ToCss for Component {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match self.match_kind {
            Match::Unknown => Ok(()),
            Match::Tag => match self.tag_q_name() {
                Some(name) if !self.is_implicit() => name.to_css(dest),
                _ => Ok(()),
            },
            Match::Id | Match::Class => {
                dest.write_char(if self.match_kind == Match::Id { '#' } else { '.' })?;
                match self.value() {
                    Some(value) => serialize_identifier(value, dest),
                    None => Ok(()),
                }
            },
            Match::PseudoClass | Match::PagePseudoClass => {
                dest.write_char(':')?;
                self.pseudo_to_css(dest)
            },
            Match::PseudoElement => {
                dest.write_str("::")?;
                self.pseudo_to_css(dest)
            },
            Match::Exact |
            Match::Set |
            Match::List |
            Match::Hyphen |
            Match::Contain |
            Match::Begin |
            Match::End => self.attribute_to_css(dest),
        }
    }
}

/// A borrowed view of one chain of a `SelectorList`.
#[derive(Clone, Copy)]
pub struct Selector<'a> {
    components: &'a [Component],
    index: usize,
}

impl<'a> Selector<'a> {
    /// The offset of the chain's first component within its list.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn components(&self) -> &'a [Component] {
        self.components
    }

    /// Iterates the chain in matching order, subject first.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'a, Component> {
        self.components.iter()
    }

    /// The first component of the subject compound.
    #[inline]
    pub fn rightmost(&self) -> &'a Component {
        &self.components[0]
    }

    /// Iterates the runs of components joined by `SubSelector`, subject
    /// first. The last component of each run carries the relation to the
    /// next run.
    pub fn compounds(&self) -> Compounds<'a> {
        Compounds {
            remaining: self.components,
        }
    }

    /// Whether the chain tests a single element.
    pub fn is_compound(&self) -> bool {
        match self.components.split_last() {
            Some((_, rest)) => rest.iter().all(|component| {
                matches!(
                    component.relation(),
                    Relation::SubSelector | Relation::ShadowPseudo
                )
            }),
            None => true,
        }
    }

    /// The packed specificity of the chain, one byte per tier.
    pub fn specificity(&self) -> u32 {
        specificity::specificity(self.components)
    }

    /// The specificity of an `@page` selector.
    pub fn specificity_for_page(&self) -> u32 {
        specificity::specificity_for_page(self.components)
    }

    pub fn selector_text(&self) -> String {
        self.to_css_string()
    }
}

impl<'a> Debug for Selector<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.to_css(f)
    }
}

impl<'a> ToCss for Selector<'a> {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let compounds: Vec<&[Component]> = self.compounds().collect();
        for (i, compound) in compounds.iter().enumerate().rev() {
            for component in compound.iter() {
                component.to_css(dest)?;
            }
            if i > 0 {
                if let Some(link) = compounds[i - 1].last() {
                    link.relation().to_css(dest)?;
                }
            }
        }
        Ok(())
    }
}

/// Iterator over the compounds of a chain, see `Selector::compounds`.
pub struct Compounds<'a> {
    remaining: &'a [Component],
}

impl<'a> Iterator for Compounds<'a> {
    type Item = &'a [Component];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let end = self
            .remaining
            .iter()
            .position(|component| component.relation() != Relation::SubSelector)
            .map_or(self.remaining.len(), |position| position + 1);
        let (compound, rest) = self.remaining.split_at(end);
        self.remaining = rest;
        Some(compound)
    }
}

/// A comma-separated group of selector chains in one owned array.
#[derive(Clone, Debug, Default)]
pub struct SelectorList {
    components: Box<[Component]>,
    chain_starts: Box<[usize]>,
}

impl SelectorList {
    /// Takes ownership of the given chains, each already in matching order,
    /// and lays them out back to back.
    pub fn adopt(chains: Vec<Vec<Component>>) -> Self {
        let total = chains.iter().map(Vec::len).sum();
        let mut components = Vec::with_capacity(total);
        let mut chain_starts = Vec::with_capacity(chains.len());

        for chain in chains {
            debug_assert!(!chain.is_empty(), "selector chains are never empty");
            if chain.is_empty() {
                continue;
            }
            chain_starts.push(components.len());
            components.extend(chain.into_iter().map(|mut component| {
                component
                    .flags
                    .remove(ComponentFlags::LAST_IN_CHAIN | ComponentFlags::LAST_IN_LIST);
                component
            }));
            if let Some(last) = components.last_mut() {
                last.flags.insert(ComponentFlags::LAST_IN_CHAIN);
            }
        }
        if let Some(last) = components.last_mut() {
            last.flags.insert(ComponentFlags::LAST_IN_LIST);
        }

        SelectorList {
            components: components.into_boxed_slice(),
            chain_starts: chain_starts.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain_starts.is_empty()
    }

    /// The number of chains.
    #[inline]
    pub fn length(&self) -> usize {
        self.chain_starts.len()
    }

    /// Every component of every chain, in storage order.
    #[inline]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn first(&self) -> Option<Selector<'_>> {
        self.chain_starts.first().map(|&start| self.selector_at(start))
    }

    pub fn next(&self, current: &Selector) -> Option<Selector<'_>> {
        self.index_of_next_selector_after(current.index())
            .map(|start| self.selector_at(start))
    }

    pub fn iter(&self) -> impl Iterator<Item = Selector<'_>> + '_ {
        self.chain_starts.iter().map(move |&start| self.selector_at(start))
    }

    /// The chain starting at component offset `index`.
    pub fn selector_at(&self, index: usize) -> Selector<'_> {
        let end = match self.chain_starts.binary_search(&index) {
            Ok(position) => self
                .chain_starts
                .get(position + 1)
                .copied()
                .unwrap_or(self.components.len()),
            Err(..) => {
                debug_assert!(false, "{} is not the start of a selector", index);
                self.components[index..]
                    .iter()
                    .position(Component::is_last_in_chain)
                    .map_or(self.components.len(), |offset| index + offset + 1)
            },
        };
        Selector {
            components: &self.components[index..end],
            index,
        }
    }

    /// The offset of the chain after the one containing `index`, if any.
    pub fn index_of_next_selector_after(&self, index: usize) -> Option<usize> {
        let position = match self.chain_starts.binary_search(&index) {
            Ok(position) => position + 1,
            Err(position) => position,
        };
        self.chain_starts.get(position).copied()
    }

    pub fn selectors_text(&self) -> String {
        self.to_css_string()
    }

    /// Whether the chain at `index` reaches into shadow trees with
    /// `/deep/` or `::shadow`, nested lists included.
    pub fn selector_crosses_tree_scopes(&self, index: usize) -> bool {
        any_component(self.selector_at(index).components(), &|component| {
            component.relation() == Relation::ShadowDeep || component.is_shadow_pseudo_element()
        })
    }

    /// Whether the chain at `index` matches content distributed through
    /// `::content`, nested lists included.
    pub fn has_shadow_distributed_at(&self, index: usize) -> bool {
        any_component(self.selector_at(index).components(), &|component| {
            component.relation_is_affected_by_pseudo_content() ||
                component.is_content_pseudo_element()
        })
    }
}

fn any_component<F>(components: &[Component], predicate: &F) -> bool
where
    F: Fn(&Component) -> bool,
{
    components.iter().any(|component| {
        predicate(component) ||
            component
                .selector_list()
                .is_some_and(|list| any_component(list.components(), predicate))
    })
}

impl ToCss for SelectorList {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut iter = self.iter();
        if let Some(first) = iter.next() {
            first.to_css(dest)?;
        }
        for selector in iter {
            dest.write_str(", ")?;
            selector.to_css(dest)?;
        }
        Ok(())
    }
}
