/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Classification of pseudo-class and pseudo-element names.

use crate::parser::Match;

/// The recognized pseudo-classes and pseudo-elements.
///
/// `NotParsed` is the sentinel stored in a component until the first time
/// its pseudo type is read.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PseudoType {
    NotParsed,
    Unknown,
    Empty,
    FirstChild,
    FirstOfType,
    LastChild,
    LastOfType,
    OnlyChild,
    OnlyOfType,
    FirstLine,
    FirstLetter,
    NthChild,
    NthOfType,
    NthLastChild,
    NthLastOfType,
    Link,
    Visited,
    Any,
    AnyLink,
    AutoFill,
    Hover,
    Drag,
    Focus,
    Active,
    Checked,
    Enabled,
    FullPageMedia,
    Default,
    Disabled,
    Optional,
    Required,
    ReadOnly,
    ReadWrite,
    Valid,
    Invalid,
    Indeterminate,
    Target,
    Before,
    After,
    Backdrop,
    Lang,
    Not,
    Resizer,
    Root,
    Scope,
    Scrollbar,
    Selection,
    LeftPage,
    RightPage,
    FirstPage,
    FullScreen,
    InRange,
    OutOfRange,
    UserAgentCustomElement,
    WebKitCustomElement,
    Cue,
    FutureCue,
    PastCue,
    Unresolved,
    Content,
    Host,
    HostContext,
    Shadow,
}

impl PseudoType {
    /// Maps a lowercased pseudo name (without colons or argument) to its
    /// type, regardless of whether it was written as a class or an element.
    pub fn from_name(name: &str) -> PseudoType {
        if name.starts_with("-webkit-") {
            if let Some(known) = Self::from_known_name(name) {
                return known;
            }
            return PseudoType::WebKitCustomElement;
        }
        if name.starts_with("-internal-") {
            return PseudoType::UserAgentCustomElement;
        }
        Self::from_known_name(name).unwrap_or(PseudoType::Unknown)
    }

    fn from_known_name(name: &str) -> Option<PseudoType> {
        Some(match name {
            "empty" => PseudoType::Empty,
            "first-child" => PseudoType::FirstChild,
            "first-of-type" => PseudoType::FirstOfType,
            "last-child" => PseudoType::LastChild,
            "last-of-type" => PseudoType::LastOfType,
            "only-child" => PseudoType::OnlyChild,
            "only-of-type" => PseudoType::OnlyOfType,
            "first-line" => PseudoType::FirstLine,
            "first-letter" => PseudoType::FirstLetter,
            "nth-child" => PseudoType::NthChild,
            "nth-of-type" => PseudoType::NthOfType,
            "nth-last-child" => PseudoType::NthLastChild,
            "nth-last-of-type" => PseudoType::NthLastOfType,
            "link" => PseudoType::Link,
            "visited" => PseudoType::Visited,
            "-webkit-any" => PseudoType::Any,
            "-webkit-any-link" => PseudoType::AnyLink,
            "-webkit-autofill" => PseudoType::AutoFill,
            "hover" => PseudoType::Hover,
            "-webkit-drag" => PseudoType::Drag,
            "focus" => PseudoType::Focus,
            "active" => PseudoType::Active,
            "checked" => PseudoType::Checked,
            "enabled" => PseudoType::Enabled,
            "-webkit-full-page-media" => PseudoType::FullPageMedia,
            "default" => PseudoType::Default,
            "disabled" => PseudoType::Disabled,
            "optional" => PseudoType::Optional,
            "required" => PseudoType::Required,
            "read-only" => PseudoType::ReadOnly,
            "read-write" => PseudoType::ReadWrite,
            "valid" => PseudoType::Valid,
            "invalid" => PseudoType::Invalid,
            "indeterminate" => PseudoType::Indeterminate,
            "target" => PseudoType::Target,
            "before" => PseudoType::Before,
            "after" => PseudoType::After,
            "backdrop" => PseudoType::Backdrop,
            "lang" => PseudoType::Lang,
            "not" => PseudoType::Not,
            "-webkit-resizer" => PseudoType::Resizer,
            "root" => PseudoType::Root,
            "scope" => PseudoType::Scope,
            "-webkit-scrollbar" => PseudoType::Scrollbar,
            "selection" => PseudoType::Selection,
            "left" => PseudoType::LeftPage,
            "right" => PseudoType::RightPage,
            "first" => PseudoType::FirstPage,
            "-webkit-full-screen" => PseudoType::FullScreen,
            "in-range" => PseudoType::InRange,
            "out-of-range" => PseudoType::OutOfRange,
            "cue" => PseudoType::Cue,
            "future" => PseudoType::FutureCue,
            "past" => PseudoType::PastCue,
            "unresolved" => PseudoType::Unresolved,
            "content" => PseudoType::Content,
            "host" => PseudoType::Host,
            "host-context" => PseudoType::HostContext,
            "shadow" => PseudoType::Shadow,
            _ => return None,
        })
    }

    /// Pseudo-elements that may also be written with a single colon.
    pub fn is_css2_compat_element(self) -> bool {
        matches!(
            self,
            PseudoType::After |
                PseudoType::Before |
                PseudoType::Cue |
                PseudoType::FirstLetter |
                PseudoType::FirstLine
        )
    }

    /// Whether this type names a pseudo-element rather than a pseudo-class.
    pub fn is_element(self) -> bool {
        self.is_css2_compat_element() ||
            matches!(
                self,
                PseudoType::Backdrop |
                    PseudoType::Resizer |
                    PseudoType::Scrollbar |
                    PseudoType::Selection |
                    PseudoType::UserAgentCustomElement |
                    PseudoType::WebKitCustomElement |
                    PseudoType::Content |
                    PseudoType::Shadow
            )
    }

    /// Whether this type only makes sense in an `@page` prelude.
    pub fn is_page_pseudo_class(self) -> bool {
        matches!(
            self,
            PseudoType::FirstPage | PseudoType::LeftPage | PseudoType::RightPage
        )
    }

    /// The tree-structural pseudo-classes, which make a selector depend on
    /// an element's siblings.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            PseudoType::Empty |
                PseudoType::FirstChild |
                PseudoType::FirstOfType |
                PseudoType::LastChild |
                PseudoType::LastOfType |
                PseudoType::OnlyChild |
                PseudoType::OnlyOfType |
                PseudoType::NthChild |
                PseudoType::NthOfType |
                PseudoType::NthLastChild |
                PseudoType::NthLastOfType
        )
    }

    /// Whether the argument of this pseudo-class is an `an+b` expression.
    pub fn takes_nth_argument(self) -> bool {
        matches!(
            self,
            PseudoType::NthChild |
                PseudoType::NthOfType |
                PseudoType::NthLastChild |
                PseudoType::NthLastOfType
        )
    }
}

/// Classifies `name` as used with the given match kind.
///
/// A name used with the wrong kind of colon, or a page pseudo-class used
/// outside `@page` (and vice versa), classifies as `Unknown`.
pub fn classify(match_kind: Match, name: &str) -> PseudoType {
    if !matches!(
        match_kind,
        Match::PseudoClass | Match::PseudoElement | Match::PagePseudoClass
    ) {
        return PseudoType::NotParsed;
    }

    let lower;
    let name = if name.bytes().any(|b| b.is_ascii_uppercase()) {
        lower = name.to_ascii_lowercase();
        &*lower
    } else {
        name
    };

    let pseudo_type = PseudoType::from_name(name);
    if pseudo_type == PseudoType::Unknown {
        return pseudo_type;
    }

    let wants_page = match_kind == Match::PagePseudoClass;
    if wants_page != pseudo_type.is_page_pseudo_class() {
        return PseudoType::Unknown;
    }

    match match_kind {
        Match::PseudoClass if pseudo_type.is_element() => {
            if pseudo_type.is_css2_compat_element() {
                pseudo_type
            } else {
                PseudoType::Unknown
            }
        },
        Match::PseudoElement if !pseudo_type.is_element() => PseudoType::Unknown,
        _ => pseudo_type,
    }
}
