/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A [`@page`][page] rule.
//!
//! [page]: https://drafts.csswg.org/css2/page.html#page-box

use cssparser::{SourceLocation, ToCss};
use selectors::SelectorList;
use std::fmt;

/// A [`@page`][page] rule, with its page selectors.
///
/// [page]: https://drafts.csswg.org/css2/page.html#page-box
#[derive(Debug)]
pub struct PageRule {
    /// The page selectors, possibly empty.
    pub selectors: SelectorList,
    /// The source position this rule was found at.
    pub source_location: SourceLocation,
}

impl PageRule {
    /// The specificity of the page selector, for ordering in the cascade.
    pub fn specificity(&self) -> u32 {
        self.selectors
            .first()
            .map_or(0, |selector| selector.specificity_for_page())
    }
}

impl ToCss for PageRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("@page ")?;
        if !self.selectors.is_empty() {
            self.selectors.to_css(dest)?;
            dest.write_char(' ')?;
        }
        dest.write_str("{ }")
    }
}
