/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A style rule.

use cssparser::{SourceLocation, ToCss};
use selectors::SelectorList;
use std::fmt;

/// A style rule, with its selectors. Declarations are of no interest to
/// rule indexing and are not kept here.
#[derive(Debug)]
pub struct StyleRule {
    /// The selector list of the rule.
    pub selectors: SelectorList,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl StyleRule {
    /// A style rule at the start of the sheet.
    pub fn new(selectors: SelectorList) -> Self {
        StyleRule {
            selectors,
            source_location: SourceLocation { line: 0, column: 1 },
        }
    }
}

impl ToCss for StyleRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        self.selectors.to_css(dest)?;
        dest.write_str(" { }")
    }
}
