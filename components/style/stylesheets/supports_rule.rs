/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! [@supports rules](https://drafts.csswg.org/css-conditional-3/#at-supports)

use crate::stylesheets::{rules_block_to_css, CssRule};
use cssparser::{SourceLocation, ToCss};
use std::fmt;

/// An [`@supports`][supports] rule.
///
/// The condition is evaluated when the sheet is parsed; only its result is
/// kept here.
///
/// [supports]: https://drafts.csswg.org/css-conditional-3/#at-supports
#[derive(Debug)]
pub struct SupportsRule {
    /// The condition, as written.
    pub condition_text: String,
    /// The nested rules to this `@supports` rule.
    pub rules: Vec<CssRule>,
    /// The result of evaluating the condition.
    pub enabled: bool,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ToCss for SupportsRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("@supports ")?;
        dest.write_str(&self.condition_text)?;
        rules_block_to_css(&self.rules, dest)
    }
}
