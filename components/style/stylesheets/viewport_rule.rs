/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@viewport`][at] at-rule.
//!
//! [at]: https://drafts.csswg.org/css-device-adapt/#atviewport-rule

use cssparser::{SourceLocation, ToCss};
use std::fmt;

/// A `@viewport` rule. Its descriptors are applied by layout and are not
/// kept here.
#[derive(Debug)]
pub struct ViewportRule {
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ToCss for ViewportRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("@viewport { }")
    }
}
