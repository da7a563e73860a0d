/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@font-face`][ff] at-rule.
//!
//! [ff]: https://drafts.csswg.org/css-fonts/#at-font-face-rule

use crate::Atom;
use cssparser::{serialize_identifier, SourceLocation, ToCss};
use std::fmt;

/// A `@font-face` rule.
#[derive(Debug)]
pub struct FontFaceRule {
    /// The `font-family` descriptor.
    pub family: Atom,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ToCss for FontFaceRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("@font-face { font-family: ")?;
        serialize_identifier(&self.family, dest)?;
        dest.write_str("; }")
    }
}
