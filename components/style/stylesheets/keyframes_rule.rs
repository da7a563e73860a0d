/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Keyframes: https://drafts.csswg.org/css-animations/#keyframes

use crate::Atom;
use cssparser::{serialize_identifier, SourceLocation, ToCss};
use std::fmt;

/// A [`@keyframes`][keyframes] rule.
///
/// [keyframes]: https://drafts.csswg.org/css-animations/#keyframes
#[derive(Debug)]
pub struct KeyframesRule {
    /// The name of the current animation.
    pub name: Atom,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ToCss for KeyframesRule {
    // Serialization of KeyframesRule is not specced.
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("@keyframes ")?;
        serialize_identifier(&self.name, dest)?;
        dest.write_str(" { }")
    }
}
