/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The [`@import`][import] at-rule.
//!
//! [import]: https://drafts.csswg.org/css-cascade-3/#at-import

use crate::media_queries::MediaList;
use crate::stylesheets::StylesheetContents;
use cssparser::{serialize_string, SourceLocation, ToCss};
use servo_arc::Arc;
use std::fmt;

/// The [`@import`][import] at-rule.
///
/// [import]: https://drafts.csswg.org/css-cascade-3/#at-import
#[derive(Debug)]
pub struct ImportRule {
    /// The `<url>` this `@import` rule is loading.
    pub url: String,
    /// The media list the imported sheet applies to.
    pub media: MediaList,
    /// The imported sheet, once it has loaded.
    pub stylesheet: Option<Arc<StylesheetContents>>,
    /// The line and column of the rule's source code.
    pub source_location: SourceLocation,
}

impl ImportRule {
    /// Whether the imported sheet is available.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.stylesheet.is_some()
    }
}

impl ToCss for ImportRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("@import url(")?;
        serialize_string(&self.url, dest)?;
        dest.write_char(')')?;
        if !self.media.is_empty() {
            dest.write_char(' ')?;
            self.media.to_css(dest)?;
        }
        dest.write_char(';')
    }
}
