/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Style sheets and their CSS rules.
//!
//! This is the parsed form the rule compiler consumes. Parsing itself
//! happens elsewhere; sheets are built directly from these types.

mod font_face_rule;
pub mod import_rule;
pub mod keyframes_rule;
mod media_rule;
mod page_rule;
mod style_rule;
pub mod supports_rule;
pub mod viewport_rule;

use cssparser::ToCss;
use servo_arc::Arc;
use std::fmt;

pub use self::font_face_rule::FontFaceRule;
pub use self::import_rule::ImportRule;
pub use self::keyframes_rule::KeyframesRule;
pub use self::media_rule::MediaRule;
pub use self::page_rule::PageRule;
pub use self::style_rule::StyleRule;
pub use self::supports_rule::SupportsRule;
pub use self::viewport_rule::ViewportRule;

/// A CSS rule.
#[derive(Clone, Debug)]
pub enum CssRule {
    /// A style rule.
    Style(Arc<StyleRule>),
    /// An `@import` rule.
    Import(Arc<ImportRule>),
    /// An `@media` rule.
    Media(Arc<MediaRule>),
    /// An `@supports` rule.
    Supports(Arc<SupportsRule>),
    /// An `@page` rule.
    Page(Arc<PageRule>),
    /// A `@font-face` rule.
    FontFace(Arc<FontFaceRule>),
    /// A `@keyframes` rule.
    Keyframes(Arc<KeyframesRule>),
    /// A `@viewport` rule.
    Viewport(Arc<ViewportRule>),
}

/// The type of a CSS rule, used mostly for logging.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CssRuleType {
    Style,
    Import,
    Media,
    Supports,
    Page,
    FontFace,
    Keyframes,
    Viewport,
}

impl CssRule {
    /// Returns the type of this rule.
    pub fn rule_type(&self) -> CssRuleType {
        match *self {
            CssRule::Style(_) => CssRuleType::Style,
            CssRule::Import(_) => CssRuleType::Import,
            CssRule::Media(_) => CssRuleType::Media,
            CssRule::Supports(_) => CssRuleType::Supports,
            CssRule::Page(_) => CssRuleType::Page,
            CssRule::FontFace(_) => CssRuleType::FontFace,
            CssRule::Keyframes(_) => CssRuleType::Keyframes,
            CssRule::Viewport(_) => CssRuleType::Viewport,
        }
    }
}

impl ToCss for CssRule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            CssRule::Style(ref rule) => rule.to_css(dest),
            CssRule::Import(ref rule) => rule.to_css(dest),
            CssRule::Media(ref rule) => rule.to_css(dest),
            CssRule::Supports(ref rule) => rule.to_css(dest),
            CssRule::Page(ref rule) => rule.to_css(dest),
            CssRule::FontFace(ref rule) => rule.to_css(dest),
            CssRule::Keyframes(ref rule) => rule.to_css(dest),
            CssRule::Viewport(ref rule) => rule.to_css(dest),
        }
    }
}

/// Writes a block of nested rules, `{ a b }`.
pub(crate) fn rules_block_to_css<W>(rules: &[CssRule], dest: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    dest.write_str(" {")?;
    for rule in rules {
        dest.write_char(' ')?;
        rule.to_css(dest)?;
    }
    dest.write_str(" }")
}

/// The rules of a style sheet, in document order.
#[derive(Clone, Debug, Default)]
pub struct StylesheetContents {
    /// The top-level rules.
    pub rules: Vec<CssRule>,
}

impl StylesheetContents {
    /// A sheet holding `rules`.
    pub fn from_rules(rules: Vec<CssRule>) -> Self {
        StylesheetContents { rules }
    }
}

impl ToCss for StylesheetContents {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for (i, rule) in self.rules.iter().enumerate() {
            if i != 0 {
                dest.write_char('\n')?;
            }
            rule.to_css(dest)?;
        }
        Ok(())
    }
}
