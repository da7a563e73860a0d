/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! [Media queries][mq].
//!
//! [mq]: https://drafts.csswg.org/mediaqueries/

use crate::Atom;
use cssparser::{Delimiter, ParseError, Parser, Token, ToCss};
use std::fmt;

/// A type that encapsulates a media query list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaList {
    /// The list of media queries.
    pub media_queries: Vec<MediaQuery>,
}

impl ToCss for MediaList {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for (i, query) in self.media_queries.iter().enumerate() {
            if i != 0 {
                dest.write_str(", ")?;
            }
            query.to_css(dest)?;
        }
        Ok(())
    }
}

impl MediaList {
    /// A list holding a single query.
    pub fn single(query: MediaQuery) -> Self {
        MediaList {
            media_queries: vec![query],
        }
    }

    /// Whether this `MediaList` contains no media queries.
    pub fn is_empty(&self) -> bool {
        self.media_queries.is_empty()
    }
}

/// https://drafts.csswg.org/mediaqueries/#mq-prefix
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Qualifier {
    /// Hide a media query from legacy UAs:
    /// https://drafts.csswg.org/mediaqueries/#mq-only
    Only,
    /// Negate a media query:
    /// https://drafts.csswg.org/mediaqueries/#mq-not
    Not,
}

impl ToCss for Qualifier {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            Qualifier::Not => "not",
            Qualifier::Only => "only",
        })
    }
}

/// A [media query][mq].
///
/// [mq]: https://drafts.csswg.org/mediaqueries/
#[derive(Clone, Debug, PartialEq)]
pub struct MediaQuery {
    /// The qualifier for this query.
    pub qualifier: Option<Qualifier>,
    /// The media type for this query, that can be known, unknown, or "all".
    pub media_type: MediaQueryType,
    /// The set of expressions that this media query contains.
    pub expressions: Vec<MediaExpression>,
}

impl MediaQuery {
    /// Return a media query that never matches, used for when we fail to parse
    /// a given media query.
    fn never_matching() -> Self {
        Self::new(Some(Qualifier::Not), MediaQueryType::All, vec![])
    }

    /// Trivially constructs a new media query.
    pub fn new(
        qualifier: Option<Qualifier>,
        media_type: MediaQueryType,
        expressions: Vec<MediaExpression>,
    ) -> MediaQuery {
        MediaQuery {
            qualifier,
            media_type,
            expressions,
        }
    }

    /// Parse a media query given css input.
    pub fn parse<'i, 't>(input: &mut Parser<'i, 't>) -> Result<MediaQuery, ParseError<'i, ()>> {
        let mut expressions = vec![];

        let qualifier = if input
            .try_parse(|input| input.expect_ident_matching("only"))
            .is_ok()
        {
            Some(Qualifier::Only)
        } else if input
            .try_parse(|input| input.expect_ident_matching("not"))
            .is_ok()
        {
            Some(Qualifier::Not)
        } else {
            None
        };

        let media_type = match input.try_parse(|input| input.expect_ident().cloned()) {
            Ok(ident) => MediaQueryType::parse(&ident),
            Err(error) => {
                // Media type is only optional if qualifier is not specified.
                if qualifier.is_some() {
                    return Err(error.into());
                }

                // Without a media type, require at least one expression.
                expressions.push(MediaExpression::parse(input)?);

                MediaQueryType::All
            },
        };

        // Parse any subsequent expressions
        loop {
            if input
                .try_parse(|input| input.expect_ident_matching("and"))
                .is_err()
            {
                return Ok(MediaQuery::new(qualifier, media_type, expressions));
            }
            expressions.push(MediaExpression::parse(input)?)
        }
    }
}

impl ToCss for MediaQuery {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        if let Some(qual) = self.qualifier {
            qual.to_css(dest)?;
            dest.write_char(' ')?;
        }

        match self.media_type {
            MediaQueryType::All => {
                // We need to print "all" if there's a qualifier, or there's
                // just an empty list of expressions.
                //
                // Otherwise, we'd serialize media queries like "(min-width:
                // 40px)" in "all (min-width: 40px)", which is unexpected.
                if self.qualifier.is_some() || self.expressions.is_empty() {
                    dest.write_str("all")?;
                }
            },
            MediaQueryType::Known(MediaType::Screen) => dest.write_str("screen")?,
            MediaQueryType::Known(MediaType::Print) => dest.write_str("print")?,
            MediaQueryType::Unknown(ref desc) => dest.write_str(desc)?,
        }

        let mut expressions = self.expressions.iter();
        let Some(first) = expressions.next() else {
            return Ok(());
        };

        if self.media_type != MediaQueryType::All || self.qualifier.is_some() {
            dest.write_str(" and ")?;
        }

        first.to_css(dest)?;
        for expr in expressions {
            dest.write_str(" and ")?;
            expr.to_css(dest)?;
        }
        Ok(())
    }
}

/// http://dev.w3.org/csswg/mediaqueries-3/#media0
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MediaQueryType {
    /// A media type that matches every device.
    All,
    /// A known media type, that we parse and understand.
    Known(MediaType),
    /// An unknown media type.
    Unknown(Atom),
}

impl MediaQueryType {
    fn parse(ident: &str) -> Self {
        if ident.eq_ignore_ascii_case("all") {
            return MediaQueryType::All;
        }

        match MediaType::parse(ident) {
            Some(media_type) => MediaQueryType::Known(media_type),
            None => MediaQueryType::Unknown(Atom::from(ident)),
        }
    }

    fn matches(&self, other: MediaType) -> bool {
        match *self {
            MediaQueryType::All => true,
            MediaQueryType::Known(known_type) => known_type == other,
            MediaQueryType::Unknown(..) => false,
        }
    }
}

/// https://drafts.csswg.org/mediaqueries/#media-types
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MediaType {
    /// The "screen" media type.
    Screen,
    /// The "print" media type.
    Print,
}

impl MediaType {
    fn parse(name: &str) -> Option<Self> {
        Some(cssparser::match_ignore_ascii_case! { name,
            "screen" => MediaType::Screen,
            "print" => MediaType::Print,
            _ => return None
        })
    }
}

/// A single media feature test, `(feature)` or `(feature: <length>)`.
///
/// Lengths are kept in CSS pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaExpression {
    /// The lowercased feature name, prefix included.
    pub feature: Atom,
    /// The value the feature is compared with.
    pub value: Option<f32>,
}

impl MediaExpression {
    /// A `(feature: <value>px)` expression.
    pub fn new(feature: &str, value: Option<f32>) -> Self {
        MediaExpression {
            feature: Atom::from(feature.to_ascii_lowercase()),
            value,
        }
    }

    /// Parse a media expression of the form:
    ///
    /// ```ignore
    /// (media-feature: media-value)
    /// ```
    pub fn parse<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Self, ParseError<'i, ()>> {
        input.expect_parenthesis_block()?;
        input.parse_nested_block(|input| {
            let feature = Atom::from(input.expect_ident()?.to_ascii_lowercase());
            if input.try_parse(|input| input.expect_colon()).is_err() {
                return Ok(MediaExpression {
                    feature,
                    value: None,
                });
            }
            let location = input.current_source_location();
            let value = match *input.next()? {
                Token::Dimension {
                    value, ref unit, ..
                } if unit.eq_ignore_ascii_case("px") => value,
                Token::Number { value, .. } if value == 0. => value,
                ref t => return Err(location.new_unexpected_token_error(t.clone())),
            };
            Ok(MediaExpression {
                feature,
                value: Some(value),
            })
        })
    }

    /// Whether the result of this expression depends on the viewport size.
    pub fn is_viewport_dependent(&self) -> bool {
        matches!(
            &*self.feature,
            "width" | "min-width" | "max-width" | "height" | "min-height" | "max-height"
        )
    }
}

impl ToCss for MediaExpression {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_char('(')?;
        dest.write_str(&self.feature)?;
        if let Some(value) = self.value {
            write!(dest, ": {}px", value)?;
        }
        dest.write_char(')')
    }
}

/// Parse a media query list from CSS.
///
/// Always returns a media query list. If any invalid media query is found, the
/// media query list is only filled with the equivalent of "not all", see:
///
/// https://drafts.csswg.org/mediaqueries/#error-handling
pub fn parse_media_query_list(input: &mut Parser) -> MediaList {
    if input.is_exhausted() {
        return Default::default();
    }

    let mut media_queries = vec![];
    let mut found_invalid = false;
    loop {
        match input.parse_until_before(Delimiter::Comma, MediaQuery::parse) {
            Ok(mq) => {
                if !found_invalid {
                    media_queries.push(mq);
                }
            },
            Err(..) => {
                if !found_invalid {
                    media_queries.clear();
                    media_queries.push(MediaQuery::never_matching());
                    // Consume the rest of the input as if they were valid
                    // expressions (they might be, they might not), but ignore the
                    // result, this allows correctly parsing invalid media queries.
                    found_invalid = true;
                }
            },
        }

        // parse_until_before stops at the comma or the end of the input.
        if input.next().is_err() {
            break;
        }
    }

    debug_assert!(!found_invalid || media_queries.len() == 1);

    MediaList { media_queries }
}

/// The outcome of a viewport-dependent expression, kept so that a viewport
/// resize can tell whether the rule set must be rebuilt.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaQueryResult {
    /// The expression that was evaluated.
    pub expression: MediaExpression,
    /// What it evaluated to.
    pub result: bool,
}

/// Evaluates media query lists against a medium and, if known, a viewport.
#[derive(Clone, Debug)]
pub struct MediaQueryEvaluator {
    media_type: MediaType,
    viewport_size: Option<(f32, f32)>,
    expected_result: bool,
}

impl MediaQueryEvaluator {
    /// An evaluator for a viewport of `width` by `height` CSS pixels.
    pub fn new(media_type: MediaType, width: f32, height: f32) -> Self {
        MediaQueryEvaluator {
            media_type,
            viewport_size: Some((width, height)),
            expected_result: true,
        }
    }

    /// An evaluator with no viewport, for which every media feature
    /// expression evaluates to `expected_result`.
    pub fn without_viewport(media_type: MediaType, expected_result: bool) -> Self {
        MediaQueryEvaluator {
            media_type,
            viewport_size: None,
            expected_result,
        }
    }

    /// Evaluate a whole `MediaList`, appending the outcome of every
    /// viewport-dependent expression to `results`.
    pub fn evaluate(
        &self,
        media: &MediaList,
        mut results: Option<&mut Vec<MediaQueryResult>>,
    ) -> bool {
        // Check if it is an empty media query list or any queries match (OR condition)
        // https://drafts.csswg.org/mediaqueries-4/#mq-list
        if media.is_empty() {
            return true;
        }

        for mq in &media.media_queries {
            let media_match = mq.media_type.matches(self.media_type);

            // Check if all conditions match (AND condition)
            let mut query_match = media_match;
            if media_match {
                for expression in &mq.expressions {
                    let result = self.evaluate_expression(expression);
                    if expression.is_viewport_dependent() {
                        if let Some(ref mut results) = results {
                            results.push(MediaQueryResult {
                                expression: expression.clone(),
                                result,
                            });
                        }
                    }
                    if !result {
                        query_match = false;
                        break;
                    }
                }
            }

            // Apply the logical NOT qualifier to the result
            let query_match = match mq.qualifier {
                Some(Qualifier::Not) => !query_match,
                _ => query_match,
            };
            if query_match {
                return true;
            }
        }
        false
    }

    fn evaluate_expression(&self, expression: &MediaExpression) -> bool {
        let Some((width, height)) = self.viewport_size else {
            return self.expected_result;
        };

        let (feature, prefix) = match expression.feature.strip_prefix("min-") {
            Some(feature) => (feature, Some(Range::Min)),
            None => match expression.feature.strip_prefix("max-") {
                Some(feature) => (feature, Some(Range::Max)),
                None => (&*expression.feature, None),
            },
        };
        let actual = match feature {
            "width" => width,
            "height" => height,
            _ => {
                trace!("Unknown media feature {:?}", expression.feature);
                return false;
            },
        };
        match (prefix, expression.value) {
            (None, None) => actual > 0.,
            (None, Some(value)) => actual == value,
            (Some(Range::Min), Some(value)) => actual >= value,
            (Some(Range::Max), Some(value)) => actual <= value,
            (Some(_), None) => false,
        }
    }
}

#[derive(Clone, Copy)]
enum Range {
    Min,
    Max,
}
