/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Flattened CSS selectors.
//!
//! A selector list is stored as one contiguous array of simple-selector
//! components. Each chain of that array is stored in matching order: the
//! first component is the rightmost simple selector of the source text, and
//! every component records its relation to the component stored after it.

pub mod attr;
pub mod bloom;
pub mod builder;
pub mod parser;
pub mod pseudo;
mod specificity;

pub use crate::attr::{CaseSensitivity, NamespaceConstraint, QualName};
pub use crate::builder::SelectorBuilder;
pub use crate::parser::{Component, Match, Relation, Selector, SelectorList};
pub use crate::pseudo::PseudoType;

/// The atom type used for every name stored in a selector.
pub type Atom = string_cache::DefaultAtom;
