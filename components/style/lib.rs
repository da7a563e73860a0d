/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Rule indexing and style invalidation.
//!
//! Style rules are compiled into a [`RuleSet`](rule_set::RuleSet), which files
//! every selector under its most selective key so matching only has to look
//! at a few candidates per element. While doing so it builds a
//! [`RuleFeatureSet`](invalidation::RuleFeatureSet), which maps each class name
//! to the descendants a change of that class may affect. The
//! [`StyleInvalidator`](invalidation::StyleInvalidator) uses those sets to turn
//! class-attribute mutations into the minimal set of style recalcs.

#![deny(unsafe_code)]

#[macro_use]
extern crate log;

pub mod data;
pub mod dom;
pub mod invalidation;
pub mod media_queries;
pub mod rule_set;
pub mod selector_map;
pub mod stylesheets;

pub use selectors::Atom;
