/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Different bits of code related to invalidating style.

pub mod invalidation_set;
pub mod invalidator;
pub mod rule_feature;

pub use self::invalidation_set::DescendantInvalidationSet;
pub use self::invalidator::StyleInvalidator;
pub use self::rule_feature::{FeatureMetadata, InvalidationSetMode, RuleFeature, RuleFeatureSet};
