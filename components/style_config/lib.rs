/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Process-wide runtime preferences for the style engine.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;

/// Restrict class-change invalidation to what the invalidation sets name.
/// When off, every class change restyles the element's whole subtree.
pub const TARGETED_STYLE_RECALC: &str = "layout.css.targeted-style-recalc.enabled";

/// Walk shadow roots during style invalidation.
pub const SHADOW_DOM: &str = "layout.css.shadow-dom.enabled";

lazy_static! {
    static ref PREFS: Preferences = Preferences::with_defaults();
}

#[derive(Debug, Default)]
pub struct Preferences {
    bool_prefs: RwLock<HashMap<String, bool>>,
}

impl Preferences {
    /// A preference store seeded with the engine's defaults.
    pub fn with_defaults() -> Self {
        let prefs = Self::default();
        prefs.set_bool(TARGETED_STYLE_RECALC, true);
        prefs.set_bool(SHADOW_DOM, true);
        prefs
    }

    /// Unknown preferences read as false.
    pub fn get_bool(&self, key: &str) -> bool {
        let prefs = self.bool_prefs.read().unwrap_or_else(PoisonError::into_inner);
        *prefs.get(key).unwrap_or(&false)
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        let mut prefs = self.bool_prefs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(pref) = prefs.get_mut(key) {
            *pref = value;
        } else {
            prefs.insert(key.to_owned(), value);
        }
    }
}

pub fn get_bool(key: &str) -> bool {
    PREFS.get_bool(key)
}

pub fn set_bool(key: &str, value: bool) {
    PREFS.set_bool(key, value)
}
