/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::Atom;
use cssparser::{ToCss, serialize_identifier};
use std::fmt;

/// The XHTML namespace, which HTML elements live in.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Whether an attribute value comparison honors case.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CaseSensitivity {
    CaseSensitive,
    AsciiCaseInsensitive,
}

/// The namespace a type or attribute selector is restricted to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum NamespaceConstraint {
    /// `*|name`, or no prefix and no default namespace.
    Any,
    /// `ns|name`, or a default namespace declared by the sheet.
    Specific { prefix: Option<Atom>, url: Atom },
}

impl NamespaceConstraint {
    /// Whether elements from the HTML namespace can match this constraint.
    pub fn admits_html(&self) -> bool {
        match *self {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Specific { ref url, .. } => &**url == XHTML_NAMESPACE,
        }
    }
}

/// A namespace-qualified name, as used by type and attribute selectors.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QualName {
    pub namespace: NamespaceConstraint,
    pub local_name: Atom,
}

impl QualName {
    /// A name in any namespace.
    pub fn new(local_name: &str) -> Self {
        QualName {
            namespace: NamespaceConstraint::Any,
            local_name: Atom::from(local_name),
        }
    }

    /// The universal type selector, `*`.
    pub fn any_name() -> Self {
        Self::new("*")
    }

    /// Whether the local name is the `*` wildcard.
    #[inline]
    pub fn is_universal(&self) -> bool {
        &*self.local_name == "*"
    }
}

impl ToCss for QualName {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        if let NamespaceConstraint::Specific { ref prefix, .. } = self.namespace {
            if let Some(ref prefix) = *prefix {
                serialize_identifier(prefix, dest)?;
            }
            dest.write_char('|')?;
        }
        if self.is_universal() {
            dest.write_char('*')
        } else {
            serialize_identifier(&self.local_name, dest)
        }
    }
}
