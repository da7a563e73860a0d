/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Ancestor identifier hashes, used to reject a selector quickly with an
//! ancestor bloom filter before matching it.

use crate::Atom;
use crate::parser::{Component, Match, Relation, Selector};

// The top 8 bits of the 32-bit hash value are not used by the bloom filter.
// Consumers may rely on this to pack hashes more efficiently.
pub const BLOOM_HASH_MASK: u32 = 0x00ffffff;

/// The number of ancestor hashes recorded per selector. Unused slots are 0.
pub const MAX_IDENTIFIER_HASHES: usize = 4;

const ID_ATTRIBUTE_SALT: u32 = 13;
const CLASS_ATTRIBUTE_SALT: u32 = 19;
const TAG_NAME_SALT: u32 = 7;

#[inline]
fn salted_hash(name: &Atom, salt: u32) -> Option<u32> {
    if name.is_empty() {
        return None;
    }
    let hash = fxhash::hash32::<str>(name).wrapping_mul(salt) & BLOOM_HASH_MASK;
    if hash == 0 { None } else { Some(hash) }
}

/// The hash an ancestor filter would hold for the id, class or named type
/// tested by `component`.
pub fn identifier_hash(component: &Component) -> Option<u32> {
    match component.match_kind() {
        Match::Id => salted_hash(component.value()?, ID_ATTRIBUTE_SALT),
        Match::Class => salted_hash(component.value()?, CLASS_ATTRIBUTE_SALT),
        Match::Tag => {
            let name = component.tag_q_name()?;
            if name.is_universal() {
                return None;
            }
            salted_hash(&name.local_name, TAG_NAME_SALT)
        },
        _ => None,
    }
}

/// Collects up to `MAX_IDENTIFIER_HASHES` hashes of identifiers that any
/// matching element's ancestors must carry.
///
/// The subject compound is skipped, as are compounds reached through a
/// sibling or shadow relation, since those test non-ancestors.
pub fn collect_identifier_hashes(selector: &Selector) -> [u32; MAX_IDENTIFIER_HASHES] {
    let mut hashes = [0; MAX_IDENTIFIER_HASHES];
    let Some((first, rest)) = selector.components().split_first() else {
        return hashes;
    };

    let mut count = 0;
    let mut relation = first.relation();
    let mut skip_over_subselectors = true;
    for component in rest {
        let collect = match relation {
            Relation::SubSelector => !skip_over_subselectors,
            Relation::Descendant | Relation::Child => {
                skip_over_subselectors = false;
                true
            },
            Relation::DirectAdjacent |
            Relation::IndirectAdjacent |
            Relation::ShadowPseudo |
            Relation::ShadowDeep |
            Relation::ShadowContent => {
                skip_over_subselectors = true;
                false
            },
        };
        if collect {
            if let Some(hash) = identifier_hash(component) {
                hashes[count] = hash;
                count += 1;
                if count == MAX_IDENTIFIER_HASHES {
                    break;
                }
            }
        }
        relation = component.relation();
    }
    hashes
}
