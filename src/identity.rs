// 🪪 Identity - Natural ids first, stable synthetic ids second
//
// A row keeps whatever id the store gave it. Rows without one get an id
// derived from their own content, so normalizing the same row twice
// always yields the same id.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::resolve;
use crate::value::RawRecord;

/// Id-like keys shared by every table, appended after entity-specific keys
pub const COMMON_ID_KEYS: &[&str] = &["id", "uuid", "_id", "record_id", "external_id"];

const SLUG_MAX_LEN: usize = 32;

/// Resolve an entity id.
///
/// `keys` are tried first (entity-specific names like `invoice_id`), then
/// [`COMMON_ID_KEYS`]. Without any, a synthetic id is built from `prefix`,
/// the slug of `label` and a content hash of the row.
pub fn entity_id(record: &RawRecord, keys: &[&str], prefix: &str, label: &str) -> String {
    resolve::string(record, keys)
        .or_else(|| resolve::string(record, COMMON_ID_KEYS))
        .unwrap_or_else(|| synthetic_id(record, prefix, label))
}

/// `<prefix>-<slug>-<hash8>`; the slug segment is dropped when empty
pub fn synthetic_id(record: &RawRecord, prefix: &str, label: &str) -> String {
    let hash = content_hash(record, prefix);
    let slug = slugify(label);

    if slug.is_empty() {
        format!("{}-{}", prefix, &hash[..8])
    } else {
        format!("{}-{}-{}", prefix, slug, &hash[..8])
    }
}

/// SHA-256 over the prefix and the key-sorted serialization of the row
pub fn content_hash(record: &RawRecord, prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(record.canonical_json().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Lower-case ASCII slug: "Maya's Poodle!" -> "maya-s-poodle"
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;

    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }

        if slug.len() >= SLUG_MAX_LEN {
            break;
        }
    }

    slug
}

/// Make ids unique within a collection, in order.
///
/// The first occurrence keeps its id; repeats get `-2`, `-3`, ... skipping
/// any suffix that is already taken.
pub fn make_unique<'a>(ids: impl IntoIterator<Item = &'a mut String>) {
    let mut used: HashSet<String> = HashSet::new();

    for id in ids {
        if used.insert(id.clone()) {
            continue;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", id, n);
            if used.insert(candidate.clone()) {
                *id = candidate;
                break;
            }
            n += 1;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
