//! Content-hash based identifier generation.
//!
//! Ids look like `{prefix}-{tag}-{hash}` where the tag encodes the entity
//! kind (`p`, `l`, or `t`) and the hash is a short base36 digest of the
//! entity's seed text. Hash length grows with store size to keep collisions
//! rare; a bounded nonce retry handles the collisions that still occur.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const SHORT_HASH_LENGTH: usize = 4;
const MEDIUM_HASH_LENGTH: usize = 6;
const LONG_HASH_LENGTH: usize = 8;

const SMALL_STORE_THRESHOLD: usize = 1_000;
const LARGE_STORE_THRESHOLD: usize = 100_000;

const MAX_NONCE: u32 = 100;

/// Which kind of entity an id names; determines the tag segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A project (`p` tag).
    Project,
    /// A task list (`l` tag).
    TaskList,
    /// A task (`t` tag).
    Task,
}

impl EntityKind {
    /// The single-character tag embedded in generated ids.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::Project => "p",
            EntityKind::TaskList => "l",
            EntityKind::Task => "t",
        }
    }
}

/// Generates unique ids and remembers every id it has seen.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    existing: HashSet<String>,
}

impl IdGenerator {
    /// A generator stamping ids with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            existing: HashSet::new(),
        }
    }

    /// The workspace prefix this generator stamps.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of ids known to this generator.
    #[must_use]
    pub fn known_ids(&self) -> usize {
        self.existing.len()
    }

    /// Records an id loaded from storage so it is never handed out again.
    pub fn register(&mut self, id: impl Into<String>) {
        self.existing.insert(id.into());
    }

    /// Produces a fresh id for `kind`, seeded from `seed` (typically the
    /// entity title). The id is registered before being returned.
    pub fn generate(&mut self, kind: EntityKind, seed: &str) -> Result<String> {
        let hash_length = self.adaptive_hash_length();
        for nonce in 0..MAX_NONCE {
            let digest = Sha256::digest(format!("{}:{seed}:{nonce}", kind.tag()));
            let short = encode_base36(&digest, hash_length);
            let candidate = format!("{}-{}-{short}", self.prefix, kind.tag());
            if !self.existing.contains(&candidate) {
                self.existing.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(Error::Storage(format!(
            "id generation exhausted {MAX_NONCE} nonces for seed '{seed}'"
        )))
    }

    fn adaptive_hash_length(&self) -> usize {
        match self.existing.len() {
            n if n < SMALL_STORE_THRESHOLD => SHORT_HASH_LENGTH,
            n if n < LARGE_STORE_THRESHOLD => MEDIUM_HASH_LENGTH,
            _ => LONG_HASH_LENGTH,
        }
    }
}

fn encode_base36(digest: &[u8], length: usize) -> String {
    digest
        .iter()
        .take(length)
        .map(|b| char::from(BASE36_ALPHABET[usize::from(*b) % BASE36_ALPHABET.len()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_tag() {
        let mut generator = IdGenerator::new("demo");
        let id = generator.generate(EntityKind::Task, "write the parser").unwrap();
        assert!(id.starts_with("demo-t-"));
        let hash = id.strip_prefix("demo-t-").unwrap();
        assert_eq!(hash.len(), SHORT_HASH_LENGTH);
        assert!(hash.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn same_seed_twice_yields_distinct_ids() {
        let mut generator = IdGenerator::new("demo");
        let first = generator.generate(EntityKind::Task, "same title").unwrap();
        let second = generator.generate(EntityKind::Task, "same title").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn entity_kinds_use_distinct_tags() {
        let mut generator = IdGenerator::new("demo");
        let p = generator.generate(EntityKind::Project, "alpha").unwrap();
        let l = generator.generate(EntityKind::TaskList, "alpha").unwrap();
        let t = generator.generate(EntityKind::Task, "alpha").unwrap();
        assert!(p.contains("-p-"));
        assert!(l.contains("-l-"));
        assert!(t.contains("-t-"));
    }

    #[test]
    fn registered_ids_are_never_reissued() {
        let mut generator = IdGenerator::new("demo");
        let taken = generator.generate(EntityKind::Task, "seed").unwrap();
        let mut fresh = IdGenerator::new("demo");
        fresh.register(taken.clone());
        let next = fresh.generate(EntityKind::Task, "seed").unwrap();
        assert_ne!(taken, next);
    }

    #[test]
    fn hash_length_grows_with_store_size() {
        let mut generator = IdGenerator::new("demo");
        for i in 0..SMALL_STORE_THRESHOLD {
            generator.register(format!("demo-t-seed{i}"));
        }
        let id = generator.generate(EntityKind::Task, "after threshold").unwrap();
        let hash = id.strip_prefix("demo-t-").unwrap();
        assert_eq!(hash.len(), MEDIUM_HASH_LENGTH);
    }
}
