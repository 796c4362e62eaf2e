//! Unique, human-readable identifiers for scene objects.
//!
//! Identifiers exist for logging and debugging only — rendering never
//! depends on them. Each kind of object (entity, material, texture, …) owns
//! a process-wide namespace; claiming a slug that is already taken bumps a
//! numeric `_k` suffix until a free one is found, and dropping an identifier
//! releases its slug again.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Mutex, OnceLock};

// ─── Registry ───────────────────────────────────────────────────────────────

/// Global registry of claimed slugs, keyed by namespace. Mutated only while
/// scenes are being assembled, never during rendering.
fn registry() -> &'static Mutex<HashSet<(&'static str, String)>> {
    static REGISTRY: OnceLock<Mutex<HashSet<(&'static str, String)>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashSet::new()))
}

fn claim(kind: &'static str, slug: &str) -> bool {
    registry()
        .lock()
        .expect("identifier registry poisoned")
        .insert((kind, slug.to_owned()))
}

fn release(kind: &'static str, slug: &str) {
    registry()
        .lock()
        .expect("identifier registry poisoned")
        .remove(&(kind, slug.to_owned()));
}

/// Bumps a slug to its next variant: `name` → `name_2` → `name_3` → …
fn set_to_next(slug: &mut String) {
    if let Some(pos) = slug.rfind('_') {
        let suffix = &slug[pos + 1..];
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = suffix.parse::<u64>() {
                slug.truncate(pos + 1);
                slug.push_str(&(number + 1).to_string());
                return;
            }
        }
    }
    slug.push_str("_2");
}

fn claim_next_free(kind: &'static str, mut slug: String) -> String {
    while !claim(kind, &slug) {
        set_to_next(&mut slug);
    }
    slug
}

// ─── Identifier Kinds ───────────────────────────────────────────────────────

/// Namespace marker for [`Identifier`]. Each kind provides the namespace key
/// and the default slug stem.
pub trait IdentifierKind {
    const KIND: &'static str;
}

macro_rules! identifier_kinds {
    ($($name:ident => $kind:literal),+ $(,)?) => {
        $(
            #[derive(Debug)]
            pub struct $name;

            impl IdentifierKind for $name {
                const KIND: &'static str = $kind;
            }
        )+
    };
}

identifier_kinds! {
    EntityKind => "entity",
    MaterialKind => "material",
    TextureKind => "texture",
    BackgroundKind => "background",
}

// ─── Identifier ─────────────────────────────────────────────────────────────

/// A string slug uniquely owned within its kind's namespace for as long as
/// the identifier lives.
#[derive(Debug)]
pub struct Identifier<K: IdentifierKind> {
    value: String,
    _kind: PhantomData<fn() -> K>,
}

pub type EntityId = Identifier<EntityKind>;
pub type MaterialId = Identifier<MaterialKind>;
pub type TextureId = Identifier<TextureKind>;
pub type BackgroundId = Identifier<BackgroundKind>;

impl<K: IdentifierKind> Identifier<K> {
    /// Valid slugs are non-empty and contain only alphanumerics and
    /// underscores.
    pub fn valid(slug: &str) -> bool {
        !slug.is_empty() && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Claims exactly `slug`, or `None` if it is invalid or already taken.
    pub fn make_if_available(slug: &str) -> Option<Self> {
        if !Self::valid(slug) || !claim(K::KIND, slug) {
            return None;
        }
        Some(Self {
            value: slug.to_owned(),
            _kind: PhantomData,
        })
    }

    /// Claims `slug` or the next free `_k` variant of it. Invalid slugs fall
    /// back to the kind's default stem.
    pub fn make_always(slug: &str) -> Self {
        let stem = if Self::valid(slug) {
            slug.to_owned()
        } else {
            K::KIND.to_owned()
        };
        Self {
            value: claim_next_free(K::KIND, stem),
            _kind: PhantomData,
        }
    }

    /// Renames to `slug` (or its next free variant), releasing the old slug.
    pub fn change(&mut self, slug: &str) {
        let next = Self::make_always(slug);
        *self = next;
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<K: IdentifierKind> Default for Identifier<K> {
    fn default() -> Self {
        Self {
            value: claim_next_free(K::KIND, K::KIND.to_owned()),
            _kind: PhantomData,
        }
    }
}

/// Cloning claims a fresh unique slug derived from the original; two live
/// identifiers never share a slug.
impl<K: IdentifierKind> Clone for Identifier<K> {
    fn clone(&self) -> Self {
        Self {
            value: claim_next_free(K::KIND, self.value.clone()),
            _kind: PhantomData,
        }
    }
}

impl<K: IdentifierKind> Drop for Identifier<K> {
    fn drop(&mut self) {
        release(K::KIND, &self.value);
    }
}

impl<K: IdentifierKind> fmt::Display for Identifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K: IdentifierKind> PartialEq<str> for Identifier<K> {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl<K: IdentifierKind> PartialEq<&str> for Identifier<K> {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // note: all tests share one process-wide registry, so each test uses
    // slugs unique to itself

    #[test]
    fn collisions_bump_the_suffix() {
        let a = EntityId::make_always("bump_probe");
        let b = EntityId::make_always("bump_probe");
        let c = EntityId::make_always("bump_probe");
        assert_eq!(a, "bump_probe");
        assert_eq!(b, "bump_probe_2");
        assert_eq!(c, "bump_probe_3");
    }

    #[test]
    fn slugs_are_released_on_drop() {
        {
            let _a = EntityId::make_always("drop_probe");
            assert!(EntityId::make_if_available("drop_probe").is_none());
        }
        let b = EntityId::make_if_available("drop_probe");
        assert!(b.is_some());
    }

    #[test]
    fn kinds_are_separate_namespaces() {
        let _e = EntityId::make_always("namespace_probe");
        let m = MaterialId::make_if_available("namespace_probe");
        assert!(m.is_some());
    }

    #[test]
    fn clone_claims_a_fresh_slug() {
        let a = EntityId::make_always("clone_probe");
        let b = a.clone();
        assert_eq!(a, "clone_probe");
        assert_eq!(b, "clone_probe_2");
    }

    #[test]
    fn invalid_slugs_fall_back_to_default_stem() {
        assert!(!EntityId::valid(""));
        assert!(!EntityId::valid("white space"));
        assert!(!EntityId::valid("quo\"te"));
        let id = EntityId::make_always("not valid!");
        assert!(id.as_str().starts_with("entity"));
    }

    #[test]
    fn many_freeze_cycles_do_not_leak() {
        for _ in 0..1000 {
            let id = EntityId::make_always("cycle_probe");
            assert_eq!(id, "cycle_probe");
        }
    }
}
