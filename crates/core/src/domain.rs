//! Deployment domain slugs.
//!
//! Every publish is assigned a fresh slug of the form
//! `<adjective>-<noun>-<hex4>`, which doubles as the deployment's subdomain
//! label and its storage namespace.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ADJECTIVES: &[&str] = &[
    "fast", "quick", "bright", "cool", "warm", "fresh", "clean", "smart", "bold", "calm",
    "stupid", "clever", "intelligent", "brilliant", "genius", "insightful", "knowledgeable",
    "learned", "wise",
];

const NOUNS: &[&str] = &[
    "cat", "dog", "bird", "fish", "tree", "star", "moon", "sun", "wave", "fire", "cloud", "rain",
    "wind", "storm",
];

/// Maximum length of a single DNS label.
pub const MAX_LABEL_LEN: usize = 63;

/// A deployment identifier, valid as a single DNS label.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainSlug(String);

impl DomainSlug {
    /// Generate a new slug from the given random source.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
        let noun = NOUNS[rng.random_range(0..NOUNS.len())];
        let mut suffix = [0u8; 2];
        rng.fill(&mut suffix);
        Self(format!("{adjective}-{noun}-{}", hex::encode(suffix)))
    }

    /// Parse a slug from a host label, validating DNS label syntax.
    ///
    /// Accepts 1–63 characters from `[a-z0-9-]`, not starting or ending
    /// with a hyphen. Input is expected to be lowercased already.
    pub fn parse(label: &str) -> crate::Result<Self> {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(crate::Error::InvalidDomain(format!(
                "label must be 1-{MAX_LABEL_LEN} characters, got {}",
                label.len()
            )));
        }
        if let Some(c) = label
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '-'))
        {
            return Err(crate::Error::InvalidDomain(format!(
                "invalid character in label: {c:?}"
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::InvalidDomain(
                "label cannot start or end with '-'".to_string(),
            ));
        }
        Ok(Self(label.to_string()))
    }

    /// Get the slug string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public URL of the deployment under the given origin.
    pub fn url(&self, origin: &str) -> String {
        format!("https://{}.{}", self.0, origin)
    }
}

impl TryFrom<String> for DomainSlug {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(&value)
    }
}

impl From<DomainSlug> for String {
    fn from(slug: DomainSlug) -> Self {
        slug.0
    }
}

impl fmt::Debug for DomainSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainSlug({self})")
    }
}

impl fmt::Display for DomainSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh deployment slugs.
///
/// The server holds one of these so tests can substitute a deterministic
/// sequence for the thread-local RNG.
pub trait SlugSource: Send + Sync + 'static {
    /// Produce the next candidate slug.
    fn next_slug(&self) -> DomainSlug;
}

/// Slug source backed by the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomSlugs;

impl SlugSource for RandomSlugs {
    fn next_slug(&self) -> DomainSlug {
        DomainSlug::generate(&mut rand::rng())
    }
}
