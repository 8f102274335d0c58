use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Error returned when an identifier is not of the form `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid repository identifier '{0}': expected 'owner/name'")]
pub struct InvalidRepositoryId(pub String);

/// A tracked GitHub repository, identified by `owner/name`
///
/// Immutable once parsed. Both segments are non-empty and contain no `/`
/// or whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetRepository {
    owner: String,
    name: String,
}

impl TargetRepository {
    /// Build a repository from its two segments
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, InvalidRepositoryId> {
        let owner = owner.into();
        let name = name.into();
        if !is_valid_segment(&owner) || !is_valid_segment(&name) {
            return Err(InvalidRepositoryId(format!("{owner}/{name}")));
        }
        Ok(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `owner/name` form used in snapshots and logs
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    fn lookup_key(owner: &str, name: &str) -> String {
        format!("{}/{}", owner.to_ascii_lowercase(), name.to_ascii_lowercase())
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('/') && !segment.chars().any(char::is_whitespace)
}

impl FromStr for TargetRepository {
    type Err = InvalidRepositoryId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name)) => Self::new(owner, name).map_err(|_| InvalidRepositoryId(s.to_string())),
            None => Err(InvalidRepositoryId(s.to_string())),
        }
    }
}

impl fmt::Display for TargetRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Serialize for TargetRepository {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetRepository {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The fixed, ordered set of repositories visited by one run
///
/// Registry order is the visiting order. Duplicate identifiers (compared
/// case-insensitively, as GitHub does) keep their first occurrence.
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    repositories: Vec<TargetRepository>,
    index: HashMap<String, usize>,
}

impl RepositoryRegistry {
    pub fn new(repositories: impl IntoIterator<Item = TargetRepository>) -> Self {
        let mut registry = Self::default();
        for repository in repositories {
            let key = TargetRepository::lookup_key(&repository.owner, &repository.name);
            if registry.index.contains_key(&key) {
                tracing::warn!(repository = %repository, "duplicate repository in registry, ignoring");
                continue;
            }
            registry.index.insert(key, registry.repositories.len());
            registry.repositories.push(repository);
        }
        registry
    }

    /// Parse a list of `owner/name` identifiers
    pub fn parse<S: AsRef<str>>(identifiers: &[S]) -> Result<Self, InvalidRepositoryId> {
        let repositories = identifiers
            .iter()
            .map(|id| id.as_ref().parse())
            .collect::<Result<Vec<TargetRepository>, _>>()?;
        Ok(Self::new(repositories))
    }

    /// Find the registered repository matching `owner/name`
    ///
    /// Returns the registry's own spelling so callers always emit an
    /// identifier that is an exact member of the registry.
    pub fn lookup(&self, owner: &str, name: &str) -> Option<&TargetRepository> {
        self.index
            .get(&TargetRepository::lookup_key(owner, name))
            .map(|&i| &self.repositories[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetRepository> {
        self.repositories.iter()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
