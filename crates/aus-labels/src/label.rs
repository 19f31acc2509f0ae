//! Labels and the entities they are attached to

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::key::LabelKey;

/// Entity a label is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelScope {
    /// Organization by id
    Organization(String),
    /// Subscription (one per cluster) by id
    Subscription(String),
}

impl LabelScope {
    /// Entity id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Organization(id) | Self::Subscription(id) => id,
        }
    }

    /// Entity kind as used in log lines
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Organization(_) => "organization",
            Self::Subscription(_) => "subscription",
        }
    }
}

impl Display for LabelScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// A key/value label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Full key
    pub key: String,
    /// Raw value
    pub value: String,
}

impl Label {
    /// Create label
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create label for a typed key
    #[inline]
    #[must_use]
    pub fn from_key(key: &LabelKey, value: impl Into<String>) -> Self {
        Self::new(key.key(), value)
    }

    /// Parsed key, `None` for keys this tool does not know
    #[must_use]
    pub fn typed_key(&self) -> Option<LabelKey> {
        LabelKey::parse(&self.key).ok()
    }
}
