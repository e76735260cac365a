//! Allow-list classification of parsed entries

use std::fmt;

use crate::models::{AllowedChannels, RawEntry};

/// Entry accepted by the allow-list together with its assigned group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntry<'a> {
    pub entry: RawEntry<'a>,
    /// Trimmed display name as it appears in the source
    pub channel_name: &'a str,
    pub group: String,
}

/// Why an entry was left out of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// Metadata line has no comma, so there is no display name to look up
    MissingDisplayName,
    /// Display name is not in any configured group
    NotAllowListed { name: String },
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDisplayName => f.write_str("no display name"),
            Self::NotAllowListed { name } => write!(f, "'{name}' is not allow-listed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
    Matched(ClassifiedEntry<'a>),
    Unmatched(UnmatchedReason),
}

impl<'a> Classification<'a> {
    pub fn matched(self) -> Option<ClassifiedEntry<'a>> {
        match self {
            Self::Matched(entry) => Some(entry),
            Self::Unmatched(_) => None,
        }
    }
}

/// Looks entries up in the allow-list
pub struct FilterEngine<'c> {
    allowed: &'c AllowedChannels,
}

impl<'c> FilterEngine<'c> {
    pub fn new(allowed: &'c AllowedChannels) -> Self {
        Self { allowed }
    }

    pub fn classify<'a>(&self, entry: RawEntry<'a>) -> Classification<'a> {
        let Some(channel_name) = entry.display_name() else {
            return Classification::Unmatched(UnmatchedReason::MissingDisplayName);
        };

        match self.allowed.group_for(channel_name) {
            Some(group) => Classification::Matched(ClassifiedEntry {
                entry,
                channel_name,
                group: group.to_string(),
            }),
            None => Classification::Unmatched(UnmatchedReason::NotAllowListed {
                name: channel_name.to_string(),
            }),
        }
    }
}
