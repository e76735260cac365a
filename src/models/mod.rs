use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

pub mod extinf;

pub use extinf::{display_name, ExtinfAttribute, ExtinfLine, EXTINF_PREFIX, GROUP_TITLE};

/// Hand-authored replacement metadata for one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOverride {
    #[serde(default, alias = "tvg-id")]
    pub tvg_id: String,
    #[serde(default, alias = "tvg-name")]
    pub tvg_name: String,
    #[serde(default, alias = "tvg-logo")]
    pub tvg_logo: String,
    /// Title written after the comma; the source channel name when absent
    #[serde(default, alias = "display-name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ChannelOverride {
    pub fn new(tvg_id: &str, tvg_name: &str, tvg_logo: &str, display_name: &str) -> Self {
        Self {
            tvg_id: tvg_id.to_string(),
            tvg_name: tvg_name.to_string(),
            tvg_logo: tvg_logo.to_string(),
            display_name: Some(display_name.to_string()),
        }
    }

    /// Configured display name, or `channel_name` when none is set
    pub fn display_name_or<'a>(&'a self, channel_name: &'a str) -> &'a str {
        self.display_name.as_deref().unwrap_or(channel_name)
    }
}

/// Overrides keyed by lowercased channel display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: HashMap<String, ChannelOverride>,
}

impl OverrideTable {
    /// Build the table; keys are lowercased
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ChannelOverride)>,
        K: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, data)| (name.as_ref().to_lowercase(), data))
                .collect(),
        }
    }

    /// Case-insensitive lookup
    pub fn get(&self, channel_name: &str) -> Option<&ChannelOverride> {
        self.entries.get(&channel_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Group name to member channel display names, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    groups: Vec<(String, Vec<String>)>,
}

impl GroupTable {
    pub fn new<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut table = Self::default();
        for (group, channels) in groups {
            table.insert(group, channels);
        }
        table
    }

    /// Add a group. A repeated group name replaces the earlier member list but
    /// keeps its position.
    pub fn insert(&mut self, group: String, channels: Vec<String>) {
        match self.groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, existing)) => *existing = channels,
            None => self.groups.push((group, channels)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(group, channels)| (group.as_str(), channels.as_slice()))
    }

    /// Build the inverse index. Groups are visited in document order, so a
    /// channel listed in several groups ends up in the last one.
    pub fn allowed_channels(&self) -> AllowedChannels {
        let mut by_name: HashMap<String, String> = HashMap::new();
        for (group, channels) in &self.groups {
            for channel in channels {
                let key = channel.to_lowercase();
                if let Some(previous) = by_name.insert(key, group.clone()) {
                    if previous != *group {
                        warn!(
                            "Channel '{}' listed in groups '{}' and '{}', using '{}'",
                            channel, previous, group, group
                        );
                    }
                }
            }
        }
        AllowedChannels { by_name }
    }
}

impl Serialize for GroupTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (group, channels) in &self.groups {
            map.serialize_entry(group, channels)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GroupTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GroupTableVisitor;

        impl<'de> Visitor<'de> for GroupTableVisitor {
            type Value = GroupTable;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of group name to an array of channel names")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = GroupTable::default();
                while let Some((group, channels)) = access.next_entry::<String, Vec<String>>()? {
                    table.insert(group, channels);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(GroupTableVisitor)
    }
}

/// Lowercased channel display name to group name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedChannels {
    by_name: HashMap<String, String>,
}

impl AllowedChannels {
    /// Case-insensitive lookup of the group a channel belongs to
    pub fn group_for(&self, channel_name: &str) -> Option<&str> {
        self.by_name
            .get(&channel_name.to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Verbatim metadata/url line pair taken from the source playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry<'a> {
    pub metadata_line: &'a str,
    pub url_line: &'a str,
    /// 1-based line number of the metadata line
    pub line_number: usize,
}

impl<'a> RawEntry<'a> {
    pub fn display_name(&self) -> Option<&'a str> {
        display_name(self.metadata_line)
    }
}

/// Which rewrite was applied to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewritePath {
    Override,
    Fallback,
}

/// Canonical output form of a matched entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenEntry {
    pub metadata_line: String,
    pub url_line: String,
    pub path: RewritePath,
}

impl fmt::Display for RewrittenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.metadata_line, self.url_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(pairs: &[(&str, &[&str])]) -> GroupTable {
        GroupTable::new(
            pairs
                .iter()
                .map(|(group, names)| {
                    (
                        group.to_string(),
                        names.iter().map(|name| name.to_string()).collect(),
                    )
                })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_allowed_channels_is_case_insensitive() {
        let table = groups(&[("Entertainment", &["Sony Max", "SET HD"])]);
        let allowed = table.allowed_channels();

        assert_eq!(allowed.len(), 2);
        assert_eq!(allowed.group_for("sony max"), Some("Entertainment"));
        assert_eq!(allowed.group_for("SONY MAX"), Some("Entertainment"));
        assert_eq!(allowed.group_for("set hd"), Some("Entertainment"));
        assert_eq!(allowed.group_for("Star Plus"), None);
    }

    #[test]
    fn test_duplicate_channel_goes_to_last_group_in_document() {
        let table = groups(&[("Movies", &["Sony Max"]), ("Entertainment", &["sony max"])]);
        let allowed = table.allowed_channels();

        assert_eq!(allowed.len(), 1);
        assert_eq!(allowed.group_for("Sony Max"), Some("Entertainment"));
    }

    #[test]
    fn test_group_table_keeps_document_order() {
        let table: GroupTable =
            serde_json::from_str(r#"{"Zee": ["Zee TV"], "Alpha": ["Star Plus"], "Movies": []}"#)
                .unwrap();

        let names: Vec<_> = table.iter().map(|(group, _)| group).collect();
        assert_eq!(names, vec!["Zee", "Alpha", "Movies"]);
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"{"Zee":["Zee TV"],"Alpha":["Star Plus"],"Movies":[]}"#
        );
    }

    #[test]
    fn test_repeated_group_replaces_members_in_place() {
        let mut table = groups(&[("Kids", &["Sony Yay"]), ("Movies", &["Sony Max"])]);
        table.insert("Kids".to_string(), vec!["Pogo".to_string()]);

        assert_eq!(table.len(), 2);
        let allowed = table.allowed_channels();
        assert_eq!(allowed.group_for("pogo"), Some("Kids"));
        assert_eq!(allowed.group_for("sony yay"), None);
        assert_eq!(table.iter().next().map(|(group, _)| group), Some("Kids"));
    }

    #[test]
    fn test_override_table_lowercases_keys() {
        let table = OverrideTable::from_entries([(
            "Sony PAL",
            ChannelOverride::new("", "Sony Pal", "http://logo", "Sony Pal"),
        )]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("sony pal").unwrap().tvg_name, "Sony Pal");
        assert_eq!(table.get("SONY PAL").unwrap().display_name_or("x"), "Sony Pal");
        assert!(table.get("sony max").is_none());
    }

    #[test]
    fn test_channel_override_accepts_hyphenated_keys() {
        let json = r#"{"tvg-id": "sonyhd.in", "tvg-name": "Sony TV HD", "tvg-logo": "", "display-name": "SET HD"}"#;
        let parsed: ChannelOverride = serde_json::from_str(json).unwrap();

        assert_eq!(parsed, ChannelOverride::new("sonyhd.in", "Sony TV HD", "", "SET HD"));
    }

    #[test]
    fn test_channel_override_display_name_is_optional() {
        let parsed: ChannelOverride = serde_json::from_str(r#"{"tvg-name": "Zee"}"#).unwrap();

        assert_eq!(parsed.display_name, None);
        assert_eq!(parsed.tvg_id, "");
        assert_eq!(parsed.display_name_or("Zee TV"), "Zee TV");
    }

    #[test]
    fn test_raw_entry_display_name() {
        let entry = RawEntry {
            metadata_line: r#"#EXTINF:-1 group-title="Old", Sony Sab HD "#,
            url_line: "http://example.com/sab.m3u8",
            line_number: 3,
        };
        assert_eq!(entry.display_name(), Some("Sony Sab HD"));
    }

    #[test]
    fn test_rewritten_entry_display() {
        let entry = RewrittenEntry {
            metadata_line: "#EXTINF:-1,A".to_string(),
            url_line: "http://a".to_string(),
            path: RewritePath::Fallback,
        };
        assert_eq!(entry.to_string(), "#EXTINF:-1,A\nhttp://a");
    }
}
