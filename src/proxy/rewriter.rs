//! Canonical metadata for classified entries
//!
//! Channels with an override get a freshly built metadata line. All others
//! keep their original line with only `group-title` changed.

use tracing::debug;

use crate::models::{
    ChannelOverride, ExtinfLine, OverrideTable, RewritePath, RewrittenEntry, GROUP_TITLE,
};
use crate::proxy::filter_engine::ClassifiedEntry;

/// Duration written on override lines
pub const LIVE_DURATION: &str = "-1";

pub struct RecordRewriter<'c> {
    overrides: &'c OverrideTable,
}

impl<'c> RecordRewriter<'c> {
    pub fn new(overrides: &'c OverrideTable) -> Self {
        Self { overrides }
    }

    pub fn rewrite(&self, classified: &ClassifiedEntry<'_>) -> RewrittenEntry {
        let entry = &classified.entry;
        let (metadata_line, path) = match self.overrides.get(classified.channel_name) {
            Some(data) => (
                override_line(data, classified.channel_name, &classified.group),
                RewritePath::Override,
            ),
            None => (
                regroup_line(entry.metadata_line, &classified.group),
                RewritePath::Fallback,
            ),
        };

        debug!(
            "Rewrote line {}: channel='{}' group='{}' path={:?}",
            entry.line_number, classified.channel_name, classified.group, path
        );

        RewrittenEntry {
            metadata_line,
            url_line: entry.url_line.to_string(),
            path,
        }
    }
}

/// Full replacement line built from override data. Without a configured
/// display name the source `channel_name` is used as the title.
pub fn override_line(data: &ChannelOverride, channel_name: &str, group: &str) -> String {
    ExtinfLine::new(LIVE_DURATION)
        .with_attribute("tvg-id", &data.tvg_id)
        .with_attribute("tvg-name", &data.tvg_name)
        .with_attribute("tvg-logo", &data.tvg_logo)
        .with_attribute(GROUP_TITLE, group)
        .with_title(data.display_name_or(channel_name))
        .to_string()
}

/// Original line with `group-title` set to `group`
pub fn regroup_line(metadata_line: &str, group: &str) -> String {
    match ExtinfLine::parse(metadata_line) {
        Some(line) => line.with_attribute(GROUP_TITLE, group).to_string(),
        None => metadata_line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::builtin_overrides;
    use crate::models::RawEntry;

    fn classified<'a>(metadata_line: &'a str, channel_name: &'a str, group: &str) -> ClassifiedEntry<'a> {
        ClassifiedEntry {
            entry: RawEntry {
                metadata_line,
                url_line: "http://example.com/a.m3u8",
                line_number: 2,
            },
            channel_name,
            group: group.to_string(),
        }
    }

    #[test]
    fn test_override_path_replaces_whole_line() {
        let overrides = builtin_overrides();
        let rewriter = RecordRewriter::new(&overrides);

        let rewritten = rewriter.rewrite(&classified("#EXTINF:-1,Sony Max", "Sony Max", "Entertainment"));

        assert_eq!(rewritten.path, RewritePath::Override);
        assert_eq!(
            rewritten.metadata_line,
            r#"#EXTINF:-1 tvg-id="" tvg-name="Sony MAX" tvg-logo="http://jiotv.catchup.cdn.jio.com/dare_images/images/SET_MAX.png" group-title="Entertainment",Sony MAX"#
        );
        assert_eq!(rewritten.url_line, "http://example.com/a.m3u8");
    }

    #[test]
    fn test_override_path_ignores_source_attributes() {
        let overrides = builtin_overrides();
        let rewriter = RecordRewriter::new(&overrides);
        let line = r#"#EXTINF:0 tvg-id="junk" tvg-chno="5" group-title="Old",SET HD"#;

        let rewritten = rewriter.rewrite(&classified(line, "SET HD", "Hindi"));

        assert_eq!(
            rewritten.metadata_line,
            r#"#EXTINF:-1 tvg-id="sonyhd.in" tvg-name="Sony TV HD" tvg-logo="https://watchindia.net/images/channels/hindi/Sony_TV_HD.png" group-title="Hindi",SET HD"#
        );
    }

    #[test]
    fn test_override_path_is_idempotent() {
        let data = ChannelOverride::new("id", "Name", "", "Display");
        assert_eq!(override_line(&data, "x", "G"), override_line(&data, "x", "G"));
        assert_eq!(
            override_line(&data, "x", "G"),
            r#"#EXTINF:-1 tvg-id="id" tvg-name="Name" tvg-logo="" group-title="G",Display"#
        );
    }

    #[test]
    fn test_fallback_replaces_existing_group_title() {
        let overrides = OverrideTable::default();
        let rewriter = RecordRewriter::new(&overrides);
        let line = r#"#EXTINF:-1 tvg-id="star.in" tvg-logo="http://l/star.png" group-title="Old",Star Gold"#;

        let rewritten = rewriter.rewrite(&classified(line, "Star Gold", "Movies"));

        assert_eq!(rewritten.path, RewritePath::Fallback);
        assert_eq!(
            rewritten.metadata_line,
            r#"#EXTINF:-1 tvg-id="star.in" tvg-logo="http://l/star.png" group-title="Movies",Star Gold"#
        );
    }

    #[test]
    fn test_fallback_injects_group_title() {
        let overrides = OverrideTable::default();
        let rewriter = RecordRewriter::new(&overrides);

        let rewritten = rewriter.rewrite(&classified(
            r#"#EXTINF:-1 tvg-id="x",Zee TV"#,
            "Zee TV",
            "Hindi",
        ));
        assert_eq!(
            rewritten.metadata_line,
            r#"#EXTINF:-1 tvg-id="x" group-title="Hindi",Zee TV"#
        );

        let rewritten = rewriter.rewrite(&classified("#EXTINF:-1,Zee TV", "Zee TV", "Hindi"));
        assert_eq!(rewritten.metadata_line, r#"#EXTINF:-1 group-title="Hindi",Zee TV"#);
    }

    #[test]
    fn test_fallback_keeps_display_name_verbatim() {
        let line = r#"#EXTINF:-1 group-title="Old",  Zee TV  "#;
        assert_eq!(
            regroup_line(line, "Hindi"),
            r#"#EXTINF:-1 group-title="Hindi",  Zee TV  "#
        );
    }

    #[test]
    fn test_fallback_leaves_exactly_one_group_title() {
        let line = r#"#EXTINF:-1 group-title="A" tvg-id="x" group-title="B",Zee TV"#;
        let rewritten = regroup_line(line, "Hindi");

        assert_eq!(rewritten.matches("group-title=").count(), 1);
        assert_eq!(rewritten, r#"#EXTINF:-1 group-title="Hindi" tvg-id="x",Zee TV"#);
    }

    #[test]
    fn test_override_without_display_name_uses_source_name() {
        let overrides = OverrideTable::from_entries([(
            "zee tv",
            ChannelOverride {
                tvg_id: "zee.in".to_string(),
                tvg_name: "Zee TV".to_string(),
                tvg_logo: String::new(),
                display_name: None,
            },
        )]);
        let rewriter = RecordRewriter::new(&overrides);

        let rewritten = rewriter.rewrite(&classified("#EXTINF:-1, zee tv ", "zee tv", "Hindi"));

        assert_eq!(rewritten.path, RewritePath::Override);
        assert_eq!(
            rewritten.metadata_line,
            r#"#EXTINF:-1 tvg-id="zee.in" tvg-name="Zee TV" tvg-logo="" group-title="Hindi",zee tv"#
        );
    }

    #[test]
    fn test_fallback_with_unbalanced_quote_keeps_display_name() {
        let rewritten = regroup_line(r#"#EXTINF:-1 tvg-name="Zee,Zee TV"#, "Hindi");

        assert_eq!(rewritten, r#"#EXTINF:-1 tvg-name="Zee group-title="Hindi",Zee TV"#);
        assert_eq!(crate::models::display_name(&rewritten), Some("Zee TV"));
    }

    mod property_tests {
        use super::*;
        use crate::models::ExtinfAttribute;
        use proptest::prelude::*;

        fn attribute() -> impl Strategy<Value = (String, String)> {
            (
                prop::sample::select(vec!["tvg-id", "tvg-name", "tvg-logo", "tvg-chno", GROUP_TITLE]),
                "[A-Za-z0-9 ,./:_-]{0,12}",
            )
                .prop_map(|(key, value)| (key.to_string(), value))
        }

        fn metadata_line(attributes: &[(String, String)], spacing: &[bool], title: &str) -> String {
            let mut line = String::from("#EXTINF:-1");
            for ((key, value), wide) in attributes.iter().zip(spacing) {
                line.push_str(if *wide { "  " } else { " " });
                line.push_str(&format!("{key}=\"{value}\""));
            }
            line.push(',');
            line.push_str(title);
            line
        }

        fn without_group_title(line: &ExtinfLine) -> Vec<ExtinfAttribute> {
            line.attributes()
                .iter()
                .filter(|attr| attr.key() != GROUP_TITLE)
                .cloned()
                .collect()
        }

        proptest! {
            #[test]
            fn test_fallback_changes_only_group_title(
                attributes in prop::collection::vec(attribute(), 0..6),
                spacing in prop::collection::vec(any::<bool>(), 6),
                title in "[A-Za-z0-9 ,()+-]{0,16}",
                group in "[A-Za-z0-9 &-]{1,12}",
            ) {
                let line = metadata_line(&attributes, &spacing, &title);
                let rewritten = regroup_line(&line, &group);

                let before = ExtinfLine::parse(&line).unwrap();
                let after = ExtinfLine::parse(&rewritten).unwrap();

                prop_assert_eq!(after.attribute_count(GROUP_TITLE), 1);
                prop_assert_eq!(after.attribute(GROUP_TITLE), Some(group.as_str()));
                prop_assert_eq!(without_group_title(&after), without_group_title(&before));
                prop_assert_eq!(after.title(), Some(title.as_str()));
                prop_assert_eq!(
                    crate::models::display_name(&rewritten),
                    crate::models::display_name(&line)
                );
            }

            #[test]
            fn test_override_rewrite_is_idempotent(
                tvg_id in "[a-z0-9.]{0,10}",
                tvg_name in "[A-Za-z0-9 ]{0,12}",
                tvg_logo in "[a-z0-9:/._]{0,20}",
                display in proptest::option::of("[A-Za-z0-9 ]{1,12}"),
                group in "[A-Za-z0-9 ]{1,12}",
                source_attributes in prop::collection::vec(attribute(), 0..4),
            ) {
                let overrides = OverrideTable::from_entries([(
                    "sony max",
                    ChannelOverride { tvg_id, tvg_name, tvg_logo, display_name: display },
                )]);
                let rewriter = RecordRewriter::new(&overrides);
                let source = metadata_line(&source_attributes, &[false; 4], "Sony Max");

                let first = rewriter.rewrite(&classified(&source, "Sony Max", &group));
                let second = rewriter.rewrite(&classified(&first.metadata_line, "Sony Max", &group));

                prop_assert_eq!(first.path, RewritePath::Override);
                prop_assert_eq!(&second.metadata_line, &first.metadata_line);
                prop_assert_eq!(&first.url_line, &second.url_line);
            }
        }
    }
}
