//! Playlist curation pipeline
//!
//! fetch -> parse -> classify -> rewrite -> publish. Everything between the
//! fetch and the publish is pure and synchronous.

use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::CuratorConfig;
use crate::errors::AppResult;
use crate::ingestor::parse_entries;
use crate::models::{RewritePath, RewrittenEntry};
use crate::sources::PlaylistSource;

pub mod filter_engine;
pub mod generator;
pub mod rewriter;

pub use filter_engine::{Classification, ClassifiedEntry, FilterEngine, UnmatchedReason};
pub use generator::PlaylistGenerator;
pub use rewriter::RecordRewriter;

/// Counters collected while transforming one playlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub lines: usize,
    pub skipped_lines: usize,
    pub entries: usize,
    pub matched: usize,
    pub not_allow_listed: usize,
    pub missing_display_name: usize,
    pub overrides: usize,
    pub fallbacks: usize,
}

impl TransformStats {
    pub fn dropped(&self) -> usize {
        self.not_allow_listed + self.missing_display_name
    }
}

#[derive(Debug, Clone)]
pub struct Transformed {
    pub entries: Vec<RewrittenEntry>,
    pub stats: TransformStats,
}

/// Whether a run writes the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Publish,
    DryRun,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: TransformStats,
    /// Rendered playlist text
    pub content: String,
    /// Where the playlist was written; `None` for dry runs
    pub output: Option<PathBuf>,
}

pub struct PlaylistCurator<'c> {
    config: &'c CuratorConfig,
}

impl<'c> PlaylistCurator<'c> {
    pub fn new(config: &'c CuratorConfig) -> Self {
        Self { config }
    }

    /// Parse, classify and rewrite a playlist. Output keeps source order.
    pub fn transform(&self, content: &str) -> Transformed {
        let filter = FilterEngine::new(&self.config.allowed);
        let rewriter = RecordRewriter::new(&self.config.overrides);

        let mut stats = TransformStats::default();
        let mut entries = Vec::new();
        let mut raw_entries = parse_entries(content);
        stats.lines = raw_entries.line_count();

        for raw in raw_entries.by_ref() {
            stats.entries += 1;
            match filter.classify(raw) {
                Classification::Matched(classified) => {
                    let rewritten = rewriter.rewrite(&classified);
                    match rewritten.path {
                        RewritePath::Override => stats.overrides += 1,
                        RewritePath::Fallback => stats.fallbacks += 1,
                    }
                    stats.matched += 1;
                    entries.push(rewritten);
                }
                Classification::Unmatched(reason) => {
                    debug!("Dropping line {}: {}", raw.line_number, reason);
                    match reason {
                        UnmatchedReason::NotAllowListed { .. } => stats.not_allow_listed += 1,
                        UnmatchedReason::MissingDisplayName => stats.missing_display_name += 1,
                    }
                }
            }
        }
        stats.skipped_lines = raw_entries.skipped_lines();

        info!(
            "Transform completed: lines={} entries={} matched={} dropped={} overrides={} fallbacks={}",
            stats.lines,
            stats.entries,
            stats.matched,
            stats.dropped(),
            stats.overrides,
            stats.fallbacks
        );

        Transformed { entries, stats }
    }

    /// One complete run: fetch, transform, then publish unless dry-running.
    /// A fetch failure returns before anything is written.
    pub async fn run(&self, source: &dyn PlaylistSource, mode: RunMode) -> AppResult<RunSummary> {
        let run_start = Instant::now();

        let content = source.fetch().await?;
        info!(
            "Playlist fetched: source={} bytes={}",
            source.describe(),
            content.len()
        );

        let transformed = self.transform(&content);
        let generator = PlaylistGenerator::new(self.config.output.clone());
        let rendered = generator.render(&transformed.entries);

        if transformed.entries.is_empty() {
            info!("No matching channels found");
        } else {
            info!("Found {} categorized channels", transformed.entries.len());
        }

        let output = match mode {
            RunMode::Publish => Some(generator.publish(&rendered).await?),
            RunMode::DryRun => {
                info!(
                    "Dry run: not writing {}",
                    generator.output_path().display()
                );
                None
            }
        };

        info!("Run completed in {:?}", run_start.elapsed());

        Ok(RunSummary {
            stats: transformed.stats,
            content: rendered,
            output,
        })
    }
}
