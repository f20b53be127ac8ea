//! The assembled service: lookups, AI mode, rendering and chunking behind
//! one handle built from configuration.

mod builder;

pub use builder::{Kontragent, KontragentBuilder};

use std::sync::Arc;

use crate::batch::{self, BatchOptions, BatchReport};
use crate::cache::CacheRegistry;
use crate::chunk;
use crate::config::Config;
use crate::format::{PartyStateTable, Renderer};
use crate::lookup::{AnalysisClient, LookupClient};
use crate::types::{Page, Record};
use crate::validate::ExtractOptions;

/// Everything a transport adapter needs, wired from one [`Config`].
pub struct KontragentService {
    config: Config,
    caches: Arc<CacheRegistry>,
    lookup: LookupClient,
    analysis: AnalysisClient,
    party_states: PartyStateTable,
}

impl KontragentService {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn caches(&self) -> &Arc<CacheRegistry> {
        &self.caches
    }

    pub fn lookup(&self) -> &LookupClient {
        &self.lookup
    }

    pub fn analysis(&self) -> &AnalysisClient {
        &self.analysis
    }

    /// Renderer using the configured reason codes and dump limit.
    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.party_states).max_dump_lines(self.config.display.raw_dump_max_lines)
    }

    /// Batch options derived from the display settings.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            strictness: self.config.display.strictness(),
            extract: ExtractOptions {
                max_items: self.config.display.max_identifiers,
                ..ExtractOptions::default()
            },
        }
    }

    /// Check every identifier in `text`.
    pub async fn check(&self, text: &str) -> BatchReport {
        batch::check_identifiers(&self.lookup, text, &self.batch_options()).await
    }

    /// One page of `record`, split into messages.
    pub fn render_page(&self, record: &Record, page: Page) -> Vec<String> {
        self.chunks(&self.renderer().render(record, page))
    }

    /// AI analysis of `identifier`, split into messages.
    pub async fn analyze(&self, identifier: &str) -> Vec<String> {
        self.chunks(&self.analysis.analyze(identifier).await)
    }

    /// Split `text` with the configured message limit.
    pub fn chunks(&self, text: &str) -> Vec<String> {
        chunk::split(text, self.config.display.chunk_limit)
    }
}
