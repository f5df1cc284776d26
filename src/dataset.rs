use crate::error::Result;
use crate::filters::FilterChain;
use crate::models::Person;
use crate::parser::WikiReader;
use crate::person::{PageOutcome, PersonPageParser};
use crate::stats::ExtractionStats;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Lazy, single-pass sequence of people extracted from a dump.
///
/// Pages are pulled from the reader one at a time and dropped before the next is read.
/// Pages that are not people, fail to parse, or are rejected by the filter chain are
/// skipped and do not count towards `limit`. Malformed `<page>` elements and XML errors
/// are yielded as `Err` so the caller decides whether to continue.
pub struct ExtractionDataset<R: BufRead> {
    pages: WikiReader<R>,
    parser: PersonPageParser,
    filters: FilterChain,
    limit: Option<usize>,
    yielded: usize,
    stats: Arc<ExtractionStats>,
}

impl ExtractionDataset<Box<dyn BufRead>> {
    pub fn open(path: impl AsRef<Path>, filters: FilterChain, limit: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), ?limit, filters = filters.len(), "Opening dump");
        Ok(Self::new(WikiReader::open(path)?, filters, limit))
    }
}

impl<R: BufRead> ExtractionDataset<R> {
    pub fn new(pages: WikiReader<R>, filters: FilterChain, limit: Option<usize>) -> Self {
        Self {
            pages,
            parser: PersonPageParser::new(),
            filters,
            limit,
            yielded: 0,
            stats: Arc::new(ExtractionStats::new()),
        }
    }

    pub fn with_parser(mut self, parser: PersonPageParser) -> Self {
        self.parser = parser;
        self
    }

    /// Handle to the counters; stays valid after the dataset itself is consumed.
    pub fn stats(&self) -> Arc<ExtractionStats> {
        Arc::clone(&self.stats)
    }

    pub fn redirects_skipped(&self) -> u64 {
        self.pages.redirects_skipped()
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.yielded >= limit)
    }
}

impl<R: BufRead> Iterator for ExtractionDataset<R> {
    type Item = Result<Person>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.limit_reached() {
            return None;
        }

        loop {
            let next = self.pages.next();
            self.stats.set_redirects(self.pages.redirects_skipped());
            let page = match next? {
                Ok(page) => page,
                Err(e) => return Some(Err(e)),
            };
            self.stats.inc_pages();

            match self.parser.parse_page(&page.title, &page.text) {
                PageOutcome::Person(person) if self.filters.accept(&person) => {
                    self.yielded += 1;
                    self.stats.inc_accepted();
                    return Some(Ok(person));
                }
                PageOutcome::Person(_) => self.stats.inc_filtered(),
                PageOutcome::NotPerson => self.stats.inc_not_person(),
                PageOutcome::Failed(_) => self.stats.inc_failed(),
            }
        }
    }
}
