//! Wikiperson: biographical record extraction from MediaWiki dumps
//!
//! This crate streams a MediaWiki XML export (plain or bzip2-compressed), picks out the
//! pages that describe people and turns each into a [`models::Person`] record:
//!
//! 1. **Streaming** -- [`parser::WikiReader`] yields `(title, text)` for every non-redirect
//!    `<page>`, matching elements by local name under any namespace
//! 2. **Classification** -- [`classify::PersonClassifier`] looks for a person infobox,
//!    birth/death infobox arguments, or a biography section
//! 3. **Extraction** -- names come from the title ([`names`]), dates from shorthand
//!    templates, infobox arguments and prose, merged by priority ([`dates`])
//! 4. **Filtering** -- a [`filters::FilterChain`] of predicates decides what is kept
//!
//! [`dataset::ExtractionDataset`] ties these together into a lazy iterator that hands
//! records to a [`store::PersonStore`].
//!
//! # Memory
//!
//! Only the page being processed is held in memory. Its [`wikitext::ParsedDocument`] is
//! dropped before the next page is read, so dumps of any size can be scanned.
//!
//! # Failure isolation
//!
//! A page whose markup cannot be handled (for example `{{ДН|12|5}}` with a missing
//! year) is logged and skipped; the scan goes on. Structural problems with the dump
//! itself are surfaced as `Err` items.
//!
//! # Example Usage
//!
//! ```bash
//! # Extract living people (birth date, no death date) from a dump
//! wikiperson -v extract -i ukwiki-latest-pages-articles.xml.bz2 -o output/ --modern-only
//!
//! # Search stored records by any name part
//! wikiperson search -o output/ Шевченко
//! ```

pub mod classify;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod error;
pub mod filters;
pub mod models;
pub mod names;
pub mod parser;
pub mod person;
pub mod stats;
pub mod store;
pub mod wikitext;
