use crate::config::READ_BUFFER_CAPACITY;
use crate::error::{Error, Result};
use crate::models::RawPage;
use bzip2::read::MultiBzDecoder;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Streams `(title, text)` pairs out of a MediaWiki XML export.
///
/// Elements are matched on their local name, so `<page>` and `<mw:page>` under any
/// namespace are treated alike. Only the page currently being read is held in memory.
pub struct WikiReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    redirects_skipped: u64,
    done: bool,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Text,
}

/// Accumulates the parts of one `<page>` element; dropped as soon as the page closes.
#[derive(Default)]
struct PageBuilder {
    depth: usize,
    title: Option<String>,
    text: Option<String>,
    is_redirect: bool,
    has_revision: bool,
    in_first_revision: bool,
    capture: Option<Field>,
}

impl PageBuilder {
    /// Registers a child element opening at `depth` (the page itself is depth 1).
    fn open(&mut self, depth: usize, name: &[u8], empty: bool) {
        match (depth, name) {
            (2, b"redirect") => self.is_redirect = true,
            (2, b"title") => {
                self.title.get_or_insert_with(String::new);
                if !empty {
                    self.capture = Some(Field::Title);
                }
            }
            (2, b"revision") if !self.has_revision => {
                self.has_revision = true;
                self.in_first_revision = !empty;
            }
            (3, b"text") if self.in_first_revision && self.text.is_none() => {
                self.text = Some(String::new());
                if !empty {
                    self.capture = Some(Field::Text);
                }
            }
            _ => {}
        }
    }

    fn push_str(&mut self, s: &str) {
        let target = match self.capture {
            Some(Field::Title) => self.title.as_mut(),
            Some(Field::Text) => self.text.as_mut(),
            None => None,
        };
        if let Some(target) = target {
            target.push_str(s);
        }
    }

    fn finish(self) -> Result<RawPage> {
        let title = self.title.unwrap_or_default();
        if !self.has_revision {
            return Err(Error::MalformedPage {
                title,
                missing: "revision",
            });
        }
        match self.text {
            Some(text) => Ok(RawPage { title, text }),
            None => Err(Error::MalformedPage {
                title,
                missing: "text",
            }),
        }
    }
}

impl WikiReader<Box<dyn BufRead>> {
    /// Opens a dump from disk, decoding bzip2 when the file ends in `.bz2`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let inner: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "bz2") {
            Box::new(BufReader::with_capacity(
                READ_BUFFER_CAPACITY,
                MultiBzDecoder::new(file),
            ))
        } else {
            Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, file))
        };
        Ok(Self::from_reader(inner))
    }
}

impl<R: BufRead> WikiReader<R> {
    pub fn from_reader(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            redirects_skipped: 0,
            done: false,
        }
    }

    pub fn redirects_skipped(&self) -> u64 {
        self.redirects_skipped
    }

    fn next_page(&mut self) -> Result<Option<RawPage>> {
        let mut page: Option<PageBuilder> = None;

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    let name = e.local_name();
                    match page.as_mut() {
                        Some(b) => {
                            b.depth += 1;
                            b.open(b.depth, name.as_ref(), false);
                        }
                        None if name.as_ref() == b"page" => {
                            page = Some(PageBuilder {
                                depth: 1,
                                ..PageBuilder::default()
                            });
                        }
                        None => {}
                    }
                }
                Event::Empty(e) => {
                    if let Some(b) = page.as_mut() {
                        b.open(b.depth + 1, e.local_name().as_ref(), true);
                    }
                }
                Event::Text(e) => {
                    if let Some(b) = page.as_mut().filter(|b| b.capture.is_some()) {
                        b.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(b) = page.as_mut().filter(|b| b.capture.is_some()) {
                        b.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => {
                    let Some(b) = page.as_mut() else {
                        continue;
                    };
                    b.capture = None;
                    if b.depth > 1 {
                        if b.depth == 2 && e.local_name().as_ref() == b"revision" {
                            b.in_first_revision = false;
                        }
                        b.depth -= 1;
                        continue;
                    }

                    let Some(finished) = page.take() else {
                        continue;
                    };
                    if finished.is_redirect {
                        self.redirects_skipped += 1;
                        debug!(
                            title = finished.title.as_deref().unwrap_or_default(),
                            "Skipping redirect"
                        );
                        continue;
                    }
                    return finished.finish().map(Some);
                }
                Event::Eof => {
                    if page.is_some() {
                        warn!("Dump ended inside an unterminated <page>");
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for WikiReader<R> {
    type Item = Result<RawPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_page() {
            Ok(Some(page)) => Some(Ok(page)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e @ Error::MalformedPage { .. }) => Some(Err(e)),
            Err(e) => {
                // The XML stream itself is broken; nothing after this point is trustworthy.
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(xml: &str) -> Vec<Result<RawPage>> {
        WikiReader::from_reader(xml.as_bytes()).collect()
    }

    fn titles(xml: &str) -> Vec<String> {
        read_all(xml)
            .into_iter()
            .map(|p| p.unwrap().title)
            .collect()
    }

    #[test]
    fn reads_title_and_text() {
        let xml = "<mediawiki><page><title>Сократ</title><revision><text>Філософ</text></revision></page></mediawiki>";
        let pages = read_all(xml);
        assert_eq!(pages.len(), 1);
        let page = pages[0].as_ref().unwrap();
        assert_eq!(page.title, "Сократ");
        assert_eq!(page.text, "Філософ");
    }

    #[test]
    fn matches_pages_under_any_namespace() {
        let xml = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
            <page><title>A</title><revision><text>a</text></revision></page>
            <mw:page xmlns:mw="urn:x"><mw:title>B</mw:title><mw:revision><mw:text>b</mw:text></mw:revision></mw:page>
        </mediawiki>"#;
        assert_eq!(titles(xml), vec!["A", "B"]);
    }

    #[test]
    fn skips_redirects() {
        let xml = r#"<mediawiki>
            <page><title>Шевченко</title><redirect title="Шевченко Тарас Григорович" /><revision><text>#ПЕРЕНАПРАВЛЕННЯ [[Шевченко Тарас Григорович]]</text></revision></page>
            <page><title>Шевченко Тарас Григорович</title><revision><text>Поет</text></revision></page>
        </mediawiki>"#;
        let mut reader = WikiReader::from_reader(xml.as_bytes());
        let pages: Vec<_> = reader.by_ref().map(|p| p.unwrap().title).collect();
        assert_eq!(pages, vec!["Шевченко Тарас Григорович"]);
        assert_eq!(reader.redirects_skipped(), 1);
    }

    #[test]
    fn redirect_only_counts_as_direct_child() {
        let xml = "<mediawiki><page><title>A</title><revision><redirect/><text>a</text></revision></page></mediawiki>";
        assert_eq!(titles(xml), vec!["A"]);
    }

    #[test]
    fn missing_text_is_malformed_and_stream_continues() {
        let xml = "<mediawiki>
            <page><title>Broken</title><revision><id>1</id></revision></page>
            <page><title>Fine</title><revision><text>ok</text></revision></page>
        </mediawiki>";
        let pages = read_all(xml);
        assert_eq!(pages.len(), 2);
        assert!(matches!(
            &pages[0],
            Err(Error::MalformedPage { title, missing: "text" }) if title == "Broken"
        ));
        assert_eq!(pages[1].as_ref().unwrap().title, "Fine");
    }

    #[test]
    fn missing_revision_is_malformed() {
        let xml = "<mediawiki><page><title>NoRev</title></page></mediawiki>";
        let pages = read_all(xml);
        assert!(matches!(
            &pages[0],
            Err(Error::MalformedPage { missing: "revision", .. })
        ));
    }

    #[test]
    fn empty_text_element_is_present_but_empty() {
        let xml = r#"<mediawiki><page><title>Empty</title><revision><text bytes="0" /></revision></page></mediawiki>"#;
        let pages = read_all(xml);
        assert_eq!(pages[0].as_ref().unwrap().text, "");
    }

    #[test]
    fn unescapes_entities_in_text() {
        let xml = "<mediawiki><page><title>T</title><revision><text>a &lt;ref&gt;b&lt;/ref&gt; &amp; c</text></revision></page></mediawiki>";
        let pages = read_all(xml);
        assert_eq!(pages[0].as_ref().unwrap().text, "a <ref>b</ref> & c");
    }

    #[test]
    fn uses_first_revision_only() {
        let xml = "<mediawiki><page><title>T</title>
            <revision><text>first</text></revision>
            <revision><text>second</text></revision>
        </page></mediawiki>";
        let pages = read_all(xml);
        assert_eq!(pages[0].as_ref().unwrap().text, "first");
    }

    #[test]
    fn broken_xml_ends_the_stream() {
        let xml = "<mediawiki><page><title>A</title><revision><text>a</text></revision></page><page><title>B</wrong></page>";
        let pages = read_all(xml);
        assert!(pages[0].is_ok());
        assert!(matches!(pages.last(), Some(Err(Error::Xml(_)))));
    }
}
