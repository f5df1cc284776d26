use crate::classify::PersonClassifier;
use crate::dates::DateExtractor;
use crate::error::{Error, Result};
use crate::models::Person;
use crate::names::NameExtractor;
use crate::wikitext::ParsedDocument;
use tracing::warn;

/// Text stored as [`Person::source_article`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ArticleFormatter;

impl ArticleFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, doc: &ParsedDocument) -> String {
        doc.markup().to_string()
    }
}

/// Result of running one page through [`PersonPageParser`].
#[derive(Debug)]
pub enum PageOutcome {
    Person(Person),
    NotPerson,
    Failed(Error),
}

impl PageOutcome {
    pub fn into_person(self) -> Option<Person> {
        match self {
            PageOutcome::Person(person) => Some(person),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct PersonPageParser {
    classifier: PersonClassifier,
    names: NameExtractor,
    dates: DateExtractor,
    formatter: ArticleFormatter,
}

impl PersonPageParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_extractor(mut self, dates: DateExtractor) -> Self {
        self.dates = dates;
        self
    }

    /// Failures are logged and collapse to `None`; they never escape a single page.
    pub fn try_parse(&self, title: &str, text: &str) -> Option<Person> {
        self.parse_page(title, text).into_person()
    }

    pub fn parse_page(&self, title: &str, text: &str) -> PageOutcome {
        match self.parse(title, text) {
            Ok(Some(person)) => PageOutcome::Person(person),
            Ok(None) => PageOutcome::NotPerson,
            Err(e) => {
                warn!(title, error = %e, "Failed to parse page");
                PageOutcome::Failed(e)
            }
        }
    }

    fn parse(&self, title: &str, text: &str) -> Result<Option<Person>> {
        // The document lives only for the duration of this call.
        let doc = ParsedDocument::parse(text)?;
        if !self.classifier.classify(title, &doc) {
            return Ok(None);
        }

        let name = self.names.extract(title)?;
        let dates = self.dates.extract(&doc)?;
        let source_article = self.formatter.format(&doc);
        if source_article.is_empty() {
            return Ok(None);
        }

        Ok(Some(Person {
            name: name.name,
            surname: name.surname,
            patronymic: name.patronymic,
            birth_date: dates.birth,
            death_date: dates.death,
            source_article,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEVCHENKO: &str = "{{Особа\n| ім'я = Тарас Шевченко\n}}\n'''Тара́с Григо́рович Шевче́нко''' ({{ДН|9|3|1814}} — {{ДС|10|3|1861}}) — поет.\n== Життєпис ==\n";

    #[test]
    fn parses_person_page() {
        let person = PersonPageParser::new()
            .try_parse("Шевченко Тарас Григорович", SHEVCHENKO)
            .unwrap();
        assert_eq!(person.name, "Тарас");
        assert_eq!(person.surname.as_deref(), Some("Шевченко"));
        assert_eq!(person.patronymic.as_deref(), Some("Григорович"));
        assert_eq!(person.birth_date.as_deref(), Some("9.3.1814"));
        assert_eq!(person.death_date.as_deref(), Some("10.3.1861"));
        assert_eq!(person.source_article, SHEVCHENKO);
    }

    #[test]
    fn non_person_page_is_skipped() {
        let outcome = PersonPageParser::new().parse_page("Дніпро", "'''Дніпро''' — річка.");
        assert!(matches!(outcome, PageOutcome::NotPerson));
    }

    #[test]
    fn malformed_date_template_fails_page() {
        let text = "{{Особа}}\n{{ДН|9|3}}";
        let parser = PersonPageParser::new();
        assert!(matches!(
            parser.parse_page("Шевченко Тарас", text),
            PageOutcome::Failed(Error::MalformedTemplateCall { .. })
        ));
        assert!(parser.try_parse("Шевченко Тарас", text).is_none());
    }

    #[test]
    fn blank_title_fails_page() {
        let outcome = PersonPageParser::new().parse_page(" ", "{{Особа}}");
        assert!(matches!(outcome, PageOutcome::Failed(Error::EmptyTitle)));
    }

    #[test]
    fn person_without_dates() {
        let person = PersonPageParser::new()
            .try_parse("Сократ", "== Біографія ==\nФілософ.")
            .unwrap();
        assert_eq!(person.name, "Сократ");
        assert_eq!(person.birth_date, None);
        assert_eq!(person.death_date, None);
    }
}
