//! Storage and search boundary for extracted people.
//!
//! [`PersonStore`] is what the extraction side hands its dataset to. [`JsonlStore`] is the
//! file-backed implementation used by the CLI: one JSON object per line, created on first
//! insert. Name parts are compared exactly as stored; dates and article text are opaque.

use crate::config::{STORE_FILE_NAME, WRITE_BUFFER_CAPACITY};
use crate::error::{self, Error};
use crate::models::Person;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Substring patterns over the name parts, combined with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
}

impl SearchQuery {
    /// The same pattern against every name part.
    pub fn any_part(pattern: &str) -> Self {
        Self {
            name: Some(pattern.to_string()),
            surname: Some(pattern.to_string()),
            patronymic: Some(pattern.to_string()),
        }
    }

    fn patterns(&self) -> [Option<&str>; 3] {
        [&self.name, &self.surname, &self.patronymic]
            .map(|p| p.as_deref().filter(|p| !p.is_empty()))
    }

    pub fn validate(&self) -> error::Result<()> {
        if self.patterns().iter().all(Option::is_none) {
            return Err(Error::InvalidQuery);
        }
        Ok(())
    }

    pub fn matches(&self, person: &Person) -> bool {
        let fields = [
            Some(person.name.as_str()),
            person.surname.as_deref(),
            person.patronymic.as_deref(),
        ];
        self.patterns()
            .iter()
            .zip(fields)
            .any(|(pattern, field)| match (pattern, field) {
                (Some(pattern), Some(field)) => field.contains(pattern),
                _ => false,
            })
    }
}

pub trait PersonStore {
    /// Stores every person, stopping at the first error. Returns the number stored.
    fn insert<I>(&mut self, persons: I) -> Result<u64>
    where
        I: IntoIterator<Item = error::Result<Person>>;

    /// Rejects an empty query before touching storage.
    fn search(&self, query: &SearchQuery) -> Result<Vec<Person>>;

    fn clear(&mut self) -> Result<()>;
}

pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_for_append(&self) -> Result<BufWriter<File>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open store: {:?}", self.path))?;
        info!(path = ?self.path, "Opened person store");
        Ok(BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, file))
    }
}

impl PersonStore for JsonlStore {
    fn insert<I>(&mut self, persons: I) -> Result<u64>
    where
        I: IntoIterator<Item = error::Result<Person>>,
    {
        let mut persons = persons.into_iter().peekable();
        if persons.peek().is_none() {
            return Ok(0);
        }

        let mut out = self.open_for_append()?;
        let mut count = 0u64;
        for person in persons {
            let person = person.context("Failed to read person from dataset")?;
            serde_json::to_writer(&mut out, &person).context("Failed to serialize person")?;
            out.write_all(b"\n")?;
            count += 1;
        }

        out.flush().context("Failed to flush person store")?;
        debug!(count, "Inserted persons");
        Ok(count)
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Person>> {
        query.validate()?;
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open store: {:?}", self.path))?;
        let mut found = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let person: Person = serde_json::from_str(&line)
                .with_context(|| format!("Corrupt store record at line {}", i + 1))?;
            if query.matches(&person) {
                found.push(person);
            }
        }
        Ok(found)
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove store: {:?}", self.path))?;
            info!(path = ?self.path, "Person store cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn person(name: &str, surname: Option<&str>, patronymic: Option<&str>) -> Person {
        Person {
            name: name.to_string(),
            surname: surname.map(str::to_string),
            patronymic: patronymic.map(str::to_string),
            birth_date: Some("9.3.1814".to_string()),
            death_date: None,
            source_article: "{{Особа}}".to_string(),
        }
    }

    #[test]
    fn empty_query_is_invalid() {
        assert!(matches!(
            SearchQuery::default().validate(),
            Err(Error::InvalidQuery)
        ));
        let blank = SearchQuery {
            name: Some(String::new()),
            ..SearchQuery::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn query_fields_are_ored_substrings() {
        let taras = person("Тарас", Some("Шевченко"), Some("Григорович"));
        let query = SearchQuery {
            surname: Some("евч".to_string()),
            patronymic: Some("Іванович".to_string()),
            ..SearchQuery::default()
        };
        assert!(query.matches(&taras));

        let query = SearchQuery {
            name: Some("Іван".to_string()),
            ..SearchQuery::default()
        };
        assert!(!query.matches(&taras));
    }

    #[test]
    fn absent_person_field_never_matches() {
        let sokrat = person("Сократ", None, None);
        let query = SearchQuery {
            surname: Some("".to_string()),
            patronymic: Some("о".to_string()),
            ..SearchQuery::default()
        };
        assert!(!query.matches(&sokrat));
        assert!(SearchQuery::any_part("Сокр").matches(&sokrat));
    }

    #[test]
    fn store_is_created_lazily() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::new(dir.path().join("out"));
        assert_eq!(store.insert(Vec::new()).unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn insert_then_search() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::new(dir.path());
        let inserted = store
            .insert(vec![
                Ok(person("Тарас", Some("Шевченко"), Some("Григорович"))),
                Ok(person("Леся", Some("Українка"), None)),
            ])
            .unwrap();
        assert_eq!(inserted, 2);

        let found = store.search(&SearchQuery::any_part("Шевч")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Тарас");
        assert_eq!(found[0].birth_date.as_deref(), Some("9.3.1814"));
    }

    #[test]
    fn insert_appends_across_calls() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::new(dir.path());
        store.insert(vec![Ok(person("А", None, None))]).unwrap();
        store.insert(vec![Ok(person("Аб", None, None))]).unwrap();
        assert_eq!(store.search(&SearchQuery::any_part("А")).unwrap().len(), 2);
    }

    #[test]
    fn insert_stops_at_dataset_error() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::new(dir.path());
        let result = store.insert(vec![
            Ok(person("А", None, None)),
            Err(Error::EmptyTitle),
            Ok(person("Б", None, None)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn search_validates_before_reading() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path());
        let err = store.search(&SearchQuery::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidQuery)));
    }

    #[test]
    fn search_on_missing_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path());
        assert!(store.search(&SearchQuery::any_part("x")).unwrap().is_empty());
    }

    #[test]
    fn clear_removes_store() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::new(dir.path());
        store.insert(vec![Ok(person("А", None, None))]).unwrap();
        assert!(store.path().exists());
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.clear().is_ok());
    }
}
