use serde::{Deserialize, Serialize};

/// One non-redirect page as read from the dump.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    /// Kept as written in the article, e.g. `12.5.1900` or `12 травня 1900`.
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub source_article: String,
}

/// Birth/death pair contributed by a single date source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateCandidate {
    pub birth: Option<String>,
    pub death: Option<String>,
}

impl DateCandidate {
    pub fn new(birth: Option<String>, death: Option<String>) -> Self {
        Self { birth, death }
    }

    pub fn is_empty(&self) -> bool {
        self.birth.is_none() && self.death.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.birth.is_some() && self.death.is_some()
    }

    /// Fills absent fields from `other`; present fields are never overwritten.
    pub fn fill_from(&mut self, other: DateCandidate) {
        if self.birth.is_none() {
            self.birth = other.birth;
        }
        if self.death.is_none() {
            self.death = other.death;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn fill_from_keeps_present_fields() {
        let mut merged = DateCandidate::new(some("1.1.1900"), None);
        merged.fill_from(DateCandidate::new(some("2.2.1900"), some("3.3.1980")));
        assert_eq!(merged.birth.as_deref(), Some("1.1.1900"));
        assert_eq!(merged.death.as_deref(), Some("3.3.1980"));
    }

    #[test]
    fn fill_from_empty_is_noop() {
        let mut merged = DateCandidate::new(some("1.1.1900"), None);
        merged.fill_from(DateCandidate::default());
        assert_eq!(merged, DateCandidate::new(some("1.1.1900"), None));
        assert!(!merged.is_complete());
    }

    #[test]
    fn person_serializes_absent_fields_as_null() {
        let person = Person {
            name: "Сократ".to_string(),
            surname: None,
            patronymic: None,
            birth_date: None,
            death_date: None,
            source_article: "text".to_string(),
        };
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["name"], "Сократ");
        assert!(json["surname"].is_null());
        assert_eq!(json["source_article"], "text");
    }
}
