use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub name: String,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
}

/// Splits a page title into name parts.
///
/// Three or more tokens read as `Surname Name Patronymic` (extra tokens dropped), two
/// tokens as `Name Surname`, one token as a bare name.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameExtractor;

impl NameExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, title: &str) -> Result<PersonName> {
        let tokens: Vec<&str> = title.split_whitespace().collect();
        let parsed = match tokens.as_slice() {
            [] => return Err(Error::EmptyTitle),
            [name] => PersonName {
                name: name.to_string(),
                surname: None,
                patronymic: None,
            },
            [name, surname] => PersonName {
                name: name.to_string(),
                surname: Some(surname.to_string()),
                patronymic: None,
            },
            [surname, name, patronymic, ..] => PersonName {
                name: name.to_string(),
                surname: Some(surname.to_string()),
                patronymic: Some(patronymic.to_string()),
            },
        };
        Ok(parsed)
    }
}
