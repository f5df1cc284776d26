use crate::models::Person;

/// A predicate an extracted person must satisfy to be kept.
pub trait PersonFilter {
    fn accept(&self, person: &Person) -> bool;
}

impl<F> PersonFilter for F
where
    F: Fn(&Person) -> bool,
{
    fn accept(&self, person: &Person) -> bool {
        self(person)
    }
}

/// Keeps people with a known birth date and no death date.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModernPersonFilter;

impl PersonFilter for ModernPersonFilter {
    fn accept(&self, person: &Person) -> bool {
        person.birth_date.is_some() && person.death_date.is_none()
    }
}

/// Filters applied in registration order; a person passes only if every filter accepts.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn PersonFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: impl PersonFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn with(mut self, filter: impl PersonFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn accept(&self, person: &Person) -> bool {
        self.filters.iter().all(|f| f.accept(person))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn person(birth: Option<&str>, death: Option<&str>) -> Person {
        Person {
            name: "Тарас".to_string(),
            surname: Some("Шевченко".to_string()),
            patronymic: None,
            birth_date: birth.map(str::to_string),
            death_date: death.map(str::to_string),
            source_article: "text".to_string(),
        }
    }

    #[test]
    fn empty_chain_accepts_everything() {
        let chain = FilterChain::new();
        assert!(chain.is_empty());
        assert!(chain.accept(&person(None, None)));
    }

    #[test]
    fn modern_person_filter() {
        let filter = ModernPersonFilter;
        assert!(filter.accept(&person(Some("1.1.1990"), None)));
        assert!(!filter.accept(&person(Some("1.1.1900"), Some("1.1.1980"))));
        assert!(!filter.accept(&person(None, None)));
        assert!(!filter.accept(&person(None, Some("1.1.1980"))));
    }

    #[test]
    fn closures_are_filters() {
        let chain = FilterChain::new()
            .with(ModernPersonFilter)
            .with(|p: &Person| p.surname.is_some());
        assert_eq!(chain.len(), 2);
        assert!(chain.accept(&person(Some("1.1.1990"), None)));

        let mut nameless = person(Some("1.1.1990"), None);
        nameless.surname = None;
        assert!(!chain.accept(&nameless));
    }

    #[test]
    fn chain_stops_at_first_rejection() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let chain = FilterChain::new()
            .with(|_: &Person| false)
            .with(move |_: &Person| {
                counter.set(counter.get() + 1);
                true
            });
        assert!(!chain.accept(&person(None, None)));
        assert_eq!(calls.get(), 0);
    }
}
