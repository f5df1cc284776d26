use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A `page` element without the `revision`/`text` children every article carries.
    #[error("malformed page {title:?}: missing <{missing}> element")]
    MalformedPage { title: String, missing: &'static str },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page title has no name tokens")]
    EmptyTitle,

    /// A shorthand date template (`{{ДН|...}}`, `{{ДС|...}}`) without day, month and year.
    #[error("date template {name:?} needs 3 positional arguments, found {found}")]
    MalformedTemplateCall { name: String, found: usize },

    #[error("templates nested deeper than {limit} levels")]
    TemplateNestingTooDeep { limit: usize },

    #[error("search query has no name, surname or patronymic pattern")]
    InvalidQuery,
}
