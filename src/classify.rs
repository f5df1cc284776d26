use crate::wikitext::ParsedDocument;
use tracing::debug;

const PERSON_TEMPLATES: &[&str] = &["особа"];

/// Stems of "birth" and "death" as they appear in infobox argument names.
const PERSON_ARGUMENT_MARKERS: &[&str] = &["народженн", "смерті"];

/// Stems of "biography" and "life story" section headings.
const PERSON_SECTION_MARKERS: &[&str] = &["біографі", "життєпис"];

/// Decides whether a page describes a person.
///
/// Tuned for recall: anything carrying a person infobox, a birth/death argument or a
/// biography section passes. False positives are left to later filters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersonClassifier;

impl PersonClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, title: &str, doc: &ParsedDocument) -> bool {
        for template in doc.templates() {
            let name = template.normalized_name();
            if PERSON_TEMPLATES.contains(&name.as_str()) {
                debug!(title, template = %name, "Matched person template");
                return true;
            }
        }

        for template in doc.templates() {
            for (arg_name, _) in template.named() {
                let arg_name = arg_name.trim().to_lowercase();
                if let Some(marker) = find_marker(&arg_name, PERSON_ARGUMENT_MARKERS) {
                    debug!(title, argument = %arg_name, marker, "Matched template argument");
                    return true;
                }
            }
        }

        for section in doc.sections() {
            let heading = section.title.trim().to_lowercase();
            if let Some(marker) = find_marker(&heading, PERSON_SECTION_MARKERS) {
                debug!(title, section = %heading, marker, "Matched section");
                return true;
            }
        }

        false
    }
}

/// Equality is a special case of containment, so one substring test covers both.
fn find_marker(value: &str, markers: &[&'static str]) -> Option<&'static str> {
    markers.iter().copied().find(|m| value.contains(m))
}
