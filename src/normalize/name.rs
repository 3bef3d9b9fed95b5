//! Person name handling
//!
//! The placement registry stores candidates as `"Surname, Forename"` and uses
//! the surname field to carry a service identifier: `"Smith:SVC42, Jane"`.
//! The part after the colon is never a name fragment.

use crate::models::PersonName;

/// Split a registry name into forename, legal surname and embedded tag
///
/// Splits on the first comma, then splits the surname side on the first
/// colon. Without a comma the whole string is the surname side and the
/// forename is empty.
pub fn split_person_name(raw: &str) -> PersonName {
    let (surname_side, forename) = match raw.split_once(',') {
        Some((surname_side, forename)) => (surname_side, forename.trim()),
        None => (raw, ""),
    };

    let (surname, service_tag) = match surname_side.split_once(':') {
        Some((surname, tag)) => {
            let tag = tag.trim();
            (surname.trim(), (!tag.is_empty()).then(|| tag.to_string()))
        }
        None => (surname_side.trim(), None),
    };

    PersonName {
        forename: forename.to_string(),
        surname: surname.to_string(),
        service_tag,
    }
}

/// Render a registry name as `"Forename Surname"` for documents and display
///
/// Any embedded service tag is dropped. A string with neither a comma nor a
/// colon is returned trimmed but otherwise verbatim.
pub fn format_display_name(raw: &str) -> String {
    if !raw.contains(',') && !raw.contains(':') {
        return raw.trim().to_string();
    }

    let name = split_person_name(raw);
    format!("{} {}", name.forename, name.surname)
        .trim()
        .to_string()
}

/// Reformat a companies-registry officer name for matching
///
/// Officer names look like `"SURNAME, FORENAME MIDDLE"`; the result is
/// `"FORENAME SURNAME"`, upper-cased. Returns `None` when the name does not
/// follow that convention, in which case the officer is skipped.
pub fn format_officer_name(raw: &str) -> Option<String> {
    let raw = raw.trim().to_uppercase();
    let (surname, forenames) = raw.split_once(',')?;
    let surname = surname.trim();
    let first_forename = forenames.split_whitespace().next()?;

    if surname.is_empty() {
        return None;
    }

    Some(format!("{} {}", first_forename, surname))
}
