//! Address normalization
//!
//! The registries hand back address lines, city, county and postcode as
//! separate nullable fields, and individual lines sometimes already contain
//! commas or are nothing but whitespace. Naive concatenation produces
//! `"1 High St, , , Leeds"`.

/// Join address fragments into one `", "` separated line
///
/// Every part is split on commas, each fragment trimmed, and empty fragments
/// dropped. The output never contains `",,"` or a leading/trailing comma, and
/// normalizing an already-normalized address returns it unchanged.
pub fn normalize_address<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut fragments: Vec<String> = Vec::new();

    for part in parts.into_iter().flatten() {
        fragments.extend(
            part.as_ref()
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        );
    }

    fragments.join(", ")
}
