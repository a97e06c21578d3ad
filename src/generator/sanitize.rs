use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INVALID_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_]").unwrap();
    static ref LEADING_DIGITS: Regex = Regex::new(r"^[0-9]+").unwrap();
}

/// Convert a display name into a valid Terraform resource name
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`, leading digits are
/// dropped, `ug_` is prepended when nothing usable is left, and the result is
/// lower-cased. The output always matches `^[a-z_][a-z0-9_]*$`.
///
/// Distinct names may map to the same identifier (`"My-Group!"` and
/// `"My_Group "` both give `my_group_`); see [`find_identifier_collisions`].
pub fn sanitize(name: &str) -> String {
    let replaced = INVALID_CHARS.replace_all(name, "_");
    let stripped = LEADING_DIGITS.replace(&replaced, "");

    let starts_well = stripped
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    let identifier = if starts_well {
        stripped.into_owned()
    } else {
        format!("ug_{}", stripped)
    };

    identifier.to_lowercase()
}

/// Names that sanitize to the same identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierCollision {
    pub identifier: String,
    pub names: Vec<String>,
}

/// Report identifiers produced by more than one name, in first-seen order
pub fn find_identifier_collisions<'a, I>(names: I) -> Vec<IdentifierCollision>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<IdentifierCollision> = Vec::new();

    for name in names {
        let identifier = sanitize(name);
        match seen.iter_mut().find(|c| c.identifier == identifier) {
            Some(existing) => existing.names.push(name.to_string()),
            None => seen.push(IdentifierCollision {
                identifier,
                names: vec![name.to_string()],
            }),
        }
    }

    seen.retain(|c| c.names.len() > 1);
    seen
}
