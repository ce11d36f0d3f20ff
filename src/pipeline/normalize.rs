//! Text normalisation for extracted field values.
//!
//! Text pulled out of a rectangle carries whatever the content stream had:
//! stray padding, line breaks inside a name, bullet glyphs, trailing `!!`.
//! The rules below bring it to one canonical upper-case line.
//!
//! ## Rule Order
//!
//! 1. Trim leading/trailing whitespace
//! 2. Collapse whitespace runs to a single space
//! 3. Drop every character that is not an ASCII word character
//!    (`[0-9A-Za-z_]`), whitespace, `,`, `.` or `-`. Accented letters go
//!    too: `"José Muñoz"` becomes `"JOS MUOZ"`, which is what downstream
//!    payroll consumers match on.
//! 4. Re-collapse and re-trim (step 3 can leave `"A  B"` or a dangling
//!    space behind)
//! 5. Upper-case
//!
//! Everything that survives step 3 is ASCII, so the upper-casing in step 5
//! cannot reintroduce a character step 3 would drop. Together with empty
//! results being reported as absent, this keeps
//! `normalize(normalize(s)) == normalize(s)` for every input.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static RE_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_\s,.\-]").unwrap());

/// Normalise an extracted field value. `None` and empty input give `None`.
pub fn normalize(input: Option<&str>) -> Option<String> {
    let raw = input?;
    if raw.is_empty() {
        return None;
    }

    let collapsed = collapse_whitespace(raw);
    let stripped = RE_DISALLOWED.replace_all(&collapsed, "");
    let cleaned = collapse_whitespace(&stripped).to_uppercase();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE_RUN.replace_all(input.trim(), " ").into_owned()
}
