//! Per-field validators and normalizers.
//!
//! Each function takes the raw cell text and either answers yes/no or returns
//! the canonical form. None of them trim their input: surrounding whitespace
//! makes a value invalid, except where a rule says otherwise (class codes drop
//! spaces, grade segments are trimmed).

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{7}$").expect("invalid identifier regex"));

/// First character a letter (ASCII or `À`–`ÿ`), then at least one letter, hyphen or space.
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\u{C0}-\u{FF}][A-Za-z\u{C0}-\u{FF}\- ]+$").expect("invalid name regex")
});

static CLASS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([3-6])em([ab])$").expect("invalid class regex"));

static GRADE_SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+\[[0-9|.:]+\]$").expect("invalid grade regex"));

/// How a matched date pattern maps onto a calendar year.
#[derive(Debug, Clone, Copy)]
enum YearDigits {
    Two,
    Four,
}

/// Accepted birth-date layouts, in the order they are tried.
static DATE_FORMATS: LazyLock<Vec<(Regex, YearDigits)>> = LazyLock::new(|| {
    [
        (r"^(?P<d>[0-9]{2})/(?P<m>[0-9]{2})/(?P<y>[0-9]{2})$", YearDigits::Two),
        (r"^(?P<d>[0-9]{1,2})-(?P<m>[0-9]{1,2})-(?P<y>[0-9]{4})$", YearDigits::Four),
        (r"^(?P<d>[0-9]{1,2})/(?P<m>[0-9]{1,2})/(?P<y>[0-9]{4})$", YearDigits::Four),
        (r"^(?P<y>[0-9]{4})-(?P<m>[0-9]{1,2})-(?P<d>[0-9]{1,2})$", YearDigits::Four),
        (r"^(?P<d>[0-9]{1,2})\.(?P<m>[0-9]{1,2})\.(?P<y>[0-9]{4})$", YearDigits::Four),
    ]
    .into_iter()
    .map(|(pattern, digits)| (Regex::new(pattern).expect("invalid date regex"), digits))
    .collect()
});

/// Two-digit years up to this value land in the 2000s, the rest in the 1900s.
const TWO_DIGIT_YEAR_PIVOT: i32 = 68;

/// Student identifier: exactly seven uppercase ASCII letters or digits.
pub fn identifier_valid(value: &str) -> bool {
    IDENTIFIER_REGEX.is_match(value)
}

/// Family or given name: a letter followed by at least one letter, hyphen or space.
pub fn name_valid(value: &str) -> bool {
    NAME_REGEX.is_match(value)
}

/// Canonicalize a birth date to `DD/MM/YYYY`.
///
/// Tries `DD/MM/YY`, `DD-MM-YYYY`, `DD/MM/YYYY`, `YYYY-MM-DD` and `DD.MM.YYYY`
/// in that order. Returns `None` when no layout matches or the date does not
/// exist on the calendar.
pub fn birth_date_normalize(value: &str) -> Option<String> {
    DATE_FORMATS.iter().find_map(|(regex, digits)| {
        let caps = regex.captures(value)?;
        let day: u32 = caps["d"].parse().ok()?;
        let month: u32 = caps["m"].parse().ok()?;
        let mut year: i32 = caps["y"].parse().ok()?;

        if let YearDigits::Two = digits {
            year += if year <= TWO_DIGIT_YEAR_PIVOT { 2000 } else { 1900 };
        }
        if year == 0 {
            return None;
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(|date| date.format("%d/%m/%Y").to_string())
    })
}

pub fn date_valid(value: &str) -> bool {
    birth_date_normalize(value).is_some()
}

/// Canonicalize a class code to `{level}em{SECTION}`, e.g. `"4 iem a"` → `"4emA"`.
pub fn class_code_normalize(value: &str) -> Option<String> {
    let compact = value.to_lowercase().replace(' ', "").replace("iem", "em");
    let caps = CLASS_REGEX.captures(&compact)?;
    Some(format!("{}em{}", &caps[1], caps[2].to_uppercase()))
}

pub fn class_code_valid(value: &str) -> bool {
    class_code_normalize(value).is_some()
}

/// Coarse syntax check of a grade cell.
///
/// Every `#`-separated segment must look like `Subject[...]` with only digits,
/// `|`, `.` and `:` inside the brackets. Whether the bracket body actually
/// holds assignments and one exam score is left to the grade parser.
pub fn grade_blob_syntactically_valid(value: &str) -> bool {
    value
        .split('#')
        .all(|segment| GRADE_SEGMENT_REGEX.is_match(segment.trim()))
}
