use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\-_]+").expect("valid pattern"));
static MV_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bMV\s+").expect("valid pattern"));
static V_DOT_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bV\.\s*").expect("valid pattern"));
static SERVICE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(EXPRESS|SERVICE)$").expect("valid pattern"));
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid pattern"));

/// Carrier spellings that forwarders and the import doc write differently.
const CARRIER_ALIASES: &[(&str, &str)] = &[
    ("CMA CGM", "CMACGM"),
    ("MAERSK LINE", "MAERSK"),
    ("EVERGREEN LINE", "EVERGREEN"),
    ("COSCO SHIPPING", "COSCO"),
    ("HAPAG LLOYD", "HAPAG-LLOYD"),
    ("ONE LINE", "ONE"),
    ("OOCL LIMITED", "OOCL"),
    ("YANG MING", "YANGMING"),
];

pub fn normalize_vessel(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    if upper.is_empty() {
        return upper;
    }

    let collapsed = SEPARATOR_RUN.replace_all(&upper, " ");
    let trimmed = collapsed.trim();
    let without_mv = MV_PREFIX.replace_all(trimmed, "");
    let without_v = V_DOT_PREFIX.replace_all(&without_mv, "");
    let mut name = SERVICE_SUFFIX.replace(&without_v, "").into_owned();

    for (alias, canonical) in CARRIER_ALIASES {
        name = name.replace(alias, canonical);
    }
    name
}

/// First digit run without leading zeros; letters around it are ignored.
pub fn normalize_voyage(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    match DIGIT_RUN.find(&upper) {
        Some(digits) => digits.as_str().trim_start_matches('0').to_string(),
        None => upper,
    }
}
