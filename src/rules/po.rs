//! Purchase-order extraction from free-text reference cells.
//!
//! Forwarders and the import doc write the same six-digit PO in many shapes:
//! `PO#107166`, `107166-1`, `107070/107432`, `107977(106897)`, `PO108214`.
//! Each [`PoRule`] captures one reading of those cells.

use crate::domain::model::CellValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static SIX_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{6}\b").expect("valid pattern"));
static SIX_DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{6}").expect("valid pattern"));
static LETTER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+\s*#?\.?\s*").expect("valid pattern"));
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[/\-,]").expect("valid pattern"));
static LEADING_PO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^PO[#.]?").expect("valid pattern"));
static PO_PREFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPO(\d{6})\b").expect("valid pattern"));
static PARENTHESISED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoRule {
    /// Every word-bounded six-digit number.
    Plain,
    /// Strips letter prefixes and separators before looking for six digits.
    #[default]
    Lenient,
    /// Drops one leading `PO`/`PO#`/`PO.`, takes every six-digit run, sorted and unique.
    OrderPrefix,
    /// Only `PO123456` tokens.
    Prefixed,
    /// Parenthesised aliases dropped; `/` separates several POs.
    SlashList,
}

impl PoRule {
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self {
            PoRule::Plain => find_all(&SIX_DIGITS, text),
            PoRule::Lenient => {
                let upper = text.to_uppercase();
                let stripped = LETTER_PREFIX.replace_all(&upper, " ");
                let spaced = SEPARATORS.replace_all(&stripped, " ");
                find_all(&SIX_DIGITS, &spaced)
            }
            PoRule::OrderPrefix => {
                let upper = text.trim().to_uppercase();
                let stripped = LEADING_PO.replace(&upper, "");
                find_all(&SIX_DIGIT_RUN, &stripped)
                    .into_iter()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            }
            PoRule::Prefixed => PO_PREFIXED
                .captures_iter(text)
                .map(|caps| caps[1].to_string())
                .collect(),
            PoRule::SlashList => {
                let cleaned = PARENTHESISED.replace_all(text, "");
                if cleaned.contains('/') {
                    cleaned
                        .split('/')
                        .map(str::trim)
                        .filter(|piece| !piece.is_empty())
                        .filter_map(|piece| SIX_DIGITS.find(piece).map(|m| m.as_str().to_string()))
                        .collect()
                } else {
                    SIX_DIGITS
                        .find(&cleaned)
                        .map(|m| vec![m.as_str().to_string()])
                        .unwrap_or_default()
                }
            }
        }
    }

    pub fn extract_cell(&self, cell: &CellValue) -> Vec<String> {
        self.extract(&cell.display())
    }
}

fn find_all(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A PO is exactly six ASCII digits.
pub fn is_valid_po(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit())
}
