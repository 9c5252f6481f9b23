use crate::domain::model::{Field, FieldDiff};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static NUMBER_WITH_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]{4}\d{7})\s*\(?\s*([A-Za-z0-9]*)\s*\)?").expect("valid container pattern")
});
static ALNUM_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").expect("valid pattern"));

/// Known ISO type spellings and the code each one compares as.
const TYPE_MAPPINGS: &[(&str, &str)] = &[
    ("40RE", "40RE"),
    ("40REHC", "40RE"),
    ("40HC", "40HC"),
    ("40HCR", "40HC"),
    ("40HCRV", "40HC"),
    ("20GP", "20GP"),
    ("20RE", "20RE"),
    ("20RF", "20RF"),
    ("20FR", "20FR"),
    ("45HC", "45HC"),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerInfo {
    pub number: Option<String>,
    pub kind: Option<String>,
    pub display: String,
}

pub fn normalize_container_type(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return upper;
    }
    if let Some((_, code)) = TYPE_MAPPINGS.iter().find(|(name, _)| *name == upper) {
        return code.to_string();
    }
    TYPE_MAPPINGS
        .iter()
        .find(|(name, _)| upper.contains(name))
        .map(|(_, code)| code.to_string())
        .unwrap_or(upper)
}

pub fn parse_container(text: &str) -> ContainerInfo {
    let text = text.trim();
    if text.is_empty() {
        return ContainerInfo::default();
    }

    if let Some(caps) = NUMBER_WITH_TYPE.captures(text) {
        let number = caps[1].to_uppercase();
        let kind = normalize_container_type(&caps[2]);
        let display = if kind.is_empty() {
            number.clone()
        } else {
            format!("{}({})", number, kind)
        };
        return ContainerInfo {
            number: Some(number),
            kind: (!kind.is_empty()).then_some(kind),
            display,
        };
    }

    match ALNUM_TOKEN.find(text) {
        Some(token) if token.as_str().len() >= 2 => {
            let kind = normalize_container_type(token.as_str());
            ContainerInfo {
                number: None,
                display: format!("({})", kind),
                kind: Some(kind),
            }
        }
        _ => ContainerInfo {
            display: text.to_string(),
            ..Default::default()
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerRule {
    /// A number on both sides counts as equal whatever its value.
    #[default]
    PresenceOnly,
    MatchNumber,
    /// Only reports containers the forwarder has a number for.
    MatchNumberAndType,
}

/// `None` when the two container cells agree under `rule`.
pub fn compare_containers(report: &str, import: &str, rule: ContainerRule) -> Option<FieldDiff> {
    let a = parse_container(report);
    let b = parse_container(import);

    let (equal, note) = match rule {
        ContainerRule::PresenceOnly | ContainerRule::MatchNumber => {
            (numbers_or_types_agree(report, import, &a, &b, rule), None)
        }
        ContainerRule::MatchNumberAndType => match (&a.number, &b.number) {
            (None, _) => (true, None),
            (Some(_), None) => (false, Some("new container number")),
            (Some(num_a), Some(num_b)) => {
                if num_a != num_b {
                    (false, None)
                } else if a.kind != b.kind {
                    (false, Some("container type mismatch"))
                } else {
                    (true, None)
                }
            }
        },
    };

    if equal {
        return None;
    }
    Some(FieldDiff {
        field: Field::Container,
        report_value: display_or_raw(&a, report),
        import_value: display_or_raw(&b, import),
        note: note.map(str::to_string),
    })
}

fn numbers_or_types_agree(
    report: &str,
    import: &str,
    a: &ContainerInfo,
    b: &ContainerInfo,
    rule: ContainerRule,
) -> bool {
    match (&a.number, &b.number) {
        (Some(num_a), Some(num_b)) => rule == ContainerRule::PresenceOnly || num_a == num_b,
        (Some(_), None) | (None, Some(_)) => false,
        (None, None) => match (&a.kind, &b.kind) {
            (Some(kind_a), Some(kind_b)) => {
                kind_a == kind_b || kind_a.contains(kind_b.as_str()) || kind_b.contains(kind_a.as_str())
            }
            _ => report.trim().is_empty() && import.trim().is_empty(),
        },
    }
}

fn display_or_raw(info: &ContainerInfo, raw: &str) -> String {
    if info.display.is_empty() {
        raw.trim().to_string()
    } else {
        info.display.clone()
    }
}
