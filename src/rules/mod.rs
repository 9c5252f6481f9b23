// Pure reconciliation rules: PO extraction, value normalization, comparison and the PO join.

pub mod compare;
pub mod container;
pub mod eta;
pub mod matching;
pub mod po;
pub mod vessel;
