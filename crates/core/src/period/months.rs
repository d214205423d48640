//! Month-name lookup for the period resolver.
//!
//! Names are the Spanish forms the assistant receives, lower-cased. The
//! resolver lower-cases its input before matching, so lookups here are
//! exact comparisons.

const MONTHS: [(&str, u32); 12] = [
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

/// Resolve a lower-cased month name to its 1..=12 number.
pub(crate) fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|&(_, number)| number)
}
