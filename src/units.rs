use once_cell::sync::Lazy;
use std::collections::HashMap;

const KILO: u128 = 1000;
const KIBI: u128 = 1024;

/// Families of recognized unit prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFamily {
    /// Decimal prefixes, powers of 1000 (kB, MB, GB, ...).
    Metric,
    /// Binary prefixes with an `i` infix, powers of 1024 (KiB, MiB, ...).
    Iec,
    /// Lower-case metric-looking aliases that actually denote binary
    /// multipliers, kept for backward compatibility (`k` = 1024, `m` =
    /// 1024^2, ...).
    Legacy,
}

/// Metric/decimal prefixes. `K` is preferred, `k` accepted.
pub const METRIC: &[(&str, u128)] = &[
    ("k", KILO),
    ("K", KILO),
    ("M", KILO.pow(2)),
    ("G", KILO.pow(3)),
    ("T", KILO.pow(4)),
    ("P", KILO.pow(5)),
    ("E", KILO.pow(6)),
    ("Z", KILO.pow(7)),
    ("Y", KILO.pow(8)),
];

/// Binary IEC prefixes.
pub const IEC: &[(&str, u128)] = &[
    ("Ki", KIBI),
    ("Mi", KIBI.pow(2)),
    ("Gi", KIBI.pow(3)),
    ("Ti", KIBI.pow(4)),
    ("Pi", KIBI.pow(5)),
    ("Ei", KIBI.pow(6)),
    ("Zi", KIBI.pow(7)),
    ("Yi", KIBI.pow(8)),
];

/// Nonstandard aliases for the IEC multipliers.
pub const LEGACY: &[(&str, u128)] = &[
    ("k", KIBI),
    ("ki", KIBI),
    ("K", KIBI),
    ("m", KIBI.pow(2)),
    ("mi", KIBI.pow(2)),
    ("M", KIBI.pow(2)),
    ("g", KIBI.pow(3)),
    ("gi", KIBI.pow(3)),
    ("G", KIBI.pow(3)),
    ("t", KIBI.pow(4)),
    ("ti", KIBI.pow(4)),
    ("T", KIBI.pow(4)),
    ("p", KIBI.pow(5)),
    ("pi", KIBI.pow(5)),
    ("P", KIBI.pow(5)),
    ("e", KIBI.pow(6)),
    ("ei", KIBI.pow(6)),
    ("E", KIBI.pow(6)),
    ("z", KIBI.pow(7)),
    ("zi", KIBI.pow(7)),
    ("Z", KIBI.pow(7)),
    ("y", KIBI.pow(8)),
    ("yi", KIBI.pow(8)),
    ("Y", KIBI.pow(8)),
];

// Canonical display token per multiplier, descending, one list per family.
// These double as the auto-scaling scan order and the reverse lookup.
const METRIC_SCAN: &[(u128, &str)] = &[
    (KILO.pow(8), "Y"),
    (KILO.pow(7), "Z"),
    (KILO.pow(6), "E"),
    (KILO.pow(5), "P"),
    (KILO.pow(4), "T"),
    (KILO.pow(3), "G"),
    (KILO.pow(2), "M"),
    (KILO, "K"),
];

const IEC_SCAN: &[(u128, &str)] = &[
    (KIBI.pow(8), "Yi"),
    (KIBI.pow(7), "Zi"),
    (KIBI.pow(6), "Ei"),
    (KIBI.pow(5), "Pi"),
    (KIBI.pow(4), "Ti"),
    (KIBI.pow(3), "Gi"),
    (KIBI.pow(2), "Mi"),
    (KIBI, "Ki"),
];

const LEGACY_SCAN: &[(u128, &str)] = &[
    (KIBI.pow(8), "Y"),
    (KIBI.pow(7), "Z"),
    (KIBI.pow(6), "E"),
    (KIBI.pow(5), "P"),
    (KIBI.pow(4), "T"),
    (KIBI.pow(3), "G"),
    (KIBI.pow(2), "M"),
    (KIBI, "K"),
];

// Metric and IEC interleaved by magnitude, for the full-table auto mode.
static FULL_SCAN: Lazy<Vec<(u128, &'static str)>> = Lazy::new(|| {
    let mut all: Vec<_> = METRIC_SCAN.iter().chain(IEC_SCAN).copied().collect();
    all.sort_by(|a, b| b.0.cmp(&a.0));
    all
});

// Union lookup for parsing. Standard tables overlay the legacy aliases, so
// `k`/`K` stay decimal while `ki`/`m`/`g`... resolve binary.
static PARSE_TABLE: Lazy<HashMap<&'static str, u128>> = Lazy::new(|| {
    LEGACY
        .iter()
        .chain(METRIC)
        .chain(IEC)
        .copied()
        .collect::<HashMap<_, _>>()
});

// Standard-family tokens ordered longest first, so suffix scans match `Ki`
// before `K`.
static FIXED_TOKENS: Lazy<Vec<(&'static str, u128)>> = Lazy::new(|| {
    let mut tokens: Vec<_> = METRIC.iter().chain(IEC).copied().collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    tokens
});

/// Look up a prefix token across all families.
pub fn multiplier_for(token: &str) -> Option<u128> {
    PARSE_TABLE.get(token).copied()
}

/// Canonical display token for a multiplier within one family.
pub fn token_for(multiplier: u128, family: UnitFamily) -> Option<&'static str> {
    scan_table(family)
        .iter()
        .find(|(m, _)| *m == multiplier)
        .map(|(_, token)| *token)
}

/// Auto-scaling scan list for one family: (multiplier, canonical token),
/// descending by multiplier.
pub fn scan_table(family: UnitFamily) -> &'static [(u128, &'static str)] {
    match family {
        UnitFamily::Metric => METRIC_SCAN,
        UnitFamily::Iec => IEC_SCAN,
        UnitFamily::Legacy => LEGACY_SCAN,
    }
}

/// Auto-scaling scan list across metric and IEC together.
pub fn full_scan_table() -> &'static [(u128, &'static str)] {
    &FULL_SCAN
}

/// Standard-family tokens ordered longest first.
pub fn tokens_by_length_desc() -> &'static [(&'static str, u128)] {
    &FIXED_TOKENS
}
