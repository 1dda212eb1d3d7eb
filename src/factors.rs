//! The factor table: human-readable ranking-strategy labels and their
//! integer field selectors, shared between the web front door and the
//! analyzer's report modes.

/// Display labels, indexed by field selector. Order matters: position in
/// this array IS the integer mode passed to the `d3`/`text` report passes.
pub const FACTOR_LABELS: [&str; 26] = [
    "frequency",
    "fixed bugs",
    "oldest change",
    "newest change",
    "frequency aged by commit ages",
    "fixed bugs aged by commit ages",
    "frequency aged by most recent newest file change",
    "fixed bugs aged by most recent newest file change",
    "frequency aged by most recent oldest file change",
    "fixed bugs aged by most recent oldest file change",
    "frequency aged by commit ages * newest change",
    "fixed bugs aged by commit ages * newest change",
    "custom formula",
    "custom formula freq1",
    "custom formula freq2",
    "custom formula bug1",
    "custom formula bug2",
    "custom formula freqonly",
    "custom formula bugonly",
    "custom formula more newest change",
    "custom formula freq1 more newest change",
    "custom formula freq2 more newest change",
    "custom formula bug1 more newest change",
    "custom formula bug2 more newest change",
    "custom formula freqonly more newest change",
    "custom formula bugonly more newest change",
];

/// Number of implemented file-level ranking fields.
pub const FIELD_COUNT: usize = FACTOR_LABELS.len();

/// Field used when a request names no factor or an unknown one.
pub const DEFAULT_FACTOR: usize = 0;

/// Exact-match lookup from label to field selector.
pub fn factor_index(label: Option<&str>) -> usize {
    label
        .and_then(|l| FACTOR_LABELS.iter().position(|known| *known == l))
        .unwrap_or(DEFAULT_FACTOR)
}

/// Display name for a field selector, used in report headers.
pub fn field_name(n: usize) -> &'static str {
    FACTOR_LABELS.get(n).copied().unwrap_or("unknown field")
}
