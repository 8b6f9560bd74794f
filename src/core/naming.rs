//! core::naming
//!
//! The module-name to entry-type naming convention.
//!
//! Every code unit exposes exactly one entry type whose name is derived from
//! the unit's name. The registry checks this at registration time so a
//! mismatch is caught at startup instead of at dispatch.

/// Derive the entry type name for a code unit.
///
/// Lowercases the whole name, splits on `_`, capitalizes the first character
/// of each segment, and concatenates the segments. Empty segments contribute
/// nothing.
///
/// # Example
///
/// ```
/// use taskshim::core::naming::entry_type_name;
///
/// assert_eq!(entry_type_name("billing_task"), "BillingTask");
/// assert_eq!(entry_type_name("sync"), "Sync");
/// ```
pub fn entry_type_name(module: &str) -> String {
    module
        .to_lowercase()
        .split('_')
        .map(capitalize)
        .collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
