//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads accept `&PgPool` as the first argument. Writes that must commit
//! together with other writes accept `&mut PgConnection`, normally the
//! connection behind an open transaction.

pub mod asset_repo;
pub mod audit_repo;
pub mod service_repo;

pub use asset_repo::AssetRepo;
pub use audit_repo::AuditRepo;
pub use service_repo::ServiceRepo;

/// Escape `%`, `_` and `\` so user input matches literally inside an
/// `ILIKE` pattern, then wrap it for a substring match.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("lt-01"), "%lt-01%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
