//! Schema definitions for movie tables.
//!
//! The target table name is caller-supplied, so every DDL string is built
//! against a validated identifier. Dates are stored as ISO-8601 TEXT and
//! monetary amounts as REAL; NULL is the missing-value marker throughout.

/// Column layout of the staging (pre-classification) table.
pub const STAGING_COLUMNS: &[(&str, &str)] = &[
    ("title", "TEXT"),
    ("release_date", "TEXT"),
    ("genre", "TEXT"),
    ("director1", "TEXT"),
    ("cast1", "TEXT"),
    ("cast2", "TEXT"),
    ("budget", "REAL"),
    ("revenue", "REAL"),
];

/// Column layout after reclassification.
pub const CLASSIFIED_COLUMNS: &[(&str, &str)] = &[
    ("title", "TEXT"),
    ("release_date", "TEXT"),
    ("genre", "TEXT"),
    ("director1", "TEXT"),
    ("cast1", "TEXT"),
    ("cast2", "TEXT"),
    ("budget", "REAL"),
    ("revenue", "REAL"),
    ("movie_range", "TEXT"),
];

/// Returns true if `name` is a plain SQL identifier safe to splice into DDL.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn column_defs(columns: &[(&str, &str)]) -> String {
    columns
        .iter()
        .map(|(name, sql_type)| format!("{} {}", name, sql_type))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_staging_table_sql(table: &str) -> String {
    format!("CREATE TABLE {} ({})", table, column_defs(STAGING_COLUMNS))
}

pub fn create_classified_table_sql(table: &str) -> String {
    format!("CREATE TABLE {} ({})", table, column_defs(CLASSIFIED_COLUMNS))
}

pub fn insert_staging_sql(table: &str) -> String {
    format!(
        "INSERT INTO {} (title, release_date, genre, director1, cast1, cast2, budget, revenue)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        table
    )
}

/// SELECT that derives `movie_range` from revenue.
///
/// Branches are evaluated top to bottom and must stay in lockstep with
/// `MovieRange::for_revenue`: the BlockBuster and Regular bands overlap at
/// exactly 160,000,000 and the earlier branch claims it.
pub fn classify_select_sql(source: &str) -> String {
    format!(
        "SELECT title, release_date, genre, director1, cast1, cast2, budget, revenue,
                CASE
                    WHEN revenue IS NULL THEN 'No Classification'
                    WHEN revenue > 728100000.0 THEN 'Elite BlockBuster'
                    WHEN revenue >= 160000000.0 THEN 'BlockBuster'
                    WHEN revenue >= 130000000.0 THEN 'Regular'
                    ELSE 'Underdog'
                END AS movie_range
         FROM {}",
        source
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_table_name() {
        assert!(is_valid_table_name("movies"));
        assert!(is_valid_table_name("movies__classified"));
        assert!(is_valid_table_name("_t1"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("1movies"));
        assert!(!is_valid_table_name("movies; DROP TABLE users"));
        assert!(!is_valid_table_name("mov-ies"));
    }

    #[test]
    fn test_staging_ddl_lists_every_column() {
        let sql = create_staging_table_sql("movies");
        for (name, _) in STAGING_COLUMNS {
            assert!(sql.contains(name), "missing column {name} in {sql}");
        }
    }
}
