//! SQLite store implementation.
//!
//! One connection is opened for the whole run and passed explicitly through
//! each pipeline step; components never reach for ambient connection state.

use super::models::{ClassifiedMovie, MovieRange};
use super::schema;
use crate::error::EtlError;
use crate::ingest::NormalizedMovie;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed movie store.
#[derive(Clone)]
pub struct SqliteMovieStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMovieStore {
    /// Open or create the movie database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| EtlError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory store")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Shared handle to the underlying connection, for read-only collaborators.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Store `movies` under `table`, replacing any prior table of that name.
    ///
    /// This is a destructive overwrite, not a merge: the old table is dropped
    /// and rebuilt inside a single transaction. Returns the number of rows
    /// written.
    pub fn replace_all(&self, table: &str, movies: &[NormalizedMovie]) -> Result<usize> {
        ensure_valid_table_name(table)?;

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", table))?;
        tx.execute_batch(&schema::create_staging_table_sql(table))?;

        {
            let mut stmt = tx.prepare(&schema::insert_staging_sql(table))?;
            for movie in movies {
                stmt.execute(params![
                    movie.title,
                    movie
                        .release_date
                        .map(|d| d.format("%Y-%m-%d").to_string()),
                    movie.genre,
                    movie.director1,
                    movie.cast1,
                    movie.cast2,
                    movie.budget,
                    movie.revenue,
                ])?;
            }
        }

        let written: i64 =
            tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        if written as usize != movies.len() {
            bail!(
                "wrote {} rows to '{}' but expected {}",
                written,
                table,
                movies.len()
            );
        }

        tx.commit()?;
        info!(rows = movies.len(), table, "replaced movie table");
        Ok(movies.len())
    }

    /// Derive `movie_range` from revenue and swap the classified table in
    /// place of `table`.
    ///
    /// The derivation, drop, and rename all happen inside one transaction, so
    /// an interrupted run leaves the original table untouched. Returns the row
    /// count, which is verified unchanged by the swap.
    pub fn reclassify(&self, table: &str) -> Result<usize> {
        ensure_valid_table_name(table)?;
        let scratch = format!("{}__classified", table);

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        verify_layout(&tx, table, schema::STAGING_COLUMNS)?;
        let before: i64 =
            tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", scratch))?;
        tx.execute_batch(&schema::create_classified_table_sql(&scratch))?;
        tx.execute_batch(&format!(
            "INSERT INTO {} {}",
            scratch,
            schema::classify_select_sql(table)
        ))?;
        tx.execute_batch(&format!("DROP TABLE {}", table))?;
        tx.execute_batch(&format!("ALTER TABLE {} RENAME TO {}", scratch, table))?;

        let after: i64 =
            tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        if before != after {
            // Dropping the transaction rolls the swap back.
            bail!(
                "reclassification changed the row count of '{}': {} -> {}",
                table,
                before,
                after
            );
        }

        tx.commit()?;
        info!(rows = after, table, "reclassified movie table");
        Ok(after as usize)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn count_rows(&self, table: &str) -> Result<usize> {
        ensure_valid_table_name(table)?;
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    /// Read the whole classified table back in insertion order.
    pub fn fetch_all(&self, table: &str) -> Result<Vec<ClassifiedMovie>> {
        ensure_valid_table_name(table)?;
        let conn = self.conn.lock().unwrap();
        verify_layout(&conn, table, schema::CLASSIFIED_COLUMNS)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT title, release_date, genre, director1, cast1, cast2, budget, revenue, movie_range
             FROM {} ORDER BY rowid",
            table
        ))?;
        let movies = stmt
            .query_map([], row_to_movie)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }
}

fn ensure_valid_table_name(table: &str) -> Result<(), EtlError> {
    if schema::is_valid_table_name(table) {
        Ok(())
    } else {
        Err(EtlError::InvalidTableName {
            name: table.to_string(),
        })
    }
}

/// Compare a table's columns against the expected layout via PRAGMA
/// table_info. Name, order, and declared type must all match.
fn verify_layout(
    conn: &Connection,
    table: &str,
    expected: &[(&str, &str)],
) -> Result<(), EtlError> {
    let mismatch = |details: String| EtlError::SchemaMismatch {
        table: table.to_string(),
        details,
    };

    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| mismatch(e.to_string()))?;
    let actual: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
        .map_err(|e| mismatch(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| mismatch(e.to_string()))?;

    if actual.is_empty() {
        return Err(mismatch("table does not exist".to_string()));
    }
    if actual.len() != expected.len() {
        return Err(mismatch(format!(
            "{} columns, expected {}",
            actual.len(),
            expected.len()
        )));
    }
    for ((name, sql_type), (expected_name, expected_type)) in actual.iter().zip(expected) {
        if name != expected_name || sql_type != expected_type {
            return Err(mismatch(format!(
                "column '{} {}', expected '{} {}'",
                name, sql_type, expected_name, expected_type
            )));
        }
    }
    Ok(())
}

fn row_to_movie(row: &rusqlite::Row) -> rusqlite::Result<ClassifiedMovie> {
    let release_date: Option<String> = row.get("release_date")?;
    let movie_range: String = row.get("movie_range")?;
    Ok(ClassifiedMovie {
        title: row.get("title")?,
        release_date: release_date
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        genre: row.get("genre")?,
        director1: row.get("director1")?,
        cast1: row.get("cast1")?,
        cast2: row.get("cast2")?,
        budget: row.get("budget")?,
        revenue: row.get("revenue")?,
        movie_range: MovieRange::from_str(&movie_range)
            .unwrap_or(MovieRange::NoClassification),
    })
}
