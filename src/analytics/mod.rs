//! Read-only aggregate queries over the classified movie table.
//!
//! Every query here is a plain SELECT; nothing in this module mutates the
//! table. Rows with a NULL grouping field drop out of the grouped results.

use crate::error::EtlError;
use crate::movie_store::{is_valid_table_name, SqliteMovieStore};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Number of releases in a calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCount {
    pub year: String,
    pub count: i64,
}

/// Total revenue taken in a calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRevenue {
    pub year: String,
    pub revenue: f64,
}

/// Total revenue taken by a genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreRevenue {
    pub genre: String,
    pub revenue: f64,
}

/// A budget/revenue pair for correlation analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRevenuePoint {
    pub title: String,
    pub budget: f64,
    pub revenue: f64,
}

/// Number of movies carrying a classification label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeCount {
    pub movie_range: String,
    pub count: i64,
}

/// Query surface handed to the reporting layer.
pub struct MovieAnalytics {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl MovieAnalytics {
    pub fn new(store: &SqliteMovieStore, table: &str) -> Result<Self> {
        if !is_valid_table_name(table) {
            return Err(EtlError::InvalidTableName {
                name: table.to_string(),
            }
            .into());
        }
        Ok(Self {
            conn: store.connection(),
            table: table.to_string(),
        })
    }

    /// Release counts grouped by the year of the release date, ascending.
    pub fn releases_per_year(&self) -> Result<Vec<YearCount>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT substr(release_date, 1, 4) AS year, COUNT(*) AS n
             FROM {}
             WHERE release_date IS NOT NULL
             GROUP BY year
             ORDER BY year ASC",
            self.table
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(YearCount {
                    year: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Revenue sums grouped by the year of the release date, ascending.
    pub fn revenue_per_year(&self) -> Result<Vec<YearRevenue>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT substr(release_date, 1, 4) AS year, COALESCE(SUM(revenue), 0) AS total
             FROM {}
             WHERE release_date IS NOT NULL
             GROUP BY year
             ORDER BY year ASC",
            self.table
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(YearRevenue {
                    year: row.get(0)?,
                    revenue: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// The `limit` genres with the highest total revenue, descending.
    pub fn top_genres_by_revenue(&self, limit: usize) -> Result<Vec<GenreRevenue>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT genre, COALESCE(SUM(revenue), 0) AS total
             FROM {}
             WHERE revenue IS NOT NULL
             GROUP BY genre
             ORDER BY total DESC
             LIMIT ?1",
            self.table
        ))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(GenreRevenue {
                    genre: row.get(0)?,
                    revenue: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All movies where both budget and revenue are known.
    pub fn budget_revenue_points(&self) -> Result<Vec<BudgetRevenuePoint>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT title, budget, revenue
             FROM {}
             WHERE budget IS NOT NULL AND revenue IS NOT NULL
             ORDER BY rowid",
            self.table
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(BudgetRevenuePoint {
                    title: row.get(0)?,
                    budget: row.get(1)?,
                    revenue: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Movie counts per classification label, most populous first.
    pub fn movie_range_distribution(&self) -> Result<Vec<RangeCount>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT movie_range, COUNT(*) AS n
             FROM {}
             GROUP BY movie_range
             ORDER BY n DESC, movie_range ASC",
            self.table
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RangeCount {
                    movie_range: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::NormalizedMovie;
    use chrono::NaiveDate;

    fn seeded_store() -> SqliteMovieStore {
        let store = SqliteMovieStore::in_memory().unwrap();
        let movies = vec![
            NormalizedMovie {
                title: "A".to_string(),
                release_date: NaiveDate::from_ymd_opt(2000, 1, 1),
                genre: "Action".to_string(),
                director1: "D1".to_string(),
                cast1: "C1".to_string(),
                cast2: "C2".to_string(),
                budget: Some(100_000_000.0),
                revenue: Some(1_000_000_000.0),
            },
            NormalizedMovie {
                title: "B".to_string(),
                release_date: NaiveDate::from_ymd_opt(2010, 6, 15),
                genre: "Drama".to_string(),
                director1: "D2".to_string(),
                cast1: "C3".to_string(),
                cast2: "C4".to_string(),
                budget: Some(20_000_000.0),
                revenue: Some(50_000_000.0),
            },
            NormalizedMovie {
                title: "C".to_string(),
                release_date: NaiveDate::from_ymd_opt(2010, 9, 1),
                genre: "Action".to_string(),
                director1: "D3".to_string(),
                cast1: "C5".to_string(),
                cast2: "C6".to_string(),
                budget: None,
                revenue: Some(200_000_000.0),
            },
            NormalizedMovie {
                title: "D".to_string(),
                release_date: None,
                genre: "Horror".to_string(),
                director1: "D4".to_string(),
                cast1: "C7".to_string(),
                cast2: "C8".to_string(),
                budget: Some(1_000_000.0),
                revenue: None,
            },
        ];
        store.replace_all("movies", &movies).unwrap();
        store.reclassify("movies").unwrap();
        store
    }

    #[test]
    fn test_releases_per_year_skips_null_dates() {
        let store = seeded_store();
        let analytics = MovieAnalytics::new(&store, "movies").unwrap();

        let rows = analytics.releases_per_year().unwrap();
        assert_eq!(
            rows,
            vec![
                YearCount {
                    year: "2000".to_string(),
                    count: 1
                },
                YearCount {
                    year: "2010".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_revenue_per_year_sums_within_group() {
        let store = seeded_store();
        let analytics = MovieAnalytics::new(&store, "movies").unwrap();

        let rows = analytics.revenue_per_year().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, "2000");
        assert_eq!(rows[0].revenue, 1_000_000_000.0);
        assert_eq!(rows[1].year, "2010");
        assert_eq!(rows[1].revenue, 250_000_000.0);
    }

    #[test]
    fn test_top_genres_orders_and_limits() {
        let store = seeded_store();
        let analytics = MovieAnalytics::new(&store, "movies").unwrap();

        let rows = analytics.top_genres_by_revenue(1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].genre, "Action");
        assert_eq!(rows[0].revenue, 1_200_000_000.0);
    }

    #[test]
    fn test_budget_revenue_points_require_both_fields() {
        let store = seeded_store();
        let analytics = MovieAnalytics::new(&store, "movies").unwrap();

        let points = analytics.budget_revenue_points().unwrap();
        let titles: Vec<&str> = points.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_movie_range_distribution_covers_every_row() {
        let store = seeded_store();
        let analytics = MovieAnalytics::new(&store, "movies").unwrap();

        let rows = analytics.movie_range_distribution().unwrap();
        let total: i64 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, 4);
        assert!(rows
            .iter()
            .any(|r| r.movie_range == "No Classification" && r.count == 1));
        assert!(rows
            .iter()
            .any(|r| r.movie_range == "Elite BlockBuster" && r.count == 1));
    }
}
