//! Data models for the movie store.

use chrono::NaiveDate;

/// Revenue classification attached to every stored movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieRange {
    EliteBlockBuster,
    BlockBuster,
    Regular,
    Underdog,
    NoClassification,
}

impl MovieRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieRange::EliteBlockBuster => "Elite BlockBuster",
            MovieRange::BlockBuster => "BlockBuster",
            MovieRange::Regular => "Regular",
            MovieRange::Underdog => "Underdog",
            MovieRange::NoClassification => "No Classification",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Elite BlockBuster" => Some(MovieRange::EliteBlockBuster),
            "BlockBuster" => Some(MovieRange::BlockBuster),
            "Regular" => Some(MovieRange::Regular),
            "Underdog" => Some(MovieRange::Underdog),
            "No Classification" => Some(MovieRange::NoClassification),
            _ => None,
        }
    }

    /// Classify a revenue figure. Branch order matters: the BlockBuster and
    /// Regular bands overlap at exactly 160,000,000, and the earlier branch
    /// claims it.
    pub fn for_revenue(revenue: Option<f64>) -> Self {
        match revenue {
            None => MovieRange::NoClassification,
            Some(r) if r > 728_100_000.0 => MovieRange::EliteBlockBuster,
            Some(r) if r >= 160_000_000.0 => MovieRange::BlockBuster,
            Some(r) if r >= 130_000_000.0 => MovieRange::Regular,
            Some(_) => MovieRange::Underdog,
        }
    }
}

/// A stored movie row after reclassification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedMovie {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub genre: String,
    pub director1: String,
    pub cast1: String,
    pub cast2: String,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub movie_range: MovieRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_range_round_trips_through_str() {
        for range in [
            MovieRange::EliteBlockBuster,
            MovieRange::BlockBuster,
            MovieRange::Regular,
            MovieRange::Underdog,
            MovieRange::NoClassification,
        ] {
            assert_eq!(MovieRange::from_str(range.as_str()), Some(range));
        }
        assert_eq!(MovieRange::from_str("Flop"), None);
    }

    #[test]
    fn test_for_revenue_boundaries() {
        assert_eq!(
            MovieRange::for_revenue(Some(728_100_001.0)),
            MovieRange::EliteBlockBuster
        );
        assert_eq!(
            MovieRange::for_revenue(Some(728_100_000.0)),
            MovieRange::BlockBuster
        );
        // The overlapping bound belongs to BlockBuster, not Regular.
        assert_eq!(
            MovieRange::for_revenue(Some(160_000_000.0)),
            MovieRange::BlockBuster
        );
        assert_eq!(
            MovieRange::for_revenue(Some(159_999_999.0)),
            MovieRange::Regular
        );
        assert_eq!(
            MovieRange::for_revenue(Some(130_000_000.0)),
            MovieRange::Regular
        );
        assert_eq!(
            MovieRange::for_revenue(Some(129_999_999.0)),
            MovieRange::Underdog
        );
        assert_eq!(MovieRange::for_revenue(Some(0.0)), MovieRange::Underdog);
        assert_eq!(
            MovieRange::for_revenue(None),
            MovieRange::NoClassification
        );
    }
}
