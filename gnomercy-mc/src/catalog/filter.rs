//! Filter compilation
//!
//! Translates the listing page's filter state into a query description:
//! a conjunction of equality predicates plus exactly one ordering clause.

use serde::Deserialize;

/// Listing filter state, as carried in the URL query string
///
/// Fields stay raw strings on purpose. Each non-empty value becomes an
/// equality predicate bound as-is, so a value outside the known enums
/// compares against no stored row and yields an empty result instead of an
/// error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub players: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Recognized sort keys
///
/// `"Review"` sorts by review count; `"Rating"`, an absent value, and any
/// unrecognized value all order by average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Rating,
    Review,
}

impl SortKey {
    fn from_param(value: Option<&str>) -> SortKey {
        match value {
            Some("Review") => SortKey::Review,
            _ => SortKey::Rating,
        }
    }

    /// ORDER BY body, with a module-id tiebreak so emissions are
    /// deterministic when sort keys collide
    pub fn order_clause(&self) -> &'static str {
        match self {
            SortKey::Rating => "avg_rating DESC, module_id ASC",
            SortKey::Review => "num_ratings DESC, module_id ASC",
        }
    }
}

/// Compiled query description
///
/// Predicates pair a column name from the fixed set below with the value to
/// bind; the SQL text never interpolates user input.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledListing {
    pub predicates: Vec<(&'static str, String)>,
    pub sort: SortKey,
}

impl ListingFilter {
    /// Compile this filter state into a query description
    pub fn compile(&self) -> CompiledListing {
        let mut predicates = Vec::new();
        if let Some(genre) = non_empty(&self.genre) {
            predicates.push(("genre", genre.to_string()));
        }
        if let Some(players) = non_empty(&self.players) {
            predicates.push(("players", players.to_string()));
        }
        if let Some(difficulty) = non_empty(&self.difficulty) {
            // Bound as text against the INTEGER column: numeric input
            // converts under SQLite's comparison affinity, anything else
            // stays TEXT and matches no rows.
            predicates.push(("difficulty", difficulty.to_string()));
        }

        CompiledListing {
            predicates,
            sort: SortKey::from_param(non_empty(&self.sort)),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CompiledListing {
    /// WHERE clause fragment, empty when the filter has no predicates
    pub fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let conditions: Vec<String> = self
            .predicates
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect();
        format!(" WHERE {}", conditions.join(" AND "))
    }

    /// ORDER BY body for the listing query
    pub fn order_clause(&self) -> &'static str {
        self.sort.order_clause()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(
        genre: Option<&str>,
        players: Option<&str>,
        difficulty: Option<&str>,
        sort: Option<&str>,
    ) -> ListingFilter {
        ListingFilter {
            genre: genre.map(str::to_string),
            players: players.map(str::to_string),
            difficulty: difficulty.map(str::to_string),
            sort: sort.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_filter_compiles_to_default_ordering() {
        let compiled = ListingFilter::default().compile();
        assert!(compiled.predicates.is_empty());
        assert_eq!(compiled.sort, SortKey::Rating);
        assert_eq!(compiled.where_clause(), "");
        assert_eq!(compiled.order_clause(), "avg_rating DESC, module_id ASC");
    }

    #[test]
    fn test_genre_with_review_sort() {
        let compiled = filter(Some("Horror"), None, None, Some("Review")).compile();
        assert_eq!(
            compiled.predicates,
            vec![("genre", "Horror".to_string())]
        );
        assert_eq!(compiled.sort, SortKey::Review);
        assert_eq!(compiled.where_clause(), " WHERE genre = ?");
        assert_eq!(compiled.order_clause(), "num_ratings DESC, module_id ASC");
    }

    #[test]
    fn test_all_predicates_join_with_and() {
        let compiled = filter(Some("Fantasy"), Some("Four"), Some("3"), None).compile();
        assert_eq!(
            compiled.where_clause(),
            " WHERE genre = ? AND players = ? AND difficulty = ?"
        );
        assert_eq!(
            compiled.predicates,
            vec![
                ("genre", "Fantasy".to_string()),
                ("players", "Four".to_string()),
                ("difficulty", "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_sort_falls_back_to_rating() {
        let compiled = filter(None, None, None, Some("Unknown")).compile();
        assert_eq!(compiled.sort, SortKey::Rating);
        assert_eq!(compiled.order_clause(), "avg_rating DESC, module_id ASC");
    }

    #[test]
    fn test_explicit_rating_sort_matches_default() {
        let explicit = filter(None, None, None, Some("Rating")).compile();
        let default = ListingFilter::default().compile();
        assert_eq!(explicit.sort, default.sort);
    }

    #[test]
    fn test_empty_strings_are_absent_values() {
        let compiled = filter(Some(""), Some("  "), Some(""), Some("")).compile();
        assert!(compiled.predicates.is_empty());
        assert_eq!(compiled.sort, SortKey::Rating);
    }

    #[test]
    fn test_missing_fields_deserialize_as_absent() {
        let parsed: ListingFilter =
            serde_json::from_str(r#"{"genre":"Horror","sort":"Review"}"#).unwrap();
        let compiled = parsed.compile();
        assert_eq!(compiled.predicates, vec![("genre", "Horror".to_string())]);
        assert_eq!(compiled.sort, SortKey::Review);
    }
}
