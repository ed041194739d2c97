use super::parse::RouteRecord;

impl RouteRecord {
    /// Case-insensitive substring match against every column.
    /// `needle` must already be lowercase.
    fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.method, &self.uri, &self.name, &self.action]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Routes whose method, URI, name or action contain `query`, ignoring case,
/// in their original order. An empty query keeps every route.
pub fn filter_routes<'a>(records: &'a [RouteRecord], query: &str) -> Vec<&'a RouteRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| record.matches_lowercase(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<RouteRecord> {
        vec![
            RouteRecord::new("GET|HEAD", "/", "", "Closure"),
            RouteRecord::new("GET|HEAD", "api/users", "users.index", "UserController@index"),
            RouteRecord::new("POST", "api/users", "users.store", "UserController@store"),
            RouteRecord::new("DELETE", "api/posts/{post}", "posts.destroy", "PostController@destroy"),
        ]
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let records = sample();
        let filtered = filter_routes(&records, "");
        assert_eq!(filtered, records.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_matches_any_column_case_insensitively() {
        let records = sample();

        let by_method: Vec<&str> = filter_routes(&records, "post")
            .iter()
            .map(|r| r.uri.as_str())
            .collect();
        // "post" hits the POST method and the posts URI/name/action
        assert_eq!(by_method, vec!["api/users", "api/posts/{post}"]);

        assert_eq!(filter_routes(&records, "USERS.INDEX").len(), 1);
        assert_eq!(filter_routes(&records, "closure").len(), 1);
    }

    #[test]
    fn test_result_is_subsequence_of_input() {
        let records = sample();
        for query in ["a", "api", "zzz", "@", "{"] {
            let filtered = filter_routes(&records, query);
            let mut rest = records.iter();
            for hit in &filtered {
                assert!(rest.any(|r| r == *hit), "out of order for {:?}", query);
            }
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let once: Vec<RouteRecord> = filter_routes(&records, "users")
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<RouteRecord> = filter_routes(&once, "users").into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_match_is_empty() {
        let records = sample();
        assert!(filter_routes(&records, "nothing-like-this").is_empty());
    }
}
