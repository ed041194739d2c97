//! Parsing of `route:list` output.
//!
//! Structured JSON is tried first. Output that is not JSON at all is read as
//! the human-readable table: header skipped, each row split on whitespace.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PanelError, Result};

/// Minimum tokens a table row needs to be read as a route.
const MIN_TABLE_TOKENS: usize = 3;

/// One entry of the application's routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub method: String,
    pub uri: String,
    /// Empty when the route is unnamed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    pub action: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RouteRecord {
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        name: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            name: name.into(),
            action: action.into(),
        }
    }
}

/// Outcome of reading route output with both strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteParse {
    Parsed(Vec<RouteRecord>),
    /// Neither strategy produced routes; carries the raw text.
    Unparseable(String),
}

impl RouteParse {
    /// Records when parsed, an empty set otherwise.
    pub fn into_records(self) -> Vec<RouteRecord> {
        match self {
            RouteParse::Parsed(records) => records,
            RouteParse::Unparseable(_) => Vec::new(),
        }
    }

    /// Records when parsed, [`PanelError::ParseWarning`] otherwise.
    pub fn into_result(self) -> Result<Vec<RouteRecord>> {
        match self {
            RouteParse::Parsed(records) => Ok(records),
            RouteParse::Unparseable(raw) => Err(PanelError::ParseWarning(first_line(&raw))),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, RouteParse::Parsed(_))
    }
}

fn first_line(raw: &str) -> String {
    raw.trim().lines().next().unwrap_or_default().to_string()
}

/// Parse `route:list` output.
///
/// - Blank output is an empty route set.
/// - A JSON array of route objects is used as is.
/// - Valid JSON of any other shape is `Unparseable`; it is not a table.
/// - Otherwise the table heuristic runs, and is `Unparseable` when it
///   yields no rows.
pub fn parse_route_output(output: &str) -> RouteParse {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return RouteParse::Parsed(Vec::new());
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => match serde_json::from_value::<Vec<RouteRecord>>(value) {
            Ok(records) => RouteParse::Parsed(records),
            Err(e) => {
                tracing::warn!(error = %e, "route JSON has an unexpected shape");
                RouteParse::Unparseable(output.to_string())
            }
        },
        Err(_) => {
            let records = parse_route_table(trimmed);
            if records.is_empty() {
                RouteParse::Unparseable(output.to_string())
            } else {
                RouteParse::Parsed(records)
            }
        }
    }
}

/// Best-effort reading of the tabular listing.
///
/// Token 0 is the method, token 1 the URI and the rest the action. The name
/// column is never read, so rows that include one end up with the name
/// glued onto the action.
pub fn parse_route_table(output: &str) -> Vec<RouteRecord> {
    output
        .trim()
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < MIN_TABLE_TOKENS {
                return None;
            }
            Some(RouteRecord::new(
                parts[0],
                parts[1],
                "",
                parts[2..].join(" "),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_fallback_reads_single_row() {
        let output = "Method URI Action\nGET /users UserController@index\n";
        assert_eq!(
            parse_route_output(output),
            RouteParse::Parsed(vec![RouteRecord::new(
                "GET",
                "/users",
                "",
                "UserController@index"
            )])
        );
    }

    #[test]
    fn test_table_skips_short_rows_and_joins_action() {
        let output = "\
Method URI Action
+--------+
GET|HEAD api/posts App\\Http\\Controllers\\PostController@index web auth
POST /login
";
        let records = parse_route_table(output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, "GET|HEAD");
        assert_eq!(records[0].uri, "api/posts");
        assert_eq!(
            records[0].action,
            "App\\Http\\Controllers\\PostController@index web auth"
        );
        assert_eq!(records[0].name, "");
    }

    #[test]
    fn test_named_table_row_is_not_split_out() {
        let output = "Method URI Name Action\nGET /users users.index UserController@index\n";
        let records = parse_route_table(output);
        assert_eq!(records[0].name, "");
        assert_eq!(records[0].action, "users.index UserController@index");
    }

    #[test]
    fn test_json_output_is_preferred() {
        let output = r#"[
            {"domain":null,"method":"GET|HEAD","uri":"\/","name":null,"action":"Closure","middleware":["web"]},
            {"domain":null,"method":"POST","uri":"login","name":"login","action":"App\\Http\\Controllers\\AuthController@login","middleware":["web","guest"]}
        ]"#;

        let records = parse_route_output(output).into_result().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], RouteRecord::new("GET|HEAD", "/", "", "Closure"));
        assert_eq!(records[1].name, "login");
        assert_eq!(
            records[1].action,
            "App\\Http\\Controllers\\AuthController@login"
        );
    }

    #[test]
    fn test_json_without_name_field() {
        let output = r#"[{"method":"GET","uri":"ping","action":"Closure"}]"#;
        let records = parse_route_output(output).into_records();
        assert_eq!(records, vec![RouteRecord::new("GET", "ping", "", "Closure")]);
    }

    #[test]
    fn test_empty_json_array_is_empty_set() {
        assert_eq!(parse_route_output("[]"), RouteParse::Parsed(Vec::new()));
    }

    #[test]
    fn test_blank_output_is_empty_set() {
        assert_eq!(parse_route_output("  \n"), RouteParse::Parsed(Vec::new()));
    }

    #[test]
    fn test_json_of_wrong_shape_is_unparseable() {
        let output = "{\n  \"message\": \"Your application doesn't have any routes.\"\n}";
        let parsed = parse_route_output(output);
        assert!(!parsed.is_parsed());
        assert_eq!(parsed.clone().into_records(), Vec::new());
        assert!(matches!(
            parsed.into_result(),
            Err(PanelError::ParseWarning(_))
        ));
    }

    #[test]
    fn test_text_without_rows_is_unparseable() {
        let output = "Your application doesn't have any routes matching the given criteria.";
        assert_eq!(
            parse_route_output(output),
            RouteParse::Unparseable(output.to_string())
        );
    }
}
