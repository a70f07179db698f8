//! Query-related models.

use serde::{Deserialize, Serialize};

use super::entry::EntryMetadata;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// A single nearest-neighbor match returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f64,
    /// Absent when the query did not request metadata.
    pub metadata: Option<EntryMetadata>,
}

impl QueryMatch {
    pub fn text(&self) -> &str {
        self.metadata.as_ref().map_or("", |m| m.text.as_str())
    }

    /// `<score to 2 decimals>: <stored text>`
    pub fn render(&self) -> String {
        format!("{:.2}: {}", self.score, self.text())
    }
}

/// Order matches by descending score, keeping provider order for ties.
pub fn sort_by_score(matches: &mut [QueryMatch]) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Render one line per match.
pub fn render_matches(matches: &[QueryMatch]) -> Vec<String> {
    matches.iter().map(QueryMatch::render).collect()
}

/// Matches for one executed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResults {
    pub query: String,
    pub top_k: u32,
    pub matches: Vec<QueryMatch>,
    pub duration_ms: u64,
}

impl QueryResults {
    pub fn new(query: String, top_k: u32, matches: Vec<QueryMatch>, duration_ms: u64) -> Self {
        Self {
            query,
            top_k,
            matches,
            duration_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: &str, score: f64, text: &str) -> QueryMatch {
        QueryMatch {
            id: id.to_string(),
            score,
            metadata: Some(EntryMetadata::new(text)),
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_two_decimals() {
        let line = m("5", 0.87654, "Boston is a beautiful city").render();
        assert_eq!(line, "0.88: Boston is a beautiful city");
    }

    #[test]
    fn test_render_rounds_the_double_score() {
        // 0.845 is stored as 0.84499999..., so it rounds down
        assert_eq!(m("0", 0.845, "t").render(), "0.84: t");
    }

    #[test]
    fn test_render_without_metadata() {
        let matched = QueryMatch {
            id: "1".to_string(),
            score: 0.5,
            metadata: None,
        };
        assert_eq!(matched.render(), "0.50: ");
    }

    #[test]
    fn test_sort_by_score_descending_and_stable() {
        let mut matches = vec![m("0", 0.1, "a"), m("1", 0.9, "b"), m("2", 0.1, "c")];
        sort_by_score(&mut matches);
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "0", "2"]);
    }

    #[test]
    fn test_render_matches() {
        let lines = render_matches(&[m("0", 0.8, "x"), m("1", 0.75, "y")]);
        assert_eq!(lines, vec!["0.80: x", "0.75: y"]);
    }
}
