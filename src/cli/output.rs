use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::models::{OutputFormat, QueryResults, StoreReport, render_matches};

pub trait Formatter {
    fn format_query_results(&self, results: &QueryResults) -> String;
    fn format_store_report(&self, report: &StoreReport) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub driver: String,
    pub index: String,
    pub location: String,
    pub embedding_model: String,
    pub connected: bool,
    pub total_vectors: u64,
    pub dimension: Option<u32>,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_query_results(&self, results: &QueryResults) -> String {
        let mut output = String::new();
        for line in render_matches(&results.matches) {
            writeln!(output, "{line}").unwrap();
        }
        output
    }

    fn format_store_report(&self, report: &StoreReport) -> String {
        let mut output = String::new();
        writeln!(output, "Indexing Complete").unwrap();
        writeln!(output, "-----------------").unwrap();
        writeln!(output, "Batches:     {}", report.batches).unwrap();
        writeln!(output, "Entries:     {}", report.entries).unwrap();
        writeln!(output, "Next offset: {}", report.next_offset).unwrap();
        writeln!(output, "Duration:    {}ms", report.duration_ms).unwrap();
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();
        writeln!(output, "Embedding:     {}", status.embedding_model).unwrap();

        let index_status = if status.connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(output, "Vector Index:  {} ({})", status.driver, index_status).unwrap();
        writeln!(output, "  Location:    {}", status.location).unwrap();
        writeln!(output, "  Index:       {}", status.index).unwrap();
        if status.connected {
            writeln!(output, "  Vectors:     {}", status.total_vectors).unwrap();
            if let Some(dimension) = status.dimension {
                writeln!(output, "  Dimension:   {}", dimension).unwrap();
            }
        }
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        let mut output = rendered
            .unwrap_or_else(|e| serde_json::json!({"error": e.to_string()}).to_string());
        output.push('\n');
        output
    }
}

impl Formatter for JsonFormatter {
    fn format_query_results(&self, results: &QueryResults) -> String {
        self.render(results)
    }

    fn format_store_report(&self, report: &StoreReport) -> String {
        self.render(report)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        self.render(status)
    }

    fn format_message(&self, message: &str) -> String {
        self.render(&serde_json::json!({"message": message}))
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryMetadata, QueryMatch};

    fn results() -> QueryResults {
        QueryResults::new(
            "What is Boston known for?".to_string(),
            5,
            vec![
                QueryMatch {
                    id: "5".to_string(),
                    score: 0.8712,
                    metadata: Some(EntryMetadata::new(
                        "Boston is a beautiful city full of exciting places to visit",
                    )),
                },
                QueryMatch {
                    id: "4".to_string(),
                    score: 0.7449,
                    metadata: Some(EntryMetadata::new("Tea is one of the worlds oldest drinks")),
                },
            ],
            12,
        )
    }

    #[test]
    fn test_text_matches_one_line_each() {
        let output = TextFormatter.format_query_results(&results());
        assert_eq!(
            output,
            "0.87: Boston is a beautiful city full of exciting places to visit\n\
             0.74: Tea is one of the worlds oldest drinks\n"
        );
    }

    #[test]
    fn test_json_matches() {
        let output = JsonFormatter::new(false).format_query_results(&results());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["matches"][0]["id"], "5");
        assert_eq!(
            value["matches"][1]["metadata"]["text"],
            "Tea is one of the worlds oldest drinks"
        );
    }

    #[test]
    fn test_text_status_disconnected_hides_counts() {
        let status = StatusInfo {
            driver: "pinecone".to_string(),
            index: "openai".to_string(),
            location: "https://openai-abc.svc.env.pinecone.io".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            connected: false,
            total_vectors: 0,
            dimension: None,
        };
        let output = TextFormatter.format_status(&status);
        assert!(output.contains("[DISCONNECTED]"));
        assert!(!output.contains("Vectors:"));
    }

    #[test]
    fn test_store_report_text() {
        let report = StoreReport {
            batches: 2,
            entries: 3,
            next_offset: 3,
            duration_ms: 40,
        };
        let output = TextFormatter.format_store_report(&report);
        assert!(output.contains("Entries:     3"));
    }
}
