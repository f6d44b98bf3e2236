//! JSON shapes exchanged with the indexing backend.
//!
//! Responses are decoded into these structs and converted to the domain
//! entities in [`crate::model`] right away; nothing past this module sees a
//! raw payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Chunk, IndexInfo, QueryResult};

#[derive(Debug, Serialize)]
pub struct IndexRequest<'a> {
    pub repo_url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub question: &'a str,
    pub top_k: i64,
}

#[derive(Debug, Deserialize)]
pub struct IndexResponse {
    pub repo: String,
    pub num_files: u64,
    pub num_chunks: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub skipped_files: Option<u64>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RetrievedChunk {
    pub filepath: String,
    #[serde(default)]
    pub symbol_name: Option<String>,
    pub similarity_score: f64,
    pub content: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub chunk_type: Option<String>,
    #[serde(default)]
    pub start_line: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    /// Echo of the request; the client keeps its own copy.
    pub question: String,
    pub answer: String,
    pub num_chunks_retrieved: u64,
    pub retrieved_chunks: Vec<RetrievedChunk>,
    #[serde(default)]
    pub repo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Pulls a string `detail` out of an error body. A body that is not JSON is
/// an error; a JSON body whose `detail` is missing or not a string
/// (validation error lists) yields `Ok(None)`.
pub fn error_detail(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    let parsed: ErrorBody = serde_json::from_slice(body)?;
    Ok(match parsed.detail {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

impl From<IndexResponse> for IndexInfo {
    fn from(wire: IndexResponse) -> Self {
        IndexInfo {
            repository: wire.repo,
            file_count: wire.num_files,
            chunk_count: wire.num_chunks,
            languages: wire.languages.unwrap_or_default(),
            skipped_files: wire.skipped_files,
            message: wire.message,
        }
    }
}

impl From<RetrievedChunk> for Chunk {
    fn from(wire: RetrievedChunk) -> Self {
        Chunk {
            filepath: wire.filepath,
            symbol_name: wire.symbol_name.filter(|s| !s.is_empty()),
            similarity_score: wire.similarity_score,
            content: wire.content,
            language: wire.language,
            chunk_type: wire.chunk_type,
            start_line: wire.start_line,
        }
    }
}

impl QueryResponse {
    /// Builds the result around the question as it was submitted; the
    /// backend's echo is ignored.
    pub fn into_result(self, question: &str, received_at: DateTime<Utc>) -> QueryResult {
        QueryResult {
            question: question.to_string(),
            answer: self.answer,
            retrieved_chunks: self.retrieved_chunks.into_iter().map(Chunk::from).collect(),
            chunk_count: self.num_chunks_retrieved,
            repository: self.repo,
            received_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_response_accepts_minimal_and_full_payloads() {
        let minimal: IndexResponse = serde_json::from_value(json!({
            "repo": "https://github.com/acme/widgets",
            "num_files": 42,
            "num_chunks": 310
        }))
        .unwrap();
        let info = IndexInfo::from(minimal);
        assert_eq!(info.file_count, 42);
        assert!(info.languages.is_empty());
        assert_eq!(info.skipped_files, None);

        let full: IndexResponse = serde_json::from_value(json!({
            "message": "Repository indexed successfully.",
            "repo": "https://github.com/acme/widgets",
            "num_files": 3,
            "num_chunks": 9,
            "skipped_files": 2,
            "languages": ["python", "rust"]
        }))
        .unwrap();
        let info = IndexInfo::from(full);
        assert_eq!(info.languages, vec!["python", "rust"]);
        assert_eq!(info.skipped_files, Some(2));
    }

    #[test]
    fn negative_counts_do_not_decode() {
        let parsed = serde_json::from_value::<IndexResponse>(json!({
            "repo": "x", "num_files": -1, "num_chunks": 0
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn chunk_symbol_is_absent_when_missing_null_or_empty() {
        for symbol in [json!(null), json!("")] {
            let wire: RetrievedChunk = serde_json::from_value(json!({
                "filepath": "a.py",
                "symbol_name": symbol,
                "similarity_score": 0.5,
                "content": "x"
            }))
            .unwrap();
            assert_eq!(Chunk::from(wire).symbol_name, None);
        }

        let wire: RetrievedChunk = serde_json::from_value(json!({
            "filepath": "a.py", "similarity_score": 0.5, "content": "x"
        }))
        .unwrap();
        assert_eq!(Chunk::from(wire).symbol_name, None);
    }

    #[test]
    fn query_response_keeps_transmitted_count_and_order() {
        let wire: QueryResponse = serde_json::from_value(json!({
            "question": "q",
            "answer": "a",
            "num_chunks_retrieved": 7,
            "retrieved_chunks": [
                {"filepath": "low.py", "similarity_score": 0.1, "content": ""},
                {"filepath": "high.py", "similarity_score": 0.9, "content": ""}
            ]
        }))
        .unwrap();
        let result = wire.into_result("q", Utc::now());
        assert_eq!(result.chunk_count, 7);
        let paths: Vec<_> = result.retrieved_chunks.iter().map(|c| c.filepath.as_str()).collect();
        assert_eq!(paths, vec!["low.py", "high.py"]);
    }

    #[test]
    fn result_question_is_the_submitted_text() {
        let wire: QueryResponse = serde_json::from_value(json!({
            "question": "  What does foo do?  ",
            "answer": "a",
            "num_chunks_retrieved": 0,
            "retrieved_chunks": []
        }))
        .unwrap();
        let result = wire.into_result("what does foo do?", Utc::now());
        assert_eq!(result.question, "what does foo do?");
    }

    #[test]
    fn error_detail_extraction() {
        assert_eq!(
            error_detail(br#"{"detail":"No index found."}"#).unwrap().as_deref(),
            Some("No index found.")
        );
        assert_eq!(error_detail(br#"{}"#).unwrap(), None);
        assert_eq!(
            error_detail(br#"{"detail":[{"msg":"field required"}]}"#).unwrap(),
            None
        );
        assert!(error_detail(b"Internal Server Error").is_err());
        assert!(error_detail(b"<html>Bad Gateway</html>").is_err());
        assert!(error_detail(b"").is_err());
    }

    #[test]
    fn requests_serialize_with_backend_field_names() {
        let body = serde_json::to_value(QueryRequest { question: "why?", top_k: 25 }).unwrap();
        assert_eq!(body, json!({"question": "why?", "top_k": 25}));
        let body = serde_json::to_value(IndexRequest { repo_url: "u" }).unwrap();
        assert_eq!(body, json!({"repo_url": "u"}));
    }
}
