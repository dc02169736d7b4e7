//! 内容与文档请求演示工具

use crate::tools::descriptor::{ParamKind as K, ParamSpec as P, ToolDescriptor};

pub const INSTRUCTIONS: &str = include_str!("../../../prompts/docs.md");

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "log_content_request",
            "Log a new request for content creation or updates.",
            vec![
                P::required("requester", K::String, "Who is asking"),
                P::required("content_type", K::String, "Kind of content"),
                P::required("description", K::String, "What is needed"),
            ],
            "a confirmation message.",
            |a| {
                format!(
                    "Content request logged by {} for {}: {}",
                    a.str("requester"),
                    a.str("content_type"),
                    a.str("description")
                )
            },
        ),
        ToolDescriptor::new(
            "submit_for_content_review",
            "Submit content for QA review.",
            vec![
                P::required("content_id", K::Integer, "Content id"),
                P::required("reviewer", K::String, "Reviewer name"),
            ],
            "a confirmation message.",
            |a| format!("Content {} submitted for review to {}.", a.int("content_id"), a.str("reviewer")),
        ),
        ToolDescriptor::new(
            "update_documentation",
            "Update an existing document with new information.",
            vec![
                P::required("doc_id", K::Integer, "Document id"),
                P::required("updates", K::String, "Changes to apply"),
            ],
            "a confirmation message.",
            |a| format!("Document {} updated with changes: {}", a.int("doc_id"), a.str("updates")),
        ),
        ToolDescriptor::new(
            "track_content_progress",
            "Fetch the progress or status of a content request.",
            vec![P::required("request_id", K::Integer, "Content request id")],
            "a status message.",
            |a| format!("Status of content request {} retrieved.", a.int("request_id")),
        ),
        ToolDescriptor::new(
            "add_document_metadata",
            "Add or update metadata for a specific document.",
            vec![
                P::required("doc_id", K::Integer, "Document id"),
                P::required("metadata", K::Object, "Metadata key/value pairs"),
            ],
            "a confirmation message listing the metadata.",
            |a| {
                let pairs: Vec<String> = a
                    .object("metadata")
                    .map(|m| {
                        m.iter()
                            .map(|(k, v)| match v.as_str() {
                                Some(s) => format!("{k}: {s}"),
                                None => format!("{k}: {v}"),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                format!("Metadata updated for document {}: {}", a.int("doc_id"), pairs.join(", "))
            },
        ),
        ToolDescriptor::new(
            "request_content_translation",
            "Request translation of a document into a specified language.",
            vec![
                P::required("doc_id", K::Integer, "Document id"),
                P::required("language", K::String, "Target language"),
            ],
            "a confirmation message.",
            |a| format!("Translation of document {} into {} requested.", a.int("doc_id"), a.str("language")),
        ),
        ToolDescriptor::new(
            "archive_content",
            "Archive outdated content.",
            vec![P::required("doc_id", K::Integer, "Document id")],
            "a confirmation message.",
            |a| format!("Document {} archived.", a.int("doc_id")),
        ),
        ToolDescriptor::new(
            "fetch_documentation_feedback",
            "Retrieve feedback or comments on a document.",
            vec![P::required("content_id", K::Integer, "Content id")],
            "a status message.",
            |a| format!("Feedback for content {} retrieved.", a.int("content_id")),
        ),
    ]
}
