use std::fmt;

use serde::{Deserialize, Serialize};

/// Reply tone understood by the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Friendly,
    /// No tone hint; sent as an empty string.
    #[serde(rename = "", alias = "none")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    #[default]
    Short,
    Medium,
    Long,
}

/// Backend endpoint, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Generate,
    Summarize,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Generate => "generate",
            Endpoint::Summarize => "summarize",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One request to the generation backend. Each variant maps to exactly one
/// endpoint and receives a plain-text body back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOperation {
    Generate { email_content: String, tone: Tone },
    Summarize { email_content: String, summary_length: SummaryLength },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratePayload<'a> {
    email_content: &'a str,
    tone: Tone,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizePayload<'a> {
    email_content: &'a str,
    summary_length: SummaryLength,
}

impl BackendOperation {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            BackendOperation::Generate { .. } => Endpoint::Generate,
            BackendOperation::Summarize { .. } => Endpoint::Summarize,
        }
    }

    pub fn email_content(&self) -> &str {
        match self {
            BackendOperation::Generate { email_content, .. }
            | BackendOperation::Summarize { email_content, .. } => email_content,
        }
    }

    /// JSON request body, e.g. `{"emailContent":"...","tone":"professional"}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            BackendOperation::Generate {
                email_content,
                tone,
            } => serde_json::to_string(&GeneratePayload {
                email_content,
                tone: *tone,
            }),
            BackendOperation::Summarize {
                email_content,
                summary_length,
            } => serde_json::to_string(&SummarizePayload {
                email_content,
                summary_length: *summary_length,
            }),
        }
    }
}
