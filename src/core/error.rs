use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("No JSON object found in response: {0}")]
    Extraction(String),

    #[error("Malformed tool call: {0}")]
    Schema(String),

    #[error("Unknown tool: {0:?}")]
    UnknownTool(String),

    #[error("Malformed plan: {0}")]
    MalformedPlan(String),

    #[error("Empty plan after expansion")]
    EmptyPlan,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Actuation error: {0}")]
    Actuation(#[from] crate::bench::BenchError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LabError>;
