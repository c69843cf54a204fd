use thiserror::Error;

#[derive(Debug, Error)]
pub enum WhippyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid JSON in {field} parameter: {details}")]
    InvalidJson {
        field: &'static str,
        details: String,
        provided: String,
    },

    #[error("{} parameter must be a dictionary or JSON string, got {type_name}", capitalized(.field))]
    InvalidType {
        field: &'static str,
        type_name: &'static str,
        provided: String,
    },

    #[error("Invalid action '{action}' for resource '{resource}'")]
    InvalidAction { resource: String, action: String },

    #[error("Unknown resource: {0}. Available resources: contacts, messages, conversations, campaigns, sequences, health")]
    UnknownResource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl WhippyError {
    /// Caller-visible error value. Input errors echo the raw input under `provided_<field>`.
    pub fn to_value(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        out.insert("error".into(), self.to_string().into());
        match self {
            WhippyError::InvalidJson { field, provided, .. }
            | WhippyError::InvalidType { field, provided, .. } => {
                out.insert(format!("provided_{field}"), provided.clone().into());
            }
            _ => {}
        }
        serde_json::Value::Object(out)
    }
}

impl serde::Serialize for WhippyError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type WhippyResult<T> = Result<T, WhippyError>;

fn capitalized(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
