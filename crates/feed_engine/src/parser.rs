use feed_core::ParsedItem;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordParseError {
    #[error("record is not an object")]
    NotAnObject,
    #[error("missing identifier field `{0}`")]
    MissingId(String),
    #[error("identifier field `{0}` is neither a string nor an integer")]
    InvalidId(String),
    #[error("invalid record: {0}")]
    Invalid(String),
}

/// Maps one decoded record to a domain item and its stable identifier.
pub trait ItemParser: Send + Sync {
    type Item;

    fn parse(&self, record: &Value) -> Result<ParsedItem<Self::Item>, RecordParseError>;
}

/// Keeps the raw record as the item and reads the identifier from one field.
#[derive(Debug, Clone)]
pub struct JsonRecordParser {
    id_field: String,
}

impl JsonRecordParser {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }
}

impl Default for JsonRecordParser {
    fn default() -> Self {
        Self::new("id")
    }
}

impl ItemParser for JsonRecordParser {
    type Item = Value;

    fn parse(&self, record: &Value) -> Result<ParsedItem<Value>, RecordParseError> {
        let object = record.as_object().ok_or(RecordParseError::NotAnObject)?;
        let id = match object.get(&self.id_field) {
            None | Some(Value::Null) => {
                return Err(RecordParseError::MissingId(self.id_field.clone()))
            }
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(n)) if n.is_u64() || n.is_i64() => n.to_string(),
            Some(_) => return Err(RecordParseError::InvalidId(self.id_field.clone())),
        };
        Ok(ParsedItem::new(id, record.clone()))
    }
}
