// Filterable record trait

use crate::models::Task;
use std::collections::HashMap;

/// Anything that exposes named fields for in-memory filtering
pub trait Record {
    /// Stable identifier, used in logs
    fn id(&self) -> String;

    /// Fields available to filters.
    /// Return empty HashMap if nothing should be filterable.
    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        HashMap::new()
    }
}

/// Value types that can be filtered on
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl std::fmt::Display for IndexValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexValue::String(s) => write!(f, "{}", s),
            IndexValue::Int(i) => write!(f, "{}", i),
            IndexValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Record for Task {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), IndexValue::String(self.title.clone()));
        fields.insert("priority".to_string(), IndexValue::Int(self.priority.weight()));
        fields.insert("completed".to_string(), IndexValue::Bool(self.completed));
        fields.insert("due_date".to_string(), IndexValue::Int(self.due_date.timestamp_millis()));
        fields.insert("created_at".to_string(), IndexValue::Int(self.created_at.timestamp_millis()));
        fields
    }
}
