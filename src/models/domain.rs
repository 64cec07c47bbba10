use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier of a problem row
///
/// Stores key problems by integer or by text (UUIDs, slugs), so the id is
/// carried through unchanged and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemId::Number(n) => write!(f, "{}", n),
            ProblemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for ProblemId {
    fn from(value: String) -> Self {
        ProblemId::Text(value)
    }
}

impl From<&str> for ProblemId {
    fn from(value: &str) -> Self {
        ProblemId::Text(value.to_string())
    }
}

impl From<i64> for ProblemId {
    fn from(value: i64) -> Self {
        ProblemId::Number(value)
    }
}

impl From<i32> for ProblemId {
    fn from(value: i32) -> Self {
        ProblemId::Number(value.into())
    }
}

/// A real-world problem reported somewhere in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub id: ProblemId,
    #[serde(default, deserialize_with = "nullable_text")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub location: String,
}

impl ProblemRecord {
    pub fn new(
        id: impl Into<ProblemId>,
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            location: location.into(),
        }
    }
}

/// Nullable text columns come back as JSON `null`; read them as empty text
fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_id_accepts_numbers_and_text() {
        let rows: Vec<ProblemRecord> = serde_json::from_str(
            r#"[
                {"id": 7, "title": "a", "description": "b", "location": "c"},
                {"id": "0b6c1c9e-2f1e-4a4e-9b1a-3d2b0f3c9a11", "title": "d", "description": "e", "location": "f"}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows[0].id, ProblemId::Number(7));
        assert_eq!(rows[1].id.to_string(), "0b6c1c9e-2f1e-4a4e-9b1a-3d2b0f3c9a11");
    }

    #[test]
    fn test_null_columns_read_as_empty() {
        let row: ProblemRecord = serde_json::from_str(
            r#"{"id": 1, "title": "Flooding", "description": null}"#,
        )
        .unwrap();

        assert_eq!(row.title, "Flooding");
        assert_eq!(row.description, "");
        assert_eq!(row.location, "");
    }
}
