use anyhow::{Context, Result};
use mongodb::bson::{self, Bson, Document};
use mongodb::results::{DeleteResult, UpdateResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Public course key, distinct from the store's `_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseId(pub i64);

impl Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CourseId> for Bson {
    fn from(id: CourseId) -> Self {
        Bson::Int64(id.0)
    }
}

/// Read the numeric `id` field of a stored course document.
pub fn course_id_of(doc: &Document) -> Option<CourseId> {
    match doc.get("id")? {
        Bson::Int32(v) => Some(CourseId(i64::from(*v))),
        Bson::Int64(v) => Some(CourseId(*v)),
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        Bson::Double(v)
            if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
        {
            Some(CourseId(*v as i64))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    /// The store's own identifier. Read back, never written.
    pub store_id: Option<Bson>,
    pub id: CourseId,
    /// `id` exactly as stored (int32, int64 or double), written back unchanged.
    pub id_value: Bson,
    /// Application-defined fields (title, description, ...).
    pub details: Document,
}

impl Course {
    #[cfg(test)]
    pub fn new(id: CourseId, details: Document) -> Self {
        Self {
            store_id: None,
            id,
            id_value: id.into(),
            details,
        }
    }

    /// Writable form of the course: `id` plus details, without `_id`.
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("id", self.id_value);
        doc.extend(self.details);
        doc
    }
}

impl TryFrom<Document> for Course {
    type Error = anyhow::Error;

    fn try_from(mut doc: Document) -> Result<Self> {
        let id = course_id_of(&doc).context("Course document has no numeric id field")?;
        let id_value = doc.remove("id").unwrap_or_else(|| id.into());
        let store_id = doc.remove("_id");

        Ok(Self {
            store_id,
            id,
            id_value,
            details: doc,
        })
    }
}

impl Serialize for Course {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.details.len() + 1 + usize::from(self.store_id.is_some());
        let mut map = serializer.serialize_map(Some(len))?;

        match &self.store_id {
            Some(Bson::ObjectId(oid)) => map.serialize_entry("_id", &oid.to_hex())?,
            Some(other) => map.serialize_entry("_id", &other.clone().into_relaxed_extjson())?,
            None => {}
        }
        map.serialize_entry("id", &self.id.0)?;
        for (key, value) in &self.details {
            map.serialize_entry(key, &value.clone().into_relaxed_extjson())?;
        }

        map.end()
    }
}

/// Partial course sent by a client on update.
///
/// Any JSON object is accepted, unknown fields included. The store
/// identifier is dropped on construction so it can never be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePatch {
    fields: Document,
}

impl CoursePatch {
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        let value: Option<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_slice(body).context("Request body is not a JSON object")?;

        let mut fields = match value {
            Some(map) => bson::to_document(&map).context("Failed to convert request body to BSON")?,
            None => Document::new(),
        };
        fields.remove("_id");

        Ok(Self { fields })
    }

    #[cfg(test)]
    pub fn fields(&self) -> &Document {
        &self.fields
    }

    /// Overlay this patch on the existing course. Patch fields win.
    pub fn merge_over(&self, existing: Option<Course>) -> Document {
        let mut merged = existing.map(Course::into_document).unwrap_or_default();
        for (key, value) in &self.fields {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<serde_json::Value>,
}

impl UpdateSummary {
    #[cfg(test)]
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

impl From<UpdateResult> for UpdateSummary {
    fn from(result: UpdateResult) -> Self {
        let upserted_id = result.upserted_id.map(Bson::into_relaxed_extjson);
        Self {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteSummary {
    fn from(result: DeleteResult) -> Self {
        Self {
            deleted_count: result.deleted_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn test_course_from_document() {
        let oid = ObjectId::new();
        let course = Course::try_from(doc! {
            "_id": oid,
            "id": 3_i32,
            "title": "Rust",
            "description": "Ownership",
        })
        .unwrap();

        assert_eq!(course.id, CourseId(3));
        assert_eq!(course.id_value, Bson::Int32(3));
        assert_eq!(course.store_id, Some(Bson::ObjectId(oid)));
        assert_eq!(course.details, doc! { "title": "Rust", "description": "Ownership" });
    }

    #[test]
    fn test_course_id_accepts_integral_numbers_only() {
        assert_eq!(course_id_of(&doc! { "id": 7_i64 }), Some(CourseId(7)));
        assert_eq!(course_id_of(&doc! { "id": 7.0 }), Some(CourseId(7)));
        assert_eq!(course_id_of(&doc! { "id": 7.5 }), None);
        assert_eq!(course_id_of(&doc! { "id": "7" }), None);
        assert_eq!(course_id_of(&doc! { "id": f64::NAN }), None);
        assert_eq!(course_id_of(&doc! { "id": 1e19 }), None);
        assert_eq!(course_id_of(&doc! { "id": -1e19 }), None);
        assert_eq!(course_id_of(&doc! { "id": 9.223_372_036_854_775_808e18 }), None);
        assert_eq!(
            course_id_of(&doc! { "id": -9.223_372_036_854_775_808e18 }),
            Some(CourseId(i64::MIN))
        );
        assert!(Course::try_from(doc! { "title": "no id" }).is_err());
    }

    #[test]
    fn test_course_json_shape() {
        let oid = ObjectId::new();
        let course = Course {
            store_id: Some(Bson::ObjectId(oid)),
            id: CourseId(1),
            id_value: Bson::Int32(1),
            details: doc! { "title": "Rust", "credits": 5_i32 },
        };

        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(
            value,
            json!({ "_id": oid.to_hex(), "id": 1, "title": "Rust", "credits": 5 })
        );
    }

    #[test]
    fn test_patch_drops_store_id() {
        let patch = CoursePatch::from_json_slice(
            br#"{"_id": "65f000000000000000000000", "description": "X", "extra": [1, 2]}"#,
        )
        .unwrap();

        assert!(!patch.fields().contains_key("_id"));
        assert_eq!(patch.fields().get_str("description").unwrap(), "X");
        assert!(patch.fields().contains_key("extra"));
    }

    #[test]
    fn test_patch_rejects_non_objects() {
        assert!(CoursePatch::from_json_slice(b"").is_err());
        assert!(CoursePatch::from_json_slice(b"not json").is_err());
        assert!(CoursePatch::from_json_slice(b"[1, 2]").is_err());
        assert_eq!(
            CoursePatch::from_json_slice(b"null").unwrap(),
            CoursePatch::default()
        );
    }

    #[test]
    fn test_merge_patch_wins_and_keeps_other_fields() {
        let existing = Course::try_from(doc! {
            "_id": ObjectId::new(),
            "id": 4_i64,
            "title": "Rust",
            "description": "old",
        })
        .unwrap();
        let patch = CoursePatch::from_json_slice(br#"{"description": "new"}"#).unwrap();

        let merged = patch.merge_over(Some(existing));
        assert_eq!(
            merged,
            doc! { "id": 4_i64, "title": "Rust", "description": "new" }
        );
    }

    #[test]
    fn test_merge_keeps_stored_id_type() {
        let existing = Course::try_from(doc! {
            "_id": ObjectId::new(),
            "id": 1_i32,
            "title": "T",
        })
        .unwrap();
        let patch = CoursePatch::from_json_slice(br#"{"title": "T"}"#).unwrap();

        let merged = patch.merge_over(Some(existing));
        assert_eq!(merged.get("id"), Some(&Bson::Int32(1)));
        assert_eq!(merged, doc! { "id": 1_i32, "title": "T" });
    }

    #[test]
    fn test_merge_without_existing_is_patch_only() {
        let patch = CoursePatch::from_json_slice(br#"{"description": "X"}"#).unwrap();
        assert_eq!(patch.merge_over(None), doc! { "description": "X" });
    }

    #[test]
    fn test_update_summary_json() {
        let value = serde_json::to_value(UpdateSummary::new(1, 0)).unwrap();
        assert_eq!(
            value,
            json!({
                "acknowledged": true,
                "matchedCount": 1,
                "modifiedCount": 0,
                "upsertedCount": 0,
                "upsertedId": null,
            })
        );
    }
}
