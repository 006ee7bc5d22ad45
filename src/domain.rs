//! Point entity and its partial-update payload.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Entity name used in alert headers and error details.
pub const ENTITY_NAME: &str = "point";

/// Maximum title length, in characters.
pub const TITLE_MAX_LENGTH: usize = 20;

/// A Point. `id` is `None` until the primary store assigns one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Point {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    #[schema(max_length = 20)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Point {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Point {
            id: None,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// One field of a merge-patch body: omitted, explicitly null, or set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldPatch<T> {
    Absent,
    Null,
    Set(T),
}

impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        FieldPatch::Absent
    }
}

impl<T> FieldPatch<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldPatch::Set(v) => Some(v),
            FieldPatch::Absent | FieldPatch::Null => None,
        }
    }

    /// Overwrite `target` only when a value is set. Null and absent both leave it untouched.
    pub fn apply_to(self, target: &mut T) {
        if let FieldPatch::Set(v) = self {
            *target = v;
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldPatch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => FieldPatch::Set(v),
            None => FieldPatch::Null,
        })
    }
}

/// Merge-patch body for a Point.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct PointPatch {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    #[schema(value_type = Option<String>, max_length = 20)]
    pub title: FieldPatch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: FieldPatch<String>,
}

impl PointPatch {
    /// Merge present fields into `existing`, keeping its id.
    pub fn merge_into(self, mut existing: Point) -> Point {
        self.title.apply_to(&mut existing.title);
        self.description.apply_to(&mut existing.description);
        existing
    }
}
