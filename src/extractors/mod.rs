mod json;
mod merge_patch;

pub use json::JsonBody;
pub use merge_patch::{MergePatch, MERGE_PATCH_CONTENT_TYPE};
