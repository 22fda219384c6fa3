//! Topic type name normalization.
//!
//! Message types are addressed by a fully-qualified three-segment name
//! (`sensor_msgs/msg/JointState`). The two-segment shorthand
//! (`sensor_msgs/JointState`) is accepted and expanded. Anything else is
//! rejected before a subscription is attempted.

use crate::error::{Error, Result};

/// Expand a topic type name to its fully-qualified `pkg/msg/Type` form.
///
/// Surrounding whitespace is ignored. Returns [`Error::InvalidTopicType`]
/// if the name has empty segments or the wrong number of segments.
pub fn normalize_topic_type(raw: &str) -> Result<String> {
    let value = raw.trim();
    let parts: Vec<&str> = value.split('/').collect();
    match parts.as_slice() {
        [pkg, "msg", name] if !pkg.is_empty() && !name.is_empty() => Ok(value.to_string()),
        [pkg, name] if !pkg.is_empty() && *name != "msg" && !name.is_empty() => {
            Ok(format!("{pkg}/msg/{name}"))
        }
        _ => Err(Error::InvalidTopicType(raw.to_string())),
    }
}
