use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Authenticated identity returned by the profile endpoint.
///
/// # Example
/// ```
/// use streamdata_auth::auth::User;
///
/// let user: User = serde_json::from_value(serde_json::json!({
///     "id": 1,
///     "display_name": "nova",
///     "email": "n@x.com",
///     "profile_image_url": "http://i/p.png"
/// }))?;
/// assert_eq!(user.id, "1");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub profile_image_url: String,
}

/// `GET /users` body: identities under `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    pub data: Vec<User>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
