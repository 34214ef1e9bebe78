use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User — The signed-in account behind the session cookie
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, rename = "_id", alias = "id", alias = "googleId")]
    pub id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
