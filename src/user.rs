use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A principal: optional user id plus optional authorisation labels.
///
/// Nothing is validated; whatever goes in comes back out in [`User::to_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Data authorisation labels, in the order given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_auths: Option<Vec<String>>,
}

impl User {
    /// Class name the engine uses for this type.
    pub const CLASS: &'static str = "uk.gov.gchq.gaffer.user.User";

    /// Create a user from optional parts.
    pub fn new(user_id: Option<String>, data_auths: Option<Vec<String>>) -> Self {
        Self {
            user_id,
            data_auths,
        }
    }

    /// Set the user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the authorisation labels.
    pub fn with_data_auths<I, A>(mut self, data_auths: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.data_auths = Some(data_auths.into_iter().map(Into::into).collect());
        self
    }

    /// JSON projection holding only the fields that are set.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut json = Map::new();
        if let Some(user_id) = &self.user_id {
            json.insert("userId".to_string(), Value::String(user_id.clone()));
        }
        if let Some(data_auths) = &self.data_auths {
            json.insert(
                "dataAuths".to_string(),
                Value::Array(data_auths.iter().cloned().map(Value::String).collect()),
            );
        }
        json
    }
}
