use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user operation that can be replayed against the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Login {
        email: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    Register {
        user_data: RegistrationForm,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    UpdateProfile {
        user_id: i64,
        token: String,
        profile: ProfileUpdate,
        timestamp: i64,
    },
}

impl Action {
    pub const KINDS: [&'static str; 3] = ["login", "register", "updateProfile"];

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Login { .. } => "login",
            Action::Register { .. } => "register",
            Action::UpdateProfile { .. } => "updateProfile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type_utilisateur: Option<i32>,
}

impl RegistrationForm {
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn validate(&self) -> Result<(), String> {
        if self.nom.trim().is_empty() || self.prenom.trim().is_empty() {
            return Err("nom and prenom are required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("email is required".to_string());
        }
        if self.password.chars().count() < Self::MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }
}

/// Fields accepted by the backend's user update endpoint. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mot_de_passe: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.nom.is_none() && self.prenom.is_none() && self.email.is_none() && self.mot_de_passe.is_none()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueueRow {
    pub id: i64,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// A stored queue entry. `action` stays raw JSON so entries written by other
/// client versions can still be listed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedAction {
    pub id: i64,
    pub action: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Result of interpreting a stored entry for replay.
#[derive(Debug)]
pub enum Decoded {
    Known(Action),
    UnknownKind(String),
    Malformed(String),
}

impl QueuedAction {
    pub fn kind(&self) -> Option<&str> {
        self.action.get("type").and_then(|t| t.as_str())
    }

    pub fn decode(&self) -> Decoded {
        if !self.action.is_object() {
            return Decoded::Malformed("Stored action is not a JSON object".to_string());
        }
        match self.kind() {
            Some(kind) if Action::KINDS.contains(&kind) => {
                match serde_json::from_value::<Action>(self.action.clone()) {
                    Ok(action) => Decoded::Known(action),
                    Err(e) => Decoded::Malformed(format!("Invalid {kind} payload: {e}")),
                }
            }
            Some(kind) => Decoded::UnknownKind(kind.to_string()),
            None => Decoded::Malformed("Stored action has no type tag".to_string()),
        }
    }
}

impl From<QueueRow> for QueuedAction {
    fn from(row: QueueRow) -> Self {
        let action = serde_json::from_str(&row.action)
            .unwrap_or(serde_json::Value::String(row.action));
        QueuedAction {
            id: row.id,
            action,
            created_at: row.created_at,
        }
    }
}
