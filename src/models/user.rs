use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An account in the demo user store
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: u64,
    pub email: String,
    /// Never serialized into responses
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
}

impl User {
    pub fn new(
        id: u64,
        email: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password: password.into(),
            role: role.into(),
        }
    }
}

pub fn seed_users() -> Vec<User> {
    vec![
        User::new(1, "admin@example.com", "admin123", "admin"),
        User::new(2, "user@example.com", "user123", "user"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_not_serialized() {
        let user = User::new(7, "a@b.c", "hunter2", "user");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "a@b.c");
        assert!(json.get("password").is_none());
    }
}
