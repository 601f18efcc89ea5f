//! Account models
//!
//! Users, their API tokens and registered devices as exposed by the content
//! service's account endpoints. Only administrators can reach these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::form::{FormErrors, FormField};

/// Administrative user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// API token issued to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserToken {
    pub id: i64,
    pub token: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Device registered for push notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub platform: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of a successful sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Create or patch payload for a user
///
/// `password` is only sent on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditUser {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub is_admin: bool,
}

/// Sign-in form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Create and edit user form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Only used when creating
    #[serde(default)]
    pub password: String,
    /// Checkbox, present when ticked
    #[serde(default)]
    pub is_admin: Option<String>,
}

impl UserForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            is_admin: user.is_admin.then(|| "true".to_string()),
        }
    }

    /// Inputs of the create (`with_password`) or edit form
    pub fn fields(&self, with_password: bool) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("name", "Name", &self.name).required(),
            FormField::text("email", "Email", &self.email).required(),
        ];
        if with_password {
            fields.push(FormField::password("password", "Password").required());
        }
        fields.push(FormField::checkbox("isAdmin", "Administrator", self.is_admin.is_some()));
        fields
    }

    /// Validate into a create (`with_password`) or patch payload
    pub fn validate(&self, with_password: bool) -> Result<EditUser, FormErrors> {
        let mut errors = FormErrors::new();
        let name = errors.required_text("name", &self.name);
        let email = errors.required_text("email", &self.email);
        if matches!(&email, Some(e) if !e.contains('@')) {
            errors.add("email", "Please enter a valid email address");
        }
        let password = if with_password {
            validate_password(&mut errors, &self.password)
        } else {
            None
        };
        match (errors.is_empty(), name, email) {
            (true, Some(name), Some(email)) => Ok(EditUser {
                name,
                email,
                password,
                is_admin: self.is_admin.is_some(),
            }),
            _ => Err(errors),
        }
    }
}

/// Change password form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub password: String,
}

impl ChangePasswordForm {
    pub fn fields(&self) -> Vec<FormField> {
        vec![FormField::password("password", "New password").required()]
    }

    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        match validate_password(&mut errors, &self.password) {
            Some(password) if errors.is_empty() => Ok(password),
            _ => Err(errors),
        }
    }
}

const MIN_PASSWORD_LEN: usize = 8;

fn validate_password(errors: &mut FormErrors, password: &str) -> Option<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
        return None;
    }
    Some(password.to_string())
}
