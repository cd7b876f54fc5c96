use storefront_api::ProfileUpdate;

use super::{Draft, FormMode};
use crate::command::Command;
use crate::error::CoreError;
use crate::model::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    Email,
    Mobile,
}

/// Editable copy of the signed-in profile. The full name is split into
/// first word and remainder for editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
}

impl ProfileDraft {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

impl Draft for ProfileDraft {
    type Source = UserProfile;
    type Field = ProfileField;
    /// `(full_name, email, mobile)`
    type Identity = (String, Option<String>, String);

    fn from_source(_mode: FormMode, source: Option<&UserProfile>) -> Self {
        let Some(user) = source else {
            return Self::default();
        };
        let (first_name, last_name) = user.name_parts();
        Self {
            first_name,
            last_name,
            email: user.email.clone().unwrap_or_default(),
            mobile: user.mobile.clone(),
        }
    }

    fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Email => &self.email,
            ProfileField::Mobile => &self.mobile,
        }
    }

    fn set_field(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::FirstName => self.first_name = value,
            ProfileField::LastName => self.last_name = value,
            ProfileField::Email => self.email = value,
            ProfileField::Mobile => self.mobile = value,
        }
    }

    fn identity(source: &UserProfile) -> Option<Self::Identity> {
        Some((
            source.full_name.clone(),
            source.email.clone(),
            source.mobile.clone(),
        ))
    }

    fn command(&self, _mode: FormMode) -> Result<Command, CoreError> {
        Ok(Command::UpdateProfile(ProfileUpdate {
            full_name: Some(self.full_name()),
            email: Some(self.email.clone()),
            mobile: Some(self.mobile.clone()),
        }))
    }
}
