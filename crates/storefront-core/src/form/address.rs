use storefront_api::AddressPayload;

use super::{Draft, FormMode};
use crate::command::Command;
use crate::error::CoreError;
use crate::model::{Address, DEFAULT_COUNTRY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Country,
    FullName,
    Line1,
    Line2,
    City,
    State,
    Pincode,
}

/// Editable copy of one address. `address_id` is set only when editing
/// an existing address and is not a user-editable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDraft {
    pub country: String,
    pub full_name: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub address_id: Option<String>,
}

impl Default for AddressDraft {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_owned(),
            full_name: String::new(),
            line1: String::new(),
            line2: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            address_id: None,
        }
    }
}

impl AddressDraft {
    /// Request body built from the draft. An empty second line is omitted.
    pub fn payload(&self) -> AddressPayload {
        AddressPayload {
            full_name: Some(self.full_name.clone()),
            line1: Some(self.line1.clone()),
            line2: Some(self.line2.clone()).filter(|l| !l.is_empty()),
            city: Some(self.city.clone()),
            state: Some(self.state.clone()),
            pincode: Some(self.pincode.clone()),
            country: Some(self.country.clone()),
            ..AddressPayload::default()
        }
    }
}

impl Draft for AddressDraft {
    type Source = Address;
    type Field = AddressField;
    type Identity = ();

    fn from_source(mode: FormMode, source: Option<&Address>) -> Self {
        match (mode, source) {
            (FormMode::Edit, Some(a)) => Self {
                country: if a.country.is_empty() {
                    DEFAULT_COUNTRY.to_owned()
                } else {
                    a.country.clone()
                },
                full_name: a.full_name.clone(),
                line1: a.line1.clone(),
                line2: a.line2.clone().unwrap_or_default(),
                city: a.city.clone(),
                state: a.state.clone(),
                pincode: a.pincode.clone(),
                address_id: Some(a.id.clone()),
            },
            _ => Self::default(),
        }
    }

    fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::Country => &self.country,
            AddressField::FullName => &self.full_name,
            AddressField::Line1 => &self.line1,
            AddressField::Line2 => &self.line2,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::Pincode => &self.pincode,
        }
    }

    fn set_field(&mut self, field: AddressField, value: String) {
        match field {
            AddressField::Country => self.country = value,
            AddressField::FullName => self.full_name = value,
            AddressField::Line1 => self.line1 = value,
            AddressField::Line2 => self.line2 = value,
            AddressField::City => self.city = value,
            AddressField::State => self.state = value,
            AddressField::Pincode => self.pincode = value,
        }
    }

    fn command(&self, mode: FormMode) -> Result<Command, CoreError> {
        match (mode, &self.address_id) {
            (FormMode::Create, _) => Ok(Command::CreateAddress(self.payload())),
            (FormMode::Edit, Some(id)) => Ok(Command::UpdateAddress {
                id: id.clone(),
                update: self.payload(),
            }),
            (FormMode::Edit, None) => Err(CoreError::form("No address selected for editing")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SubmitPolicy;
    use crate::form::{FormController, FormState};

    fn baker_street() -> Address {
        Address {
            id: "a1".into(),
            customer_id: "c1".into(),
            label: "Home".into(),
            full_name: "J. Watson".into(),
            line1: "221B Baker St".into(),
            line2: None,
            city: "London".into(),
            state: "LDN".into(),
            pincode: "NW16XE".into(),
            country: "UK".into(),
            is_default: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn edit_populates_every_visible_field() {
        let mut form: FormController<AddressDraft> =
            FormController::new(SubmitPolicy::CloseOnSuccess);
        form.open(FormMode::Edit, Some(&baker_street()));

        let draft = form.draft().unwrap();
        assert_eq!(draft.field(AddressField::Line1), "221B Baker St");
        assert_eq!(draft.field(AddressField::City), "London");
        assert_eq!(draft.field(AddressField::State), "LDN");
        assert_eq!(draft.field(AddressField::Pincode), "NW16XE");
        assert_eq!(draft.field(AddressField::FullName), "J. Watson");
        assert_eq!(draft.field(AddressField::Country), "UK");
        assert_eq!(draft.field(AddressField::Line2), "");
    }

    #[test]
    fn unchanged_edit_submits_unchanged_payload() {
        let mut form: FormController<AddressDraft> =
            FormController::new(SubmitPolicy::CloseOnSuccess);
        form.open(FormMode::Edit, Some(&baker_street()));

        let ticket = form.begin_submit().unwrap();
        let Command::UpdateAddress { id, update } = ticket.command else {
            panic!("expected update");
        };
        assert_eq!(id, "a1");
        assert_eq!(
            update,
            AddressPayload {
                full_name: Some("J. Watson".into()),
                line1: Some("221B Baker St".into()),
                city: Some("London".into()),
                state: Some("LDN".into()),
                pincode: Some("NW16XE".into()),
                country: Some("UK".into()),
                ..AddressPayload::default()
            }
        );
    }

    #[test]
    fn create_uses_template() {
        let draft = AddressDraft::from_source(FormMode::Create, Some(&baker_street()));
        assert_eq!(draft, AddressDraft::default());
        assert_eq!(draft.country, "India");
    }

    #[test]
    fn edit_without_source_cannot_submit() {
        let mut form: FormController<AddressDraft> =
            FormController::new(SubmitPolicy::CloseOnSuccess);
        form.open(FormMode::Edit, None);
        assert_eq!(form.draft().unwrap().full_name, "");

        let err = form.begin_submit().unwrap_err();
        assert!(matches!(err, CoreError::Form { .. }));
        assert_eq!(form.state(), FormState::Editing);
        assert!(form.error().unwrap().contains("No address selected"));
    }
}
