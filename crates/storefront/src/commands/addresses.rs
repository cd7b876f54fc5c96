//! Address book command handlers.

use storefront_core::{
    Address, AddressDraft, AddressField, CommandResult, FormController, FormMode, Storefront,
    SubmitPolicy,
};
use tabled::Tabled;

use crate::cli::{AddressFields, AddressesArgs, AddressesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AddressRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "City / PIN")]
    city_zip: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

impl From<&Address> for AddressRow {
    fn from(a: &Address) -> Self {
        let formatted = a.formatted();
        Self {
            id: a.id.clone(),
            name: a.full_name.clone(),
            address: formatted.address,
            city_zip: formatted.city_zip,
            default: if a.is_default { "yes" } else { "" },
        }
    }
}

fn detail(a: &Address) -> String {
    let formatted = a.formatted();
    output::detail(&[
        ("ID", a.id.clone()),
        ("Name", a.full_name.clone()),
        ("Address", formatted.address),
        ("City", formatted.city_zip),
        ("Country", a.country.clone()),
        ("Default", a.is_default.to_string()),
    ])
}

// ── Form plumbing ───────────────────────────────────────────────────

fn apply_fields(
    form: &mut FormController<AddressDraft>,
    fields: AddressFields,
) -> Result<(), CliError> {
    let edits = [
        (AddressField::FullName, fields.full_name),
        (AddressField::Line1, fields.line1),
        (AddressField::Line2, fields.line2),
        (AddressField::City, fields.city),
        (AddressField::State, fields.state),
        (AddressField::Pincode, fields.pincode),
        (AddressField::Country, fields.country),
    ];
    for (field, value) in edits {
        if let Some(value) = value {
            form.set_field(field, value)?;
        }
    }
    Ok(())
}

fn require_new_address_fields(fields: &AddressFields) -> Result<(), CliError> {
    let required = [
        ("--full-name", &fields.full_name),
        ("--line1", &fields.line1),
        ("--city", &fields.city),
        ("--state", &fields.state),
        ("--pincode", &fields.pincode),
    ];
    match required.iter().find(|(_, v)| v.as_deref().is_none_or(str::is_empty)) {
        Some((flag, _)) => Err(CliError::Validation {
            field: (*flag).into(),
            reason: "required when adding an address".into(),
        }),
        None => Ok(()),
    }
}

async fn submit(
    form: &mut FormController<AddressDraft>,
    storefront: &Storefront,
    global: &GlobalOpts,
    done: &str,
) -> Result<(), CliError> {
    let result = super::submit_form(form, storefront).await?;
    output::status(global, done);
    if let CommandResult::Address(saved) = result {
        let out = output::render_single(global.output, &saved, detail, |a| a.id.clone());
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    storefront: &Storefront,
    args: AddressesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AddressesCommand::List => {
            let addresses = storefront.addresses().await?;
            if addresses.is_empty() && matches!(global.output, OutputFormat::Table) {
                output::hint(global, "No saved addresses");
                return Ok(());
            }
            let out = output::render_list(
                global.output,
                addresses.as_slice(),
                |a| AddressRow::from(a),
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AddressesCommand::Add(fields) => {
            require_new_address_fields(&fields)?;
            let mut form: FormController<AddressDraft> =
                FormController::new(SubmitPolicy::CloseOnSuccess);
            form.open(FormMode::Create, None);
            apply_fields(&mut form, fields)?;
            submit(&mut form, storefront, global, "Address added").await
        }

        AddressesCommand::Edit { id, fields } => {
            let addresses = storefront.addresses().await?;
            let source = addresses
                .iter()
                .find(|a| a.id == id)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "address".into(),
                    identifier: id.clone(),
                    list_command: "addresses list".into(),
                })?;
            let mut form: FormController<AddressDraft> =
                FormController::new(SubmitPolicy::CloseOnSuccess);
            form.open(FormMode::Edit, Some(source));
            apply_fields(&mut form, fields)?;
            submit(&mut form, storefront, global, "Address updated").await
        }

        AddressesCommand::Delete { id } => {
            storefront.delete_address(id).await?;
            output::status(global, "Address deleted");
            Ok(())
        }

        AddressesCommand::SetDefault { id } => {
            let updated = storefront.set_default_address(id).await?;
            output::status(global, "Default address updated");
            let out = output::render_single(global.output, &updated, detail, |a| a.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
