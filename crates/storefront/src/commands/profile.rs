//! Profile command handlers.

use storefront_core::{
    CommandResult, FormController, FormMode, ProfileDraft, ProfileField, Storefront, SubmitPolicy,
    UserProfile,
};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

fn detail(user: &UserProfile) -> String {
    output::detail(&[
        ("ID", user.id.clone()),
        ("Name", user.full_name.clone()),
        ("Email", user.email.clone().unwrap_or_else(|| "-".into())),
        ("Mobile", user.mobile.clone()),
    ])
}

async fn signed_in(storefront: &Storefront, message: &str) -> Result<UserProfile, CliError> {
    storefront
        .profile()
        .await
        .filter(|u| storefront_core::is_authenticated(Some(u)))
        .ok_or_else(|| CliError::NotSignedIn {
            message: message.into(),
        })
}

pub async fn handle(
    storefront: &Storefront,
    args: ProfileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProfileCommand::Show => {
            let user = signed_in(storefront, "Not signed in").await?;
            let out = output::render_single(global.output, &user, detail, |u| u.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Edit {
            first_name,
            last_name,
            email,
            mobile,
        } => {
            let user = signed_in(storefront, "Please sign in to update your profile").await?;

            let mut form: FormController<ProfileDraft> =
                FormController::new(SubmitPolicy::CloseOnSuccess);
            form.open(FormMode::Edit, Some(&user));
            let edits = [
                (ProfileField::FirstName, first_name),
                (ProfileField::LastName, last_name),
                (ProfileField::Email, email),
                (ProfileField::Mobile, mobile),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    form.set_field(field, value)?;
                }
            }

            let updated = match super::submit_form(&mut form, storefront).await? {
                CommandResult::Profile(updated) => updated,
                _ => user,
            };
            output::status(global, "Profile updated");
            let out = output::render_single(global.output, &updated, detail, |u| u.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
