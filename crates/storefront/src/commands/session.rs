//! Login / logout handlers.

use secrecy::SecretString;
use storefront_core::{LoginCredentials, Storefront};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

pub async fn login(
    storefront: &Storefront,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let credentials = LoginCredentials {
        mobile: args.mobile,
        otp: SecretString::from(args.otp),
    };
    let user = storefront.login(credentials).await?;
    output::status(global, &format!("Signed in as {}", user.full_name));
    Ok(())
}

pub async fn logout(storefront: &Storefront, global: &GlobalOpts) -> Result<(), CliError> {
    let mut navigation = storefront.navigation();
    storefront.logout().await?;
    if let Ok(nav) = navigation.try_recv() {
        tracing::debug!(path = %nav.path, "logout requested navigation");
    }
    output::status(global, "Signed out");
    Ok(())
}
