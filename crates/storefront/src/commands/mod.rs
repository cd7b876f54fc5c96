//! Command dispatch: routes parsed CLI commands to their handlers.

pub mod addresses;
pub mod config_cmd;
pub mod products;
pub mod profile;
pub mod session;

use storefront_core::{CommandResult, Draft, FormController, Storefront, SubmitOutcome};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    cmd: Command,
    storefront: &Storefront,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Profile(args) => profile::handle(storefront, args, global).await,
        Command::Addresses(args) => addresses::handle(storefront, args, global).await,
        Command::Products(args) => products::handle(storefront, args, global).await,
        Command::Login(args) => session::login(storefront, args, global).await,
        Command::Logout => session::logout(storefront, global).await,
        Command::Config(_) => unreachable!("config commands are handled before connecting"),
    }
}

/// Submit an open form and wait for the mutation to settle.
///
/// A one-shot process can't outlive a detached mutation, so forms here
/// always wait regardless of the configured submit policy. The typed core
/// error is kept so exit codes stay meaningful.
pub(crate) async fn submit_form<D: Draft>(
    form: &mut FormController<D>,
    storefront: &Storefront,
) -> Result<CommandResult, CliError> {
    let ticket = form.begin_submit()?;
    let result = storefront.execute(ticket.command).await;
    match (form.finish_submit(ticket.epoch, result.clone()), result) {
        (SubmitOutcome::Closed, Ok(done)) => Ok(done),
        (_, Err(e)) => Err(e.into()),
        (outcome, Ok(_)) => Err(CliError::Form {
            message: format!("form did not close after a successful submit: {outcome:?}"),
        }),
    }
}
