// ── Form lifecycle ──
//
// One controller per modal instance. The draft is a private copy of the
// source entity; it is overwritten from outside only when the form opens,
// or when the source's identity-bearing fields change while editing.
// Submissions are tagged with the epoch they started in so a result that
// lands after the form closed or reinitialized is dropped silently.

mod address;
mod profile;

use std::fmt::Debug;

use tracing::{debug, trace, warn};

use crate::command::{Command, CommandResult};
use crate::config::SubmitPolicy;
use crate::error::CoreError;
use crate::storefront::Storefront;

pub use address::{AddressDraft, AddressField};
pub use profile::{ProfileDraft, ProfileField};

/// Lifecycle state of one modal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FormState {
    Closed,
    Initializing,
    Editing,
    Submitting,
}

/// Whether the form creates a new entity or edits an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

/// An editable copy of a subset of an entity's fields.
pub trait Draft: Clone + Debug + PartialEq + Send + 'static {
    /// Canonical entity the draft is copied from.
    type Source;
    /// Names of the editable fields.
    type Field: Copy + Debug;
    /// Fields whose change while open forces a fresh copy.
    type Identity: Clone + Debug + PartialEq;

    /// Snapshot taken on open. Missing sources and missing fields become
    /// empty strings, never absent values.
    fn from_source(mode: FormMode, source: Option<&Self::Source>) -> Self;

    fn field(&self, field: Self::Field) -> &str;

    fn set_field(&mut self, field: Self::Field, value: String);

    fn identity(_source: &Self::Source) -> Option<Self::Identity> {
        None
    }

    /// The mutation this draft submits as.
    fn command(&self, mode: FormMode) -> Result<Command, CoreError>;
}

/// A submission handed off by [`FormController::begin_submit`].
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub epoch: u64,
    pub command: Command,
}

/// What happened to the form once a submission settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Closed,
    /// Back in `Editing`, showing the failure.
    KeptOpen { message: String },
    /// The form moved on before the result arrived; nothing changed.
    Discarded,
}

/// State machine for one modal form.
#[derive(Debug)]
pub struct FormController<D: Draft> {
    state: FormState,
    mode: FormMode,
    draft: Option<D>,
    epoch: u64,
    last_identity: Option<D::Identity>,
    policy: SubmitPolicy,
    error: Option<String>,
}

impl<D: Draft> FormController<D> {
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            state: FormState::Closed,
            mode: FormMode::default(),
            draft: None,
            epoch: 0,
            last_identity: None,
            policy,
            error: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn is_open(&self) -> bool {
        self.state != FormState::Closed
    }

    /// Current draft; `None` while closed.
    pub fn draft(&self) -> Option<&D> {
        self.draft.as_ref().filter(|_| self.is_open())
    }

    /// Message from the last failed submission.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // ── Open / close ─────────────────────────────────────────────────

    /// `Closed -> Initializing -> Editing`. Returns `false` (and leaves the
    /// draft alone) if the form is already open.
    pub fn open(&mut self, mode: FormMode, source: Option<&D::Source>) -> bool {
        if self.is_open() {
            trace!(state = %self.state, "open ignored, form already open");
            return false;
        }
        self.mode = mode;
        self.initialize(source);
        true
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!(from = %self.state, "form closed");
        }
        self.state = FormState::Closed;
        self.epoch += 1;
        self.error = None;
    }

    /// Follow an external open flag. Only a false-to-true transition
    /// initializes the draft.
    pub fn set_open(&mut self, open: bool, mode: FormMode, source: Option<&D::Source>) {
        match (self.is_open(), open) {
            (false, true) => {
                self.open(mode, source);
            }
            (true, false) => self.close(),
            _ => {}
        }
    }

    /// Report the latest canonical source. While editing, a change to its
    /// identity-bearing fields reinitializes the draft. Returns `true` if so.
    pub fn observe(&mut self, source: Option<&D::Source>) -> bool {
        if self.state != FormState::Editing {
            return false;
        }
        let identity = source.and_then(D::identity);
        if identity.is_none() || identity == self.last_identity {
            return false;
        }
        debug!(?identity, "source identity changed, reinitializing draft");
        self.initialize(source);
        true
    }

    fn initialize(&mut self, source: Option<&D::Source>) {
        self.state = FormState::Initializing;
        self.epoch += 1;
        self.draft = Some(D::from_source(self.mode, source));
        self.last_identity = source.and_then(D::identity);
        self.error = None;
        self.state = FormState::Editing;
        trace!(mode = %self.mode, epoch = self.epoch, "draft initialized");
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Replace exactly one field of the draft.
    pub fn set_field(&mut self, field: D::Field, value: impl Into<String>) -> Result<(), CoreError> {
        match (&self.state, self.draft.as_mut()) {
            (FormState::Editing, Some(draft)) => {
                draft.set_field(field, value.into());
                Ok(())
            }
            _ => Err(CoreError::form(format!(
                "cannot edit {field:?} while {}",
                self.state
            ))),
        }
    }

    // ── Submission ───────────────────────────────────────────────────

    /// `Editing -> Submitting`. A draft that cannot form a command stays
    /// in `Editing` with the message recorded.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, CoreError> {
        let draft = match (&self.state, self.draft.as_ref()) {
            (FormState::Editing, Some(draft)) => draft,
            _ => {
                return Err(CoreError::form(format!(
                    "cannot submit while {}",
                    self.state
                )));
            }
        };
        let command = draft.command(self.mode).inspect_err(|e| {
            self.error = Some(e.to_string());
        })?;
        self.state = FormState::Submitting;
        self.error = None;
        Ok(SubmitTicket {
            epoch: self.epoch,
            command,
        })
    }

    /// Apply a settled submission. Results from an earlier epoch, or for a
    /// form no longer submitting, are discarded without surfacing anything.
    pub fn finish_submit(
        &mut self,
        epoch: u64,
        result: Result<CommandResult, CoreError>,
    ) -> SubmitOutcome {
        if epoch != self.epoch || self.state != FormState::Submitting {
            debug!(epoch, current = self.epoch, "discarding submission result");
            return SubmitOutcome::Discarded;
        }
        match result {
            Ok(_) => {
                self.close();
                SubmitOutcome::Closed
            }
            Err(e) => {
                let message = e.to_string();
                self.state = FormState::Editing;
                self.error = Some(message.clone());
                SubmitOutcome::KeptOpen { message }
            }
        }
    }

    /// Submit the draft through `storefront` according to the form's policy.
    pub async fn submit(&mut self, storefront: &Storefront) -> Result<SubmitOutcome, CoreError> {
        let ticket = self.begin_submit()?;
        match self.policy {
            SubmitPolicy::CloseImmediately => {
                let storefront = storefront.clone();
                tokio::spawn(async move {
                    let name = ticket.command.name();
                    if let Err(e) = storefront.execute(ticket.command).await {
                        warn!(command = name, error = %e, "detached submission failed");
                    }
                });
                self.close();
                Ok(SubmitOutcome::Closed)
            }
            SubmitPolicy::CloseOnSuccess => {
                let result = storefront.execute(ticket.command).await;
                Ok(self.finish_submit(ticket.epoch, result))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::UserProfile;

    fn user(name: &str, email: &str) -> UserProfile {
        UserProfile {
            id: "c1".into(),
            full_name: name.into(),
            email: Some(email.into()),
            mobile: "9999999999".into(),
        }
    }

    fn form() -> FormController<ProfileDraft> {
        FormController::new(SubmitPolicy::CloseOnSuccess)
    }

    #[test]
    fn opening_twice_keeps_edits() {
        let mut form = form();
        let source = user("Mary Jane", "mj@example.com");
        assert!(form.open(FormMode::Edit, Some(&source)));
        form.set_field(ProfileField::FirstName, "May").unwrap();

        assert!(!form.open(FormMode::Edit, Some(&source)));
        assert_eq!(form.draft().unwrap().first_name, "May");
    }

    #[test]
    fn set_field_changes_exactly_one_field() {
        let mut form = form();
        form.open(FormMode::Edit, Some(&user("Mary Jane", "mj@example.com")));
        let before = form.draft().unwrap().clone();

        form.set_field(ProfileField::Email, "new@example.com").unwrap();

        let after = form.draft().unwrap();
        assert_eq!(after.email, "new@example.com");
        assert_eq!(after.first_name, before.first_name);
        assert_eq!(after.last_name, before.last_name);
        assert_eq!(after.mobile, before.mobile);
    }

    #[test]
    fn cannot_edit_while_closed() {
        let mut form = form();
        let err = form.set_field(ProfileField::Email, "x").unwrap_err();
        assert!(matches!(err, CoreError::Form { .. }));
        assert!(form.draft().is_none());
    }

    #[test]
    fn identity_change_while_open_resyncs_draft() {
        let mut form = form();
        form.open(FormMode::Edit, Some(&user("Mary Jane", "mj@example.com")));
        form.set_field(ProfileField::Mobile, "1111111111").unwrap();

        // Same identity: local edits survive.
        assert!(!form.observe(Some(&user("Mary Jane", "mj@example.com"))));
        assert_eq!(form.draft().unwrap().mobile, "1111111111");

        // Canonical name changed upstream: fresh copy.
        assert!(form.observe(Some(&user("Mary Watson", "mj@example.com"))));
        let draft = form.draft().unwrap();
        assert_eq!(draft.last_name, "Watson");
        assert_eq!(draft.mobile, "9999999999");
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn stale_submission_result_is_discarded() {
        let mut form = form();
        form.open(FormMode::Edit, Some(&user("Mary Jane", "mj@example.com")));
        let ticket = form.begin_submit().unwrap();
        assert_eq!(form.state(), FormState::Submitting);

        form.close();
        let outcome = form.finish_submit(
            ticket.epoch,
            Err(CoreError::Network {
                reason: "reset".into(),
            }),
        );
        assert_eq!(outcome, SubmitOutcome::Discarded);
        assert_eq!(form.state(), FormState::Closed);
        assert_eq!(form.error(), None);
    }

    #[test]
    fn failed_submission_keeps_form_open() {
        let mut form = form();
        form.open(FormMode::Edit, Some(&user("Mary Jane", "mj@example.com")));
        let ticket = form.begin_submit().unwrap();

        let outcome = form.finish_submit(
            ticket.epoch,
            Err(CoreError::RequestFailed {
                message: "Email already in use".into(),
                status: Some(409),
            }),
        );
        assert_eq!(
            outcome,
            SubmitOutcome::KeptOpen {
                message: "Email already in use".into()
            }
        );
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(form.error(), Some("Email already in use"));
        assert_eq!(form.draft().unwrap().first_name, "Mary");
    }

    #[test]
    fn successful_submission_closes() {
        let mut form = form();
        form.open(FormMode::Edit, Some(&user("Mary Jane", "mj@example.com")));
        let ticket = form.begin_submit().unwrap();
        assert_eq!(
            form.finish_submit(ticket.epoch, Ok(CommandResult::Ok)),
            SubmitOutcome::Closed
        );
        assert!(!form.is_open());
    }

    #[test]
    fn set_open_follows_flag_edges() {
        let mut form = form();
        form.set_open(true, FormMode::Edit, Some(&user("A B", "a@b.c")));
        form.set_field(ProfileField::FirstName, "Z").unwrap();
        form.set_open(true, FormMode::Edit, Some(&user("A B", "a@b.c")));
        assert_eq!(form.draft().unwrap().first_name, "Z");

        form.set_open(false, FormMode::Edit, None);
        form.set_open(true, FormMode::Edit, Some(&user("A B", "a@b.c")));
        assert_eq!(form.draft().unwrap().first_name, "A");
    }
}
