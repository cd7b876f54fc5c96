// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// storefront routes each variant to the matching gateway call and, on
// success, invalidates the cache keys the operation could have changed.

use storefront_api::{AddressPayload, LoginCredentials, ProfileUpdate};

use crate::model::{Address, UserProfile};
use crate::store::QueryKey;

/// All possible write operations against the storefront backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Address book ─────────────────────────────────────────────────
    CreateAddress(AddressPayload),
    UpdateAddress {
        id: String,
        update: AddressPayload,
    },
    DeleteAddress {
        id: String,
    },
    /// Single-address `{ isDefault: true }` update. Other addresses are
    /// never touched from here.
    SetDefaultAddress {
        id: String,
    },

    // ── Profile / session ────────────────────────────────────────────
    UpdateProfile(ProfileUpdate),
    Login(LoginCredentials),
    /// Local-only: no request is sent.
    Logout,
}

impl Command {
    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAddress(_) => "create-address",
            Self::UpdateAddress { .. } => "update-address",
            Self::DeleteAddress { .. } => "delete-address",
            Self::SetDefaultAddress { .. } => "set-default-address",
            Self::UpdateProfile(_) => "update-profile",
            Self::Login(_) => "login",
            Self::Logout => "logout",
        }
    }

    /// Cache keys to invalidate once this command succeeds.
    pub fn invalidates(&self) -> Vec<QueryKey> {
        match self {
            // Profile views can embed address data.
            Self::CreateAddress(_)
            | Self::UpdateAddress { .. }
            | Self::DeleteAddress { .. }
            | Self::SetDefaultAddress { .. } => vec![QueryKey::addresses(), QueryKey::profile()],
            Self::UpdateProfile(_) => vec![QueryKey::profile()],
            // The profile entry is force-set rather than invalidated.
            Self::Login(_) => vec![QueryKey::addresses()],
            Self::Logout => vec![QueryKey::wishlist(), QueryKey::cart(), QueryKey::orders()],
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Address(Address),
    Profile(UserProfile),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_commands_invalidate_addresses_and_profile() {
        let commands = [
            Command::CreateAddress(AddressPayload::default()),
            Command::UpdateAddress {
                id: "a1".into(),
                update: AddressPayload::default(),
            },
            Command::DeleteAddress { id: "a1".into() },
            Command::SetDefaultAddress { id: "a1".into() },
        ];
        for command in commands {
            assert_eq!(
                command.invalidates(),
                vec![QueryKey::addresses(), QueryKey::profile()],
                "{}",
                command.name()
            );
        }
    }

    #[test]
    fn profile_update_invalidates_only_profile() {
        assert_eq!(
            Command::UpdateProfile(ProfileUpdate::default()).invalidates(),
            vec![QueryKey::profile()]
        );
    }
}
