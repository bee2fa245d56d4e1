//! The observable auth state.

use std::fmt;

use waterwise_protocol::UserProfile;

/// Where the manager currently stands.
///
/// ```text
/// Unauthenticated ──sign_in/sign_up──► Authenticating ──ok──► Authenticated(user)
///        ▲                                  │                        │
///        └───────────unknown email──────────┘                        │
///        └──────────────────────────sign_out─────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// A sign-in or sign-up is waiting on its simulated round trip.
    Authenticating,
    Authenticated(UserProfile),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Authenticating)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Authenticated(user) => write!(f, "authenticated({})", user.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use waterwise_protocol::{UserId, UserRole};

    use super::*;

    #[test]
    fn test_state_predicates() {
        let user = UserProfile {
            id: UserId::from("1"),
            name: "n".into(),
            email: "e@example.com".into(),
            role: Some(UserRole::Consumer),
            image_url: None,
        };

        assert!(!AuthState::Unauthenticated.is_authenticated());
        assert!(AuthState::Authenticating.is_loading());
        let signed_in = AuthState::Authenticated(user.clone());
        assert!(signed_in.is_authenticated());
        assert!(!signed_in.is_loading());
        assert_eq!(signed_in.user(), Some(&user));
        assert_eq!(signed_in.to_string(), "authenticated(1)");
    }
}
