//! The set of users the auth layer knows about.
//!
//! There is no user database. The [`Directory`] trait is the one seam
//! where a real backend could be plugged in; [`UserDirectory`] ships the
//! three demo personas, fixed at construction.

use waterwise_protocol::{UserId, UserProfile, UserRole};

/// Read-only lookup of user profiles.
///
/// `Send + Sync + 'static` because the manager shares one directory
/// behind an `Arc` for as long as it lives.
///
/// # Example
///
/// ```rust
/// use waterwise_auth::{Directory, UserDirectory};
///
/// let directory = UserDirectory::builtin();
/// let user = directory.find_by_email("Company@Example.com").unwrap();
/// assert_eq!(user.id.as_str(), "2");
/// ```
pub trait Directory: Send + Sync + 'static {
    /// Finds the user whose email matches, ignoring case.
    fn find_by_email(&self, email: &str) -> Option<UserProfile>;

    /// Finds the user with exactly this id.
    fn find_by_id(&self, id: &UserId) -> Option<UserProfile>;
}

/// In-memory [`Directory`]. Never changes after construction.
#[derive(Debug, Default, Clone)]
pub struct UserDirectory {
    users: Vec<UserProfile>,
}

impl UserDirectory {
    /// A directory with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory holding `users`, searched in order.
    pub fn with_users(users: Vec<UserProfile>) -> Self {
        Self { users }
    }

    /// The three demo personas, one per role.
    pub fn builtin() -> Self {
        Self::with_users(vec![
            persona("1", "李小明", "consumer@example.com", UserRole::Consumer),
            persona(
                "2",
                "台灣積體電路製造股份有限公司",
                "company@example.com",
                UserRole::Company,
            ),
            persona("3", "水資源管理局", "government@example.com", UserRole::Government),
        ])
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn persona(id: &str, name: &str, email: &str, role: UserRole) -> UserProfile {
    UserProfile {
        id: UserId::from(id),
        name: name.to_owned(),
        email: email.to_owned(),
        role: Some(role),
        image_url: Some(format!("/avatars/{role}.png")),
    }
}

impl Directory for UserDirectory {
    fn find_by_email(&self, email: &str) -> Option<UserProfile> {
        self.users.iter().find(|u| u.matches_email(email)).cloned()
    }

    fn find_by_id(&self, id: &UserId) -> Option<UserProfile> {
        self.users.iter().find(|u| &u.id == id).cloned()
    }
}
