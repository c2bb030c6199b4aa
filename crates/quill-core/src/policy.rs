//! Authorization policy.
//!
//! One pure function per action family. Each takes snapshots of the
//! principal and the target and returns a [`Decision`]; none of them touch
//! storage, so they can be tested without a database.
//!
//! - No IO
//! - No panics
//! - Administrators bypass ownership everywhere

use uuid::Uuid;

use crate::domain::{Comment, Post, Principal, User};
use crate::error::DomainError;

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Why a check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Principal is neither the owner nor an administrator.
    NotOwner,
    /// Action is reserved to administrators.
    AdminOnly,
    /// The resource is not visible to this viewer.
    NotVisible,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NotOwner => "only the owner or an administrator may do this",
            DenyReason::AdminOnly => "administrator role required",
            DenyReason::NotVisible => "resource is not visible to this principal",
        }
    }
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Turn a denial into `Forbidden`.
    pub fn require(self) -> Result<(), DomainError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(DomainError::Forbidden(reason.message().to_string())),
        }
    }

    fn from_bool(allowed: bool, reason: DenyReason) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(reason)
        }
    }
}

/// A resource owned by exactly one principal.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Post {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

impl Owned for User {
    fn owner_id(&self) -> Uuid {
        self.id
    }
}

/// Owner or administrator.
pub fn can_mutate_owned<R: Owned + ?Sized>(principal: &Principal, resource: &R) -> Decision {
    Decision::from_bool(
        principal.id == resource.owner_id() || principal.is_admin(),
        DenyReason::NotOwner,
    )
}

pub fn can_mutate_post(principal: &Principal, post: &Post) -> Decision {
    can_mutate_owned(principal, post)
}

pub fn can_mutate_comment(principal: &Principal, comment: &Comment) -> Decision {
    can_mutate_owned(principal, comment)
}

/// Categories have no owner; only administrators manage them.
pub fn can_mutate_category(principal: &Principal) -> Decision {
    Decision::from_bool(principal.is_admin(), DenyReason::AdminOnly)
}

/// Published posts are public. Drafts are visible to their owner and to
/// administrators only; anonymous viewers never see them.
pub fn can_view_post(principal: Option<&Principal>, post: &Post) -> Decision {
    let allowed = post.is_published()
        || principal.is_some_and(|p| p.id == post.author_id || p.is_admin());
    Decision::from_bool(allowed, DenyReason::NotVisible)
}

/// Everyone may edit their own profile; administrators may edit anyone's.
pub fn can_mutate_profile(principal: &Principal, target: &User) -> Decision {
    can_mutate_owned(principal, target)
}

pub fn can_change_role(principal: &Principal) -> Decision {
    Decision::from_bool(principal.is_admin(), DenyReason::AdminOnly)
}

/// Listing, inspecting and deleting other accounts.
pub fn can_administer_users(principal: &Principal) -> Decision {
    Decision::from_bool(principal.is_admin(), DenyReason::AdminOnly)
}
