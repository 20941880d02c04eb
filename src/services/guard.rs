//! Authorization predicates shared by expense, goal and group operations.
//!
//! Every check is a pure function over rows already loaded by the caller. Absence is
//! always reported before lack of permission.

use uuid::Uuid;

use super::ServiceError;
use crate::database::models::GroupWithMembers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    NotFound,
    Forbidden,
}

impl Access {
    /// Translate the outcome into a service error carrying the caller's messages.
    pub fn require(self, not_found: &str, forbidden: &str) -> Result<(), ServiceError> {
        match self {
            Access::Allowed => Ok(()),
            Access::NotFound => Err(ServiceError::NotFound(not_found.to_string())),
            Access::Forbidden => {
                tracing::warn!("Access denied: {}", forbidden);
                Err(ServiceError::Forbidden(forbidden.to_string()))
            }
        }
    }
}

/// A record with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

pub fn check_owner<T: Owned>(record: Option<&T>, requester: Uuid) -> Access {
    match record {
        None => Access::NotFound,
        Some(r) if r.owner_id() == requester => Access::Allowed,
        Some(_) => Access::Forbidden,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    View,
    Update,
    ManageMembers,
    Delete,
}

pub fn check_group(group: Option<&GroupWithMembers>, requester: Uuid, action: GroupAction) -> Access {
    let Some(group) = group else {
        return Access::NotFound;
    };
    let allowed = match action {
        GroupAction::View => group.is_creator(requester) || group.member(requester).is_some(),
        GroupAction::Update | GroupAction::ManageMembers => {
            group.is_creator(requester) || group.is_admin_member(requester)
        }
        GroupAction::Delete => group.is_creator(requester),
    };
    if allowed {
        Access::Allowed
    } else {
        Access::Forbidden
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRemoval {
    Allowed,
    GroupNotFound,
    NotPermitted,
    MemberNotFound,
    CreatorProtected,
}

impl MemberRemoval {
    pub fn require(self) -> Result<(), ServiceError> {
        match self {
            MemberRemoval::Allowed => Ok(()),
            MemberRemoval::GroupNotFound => Err(ServiceError::NotFound("Group not found".into())),
            MemberRemoval::NotPermitted => Access::Forbidden
                .require("", "Only group creators and admins can remove members"),
            MemberRemoval::MemberNotFound => {
                Err(ServiceError::NotFound("Member not found in this group".into()))
            }
            MemberRemoval::CreatorProtected => {
                Access::Forbidden.require("", "Cannot remove the group creator")
            }
        }
    }
}

/// `member_id` is the membership row id, not the user id.
pub fn check_member_removal(group: Option<&GroupWithMembers>, requester: Uuid, member_id: Uuid) -> MemberRemoval {
    let Some(group) = group else {
        return MemberRemoval::GroupNotFound;
    };
    if check_group(Some(group), requester, GroupAction::ManageMembers) != Access::Allowed {
        return MemberRemoval::NotPermitted;
    }
    match group.members.iter().find(|m| m.id == member_id) {
        None => MemberRemoval::MemberNotFound,
        Some(m) if group.is_creator(m.user_id) => MemberRemoval::CreatorProtected,
        Some(_) => MemberRemoval::Allowed,
    }
}
