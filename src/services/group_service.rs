use std::collections::HashMap;

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::guard::{check_group, check_member_removal, GroupAction};
use super::{is_unique_violation, ServiceError, ServiceResult};
use crate::database::models::group::MemberView;
use crate::database::models::{
    Group, GroupExpenseRow, GroupMember, GroupMemberRow, GroupRow, GroupView, GroupWithMembers,
};
use crate::types::MemberRole;

const GROUP_SELECT: &str = "SELECT g.id, g.name, g.created_by, g.created_at, g.updated_at, \
     u.full_name AS creator_name, u.email AS creator_email \
     FROM expense_groups g JOIN users u ON u.id = g.created_by";

const MEMBER_SELECT: &str = "SELECT gm.id, gm.group_id, gm.user_id, gm.role, gm.joined_at, u.full_name, u.email \
     FROM group_members gm JOIN users u ON u.id = gm.user_id";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupInput {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddMemberInput {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct GroupService {
    pool: PgPool,
}

impl GroupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Group and its membership rows, or `None` if the group does not exist.
    pub async fn load(&self, group_id: Uuid) -> ServiceResult<Option<GroupWithMembers>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, created_by, created_at, updated_at FROM expense_groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(group) = group else {
            return Ok(None);
        };

        let members = sqlx::query_as::<_, GroupMember>(
            "SELECT id, group_id, user_id, role, joined_at FROM group_members WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(GroupWithMembers { group, members }))
    }

    /// Members and the creator may attach expenses to a group.
    pub async fn require_participant(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let group = self.load(group_id).await?;
        check_group(group.as_ref(), user_id, GroupAction::View)
            .require("Group not found", "You are not a member of this group")
    }

    /// Groups the user created or belongs to, newest first.
    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<GroupView>> {
        let sql = format!(
            "{} WHERE g.created_by = $1 \
             OR EXISTS (SELECT 1 FROM group_members gm WHERE gm.group_id = g.id AND gm.user_id = $1) \
             ORDER BY g.created_at DESC",
            GROUP_SELECT
        );
        let rows = sqlx::query_as::<_, GroupRow>(&sql).bind(user_id).fetch_all(&self.pool).await?;
        self.assemble(rows).await
    }

    pub async fn get(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<GroupView> {
        let group = self.load(group_id).await?;
        check_group(group.as_ref(), user_id, GroupAction::View)
            .require("Group not found", "You do not have access to this group")?;
        self.view(group_id).await
    }

    /// Creates the group and the creator's admin membership atomically.
    pub async fn create(&self, user_id: Uuid, input: GroupInput) -> ServiceResult<GroupView> {
        let name = required_name(input.name.as_deref())?;

        let mut tx = self.pool.begin().await?;
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO expense_groups (name, created_by) VALUES ($1, $2) \
             RETURNING id, name, created_by, created_at, updated_at",
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO group_members (group_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(group.id)
            .bind(user_id)
            .bind(MemberRole::Admin.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Created group {} by user {}", group.id, user_id);
        self.view(group.id).await
    }

    pub async fn update(&self, group_id: Uuid, user_id: Uuid, input: GroupInput) -> ServiceResult<GroupView> {
        let group = self.load(group_id).await?;
        check_group(group.as_ref(), user_id, GroupAction::Update)
            .require("Group not found", "Only group creators and admins can update group details")?;
        let name = required_name(input.name.as_deref())?;

        sqlx::query("UPDATE expense_groups SET name = $2, updated_at = NOW() WHERE id = $1")
            .bind(group_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        tracing::info!("Updated group {}", group_id);
        self.view(group_id).await
    }

    /// Removes memberships, detaches the group's expenses and deletes the group in one transaction.
    pub async fn delete(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let group = self.load(group_id).await?;
        check_group(group.as_ref(), user_id, GroupAction::Delete)
            .require("Group not found", "Only the group creator can delete the group")?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE expenses SET group_id = NULL WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM expense_groups WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Deleted group {}", group_id);
        Ok(())
    }

    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid, input: AddMemberInput) -> ServiceResult<MemberView> {
        let email = input
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::validation("Email is required"))?;
        let role = match input.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => MemberRole::Member,
            Some(raw) => raw.parse::<MemberRole>().map_err(ServiceError::Validation)?,
        };

        let group = self.load(group_id).await?;
        check_group(group.as_ref(), user_id, GroupAction::ManageMembers)
            .require("Group not found", "Only group creators and admins can add members")?;

        let new_user_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::validation("User with this email not found"))?;

        let already_member = group
            .as_ref()
            .map(|g| g.member(new_user_id).is_some())
            .unwrap_or(false);
        if already_member {
            return Err(ServiceError::validation("User is already a member of this group"));
        }

        let membership_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO group_members (group_id, user_id, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(group_id)
        .bind(new_user_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::validation("User is already a member of this group")
            } else {
                ServiceError::from(e)
            }
        })?;

        let sql = format!("{} WHERE gm.id = $1", MEMBER_SELECT);
        let row = sqlx::query_as::<_, GroupMemberRow>(&sql)
            .bind(membership_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Added user {} to group {} as {}", new_user_id, group_id, role.as_str());
        Ok(MemberView::from(row))
    }

    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid, member_id: Uuid) -> ServiceResult<()> {
        let group = self.load(group_id).await?;
        check_member_removal(group.as_ref(), user_id, member_id).require()?;

        sqlx::query("DELETE FROM group_members WHERE id = $1 AND group_id = $2")
            .bind(member_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Removed membership {} from group {}", member_id, group_id);
        Ok(())
    }

    async fn view(&self, group_id: Uuid) -> ServiceResult<GroupView> {
        let sql = format!("{} WHERE g.id = $1", GROUP_SELECT);
        let row = sqlx::query_as::<_, GroupRow>(&sql)
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Group not found".into()))?;
        let mut views = self.assemble(vec![row]).await?;
        views.pop().ok_or_else(|| ServiceError::NotFound("Group not found".into()))
    }

    /// Loads members and expenses for all rows in two queries and builds the views.
    async fn assemble(&self, rows: Vec<GroupRow>) -> ServiceResult<Vec<GroupView>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let sql = format!("{} WHERE gm.group_id = ANY($1) ORDER BY gm.joined_at, gm.id", MEMBER_SELECT);
        let members = sqlx::query_as::<_, GroupMemberRow>(&sql)
            .bind(&ids[..])
            .fetch_all(&self.pool)
            .await?;

        let expenses = sqlx::query_as::<_, GroupExpenseRow>(
            "SELECT e.id, e.group_id, e.amount, e.description, e.date, e.created_at, \
                    e.category_id, c.name AS category_name, e.user_id, u.full_name, u.email \
             FROM expenses e \
             JOIN categories c ON c.id = e.category_id \
             JOIN users u ON u.id = e.user_id \
             WHERE e.group_id = ANY($1) \
             ORDER BY e.date DESC, e.created_at DESC",
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut members_by_group: HashMap<Uuid, Vec<GroupMemberRow>> = HashMap::new();
        for m in members {
            members_by_group.entry(m.group_id).or_default().push(m);
        }
        let mut expenses_by_group: HashMap<Uuid, Vec<GroupExpenseRow>> = HashMap::new();
        for e in expenses {
            expenses_by_group.entry(e.group_id).or_default().push(e);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let members = members_by_group.remove(&row.id).unwrap_or_default();
                let expenses = expenses_by_group.remove(&row.id).unwrap_or_default();
                GroupView::assemble(row, members, expenses)
            })
            .collect())
    }
}

fn required_name(name: Option<&str>) -> ServiceResult<&str> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ServiceError::validation("Group name is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_names_are_trimmed_and_required() {
        assert_eq!(required_name(Some("  Flatmates ")).unwrap(), "Flatmates");
        assert!(required_name(Some("   ")).is_err());
        assert!(required_name(None).is_err());
    }

    #[test]
    fn add_member_body_defaults() {
        let body: AddMemberInput = serde_json::from_str(r#"{"email": "ben@example.com"}"#).unwrap();
        assert_eq!(body.email.as_deref(), Some("ben@example.com"));
        assert_eq!(body.role, None);
    }
}
