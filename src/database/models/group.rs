use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::category::Category;
use super::user::UserSummary;
use crate::types::MemberRole;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl GroupMember {
    pub fn role(&self) -> MemberRole {
        MemberRole::parse(&self.role)
    }
}

/// A group plus its membership rows: everything authorization needs.
#[derive(Debug, Clone)]
pub struct GroupWithMembers {
    pub group: Group,
    pub members: Vec<GroupMember>,
}

impl GroupWithMembers {
    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.group.created_by == user_id
    }

    pub fn member(&self, user_id: Uuid) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_admin_member(&self, user_id: Uuid) -> bool {
        self.member(user_id).map(|m| m.role() == MemberRole::Admin).unwrap_or(false)
    }
}

/// Group row joined with its creator's public identity.
#[derive(Debug, Clone, FromRow)]
pub struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_name: String,
    pub creator_email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct GroupMemberRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct GroupExpenseRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub category_name: String,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub user: UserSummary,
}

impl From<GroupMemberRow> for MemberView {
    fn from(row: GroupMemberRow) -> Self {
        Self {
            id: row.id,
            role: MemberRole::parse(&row.role),
            joined_at: row.joined_at,
            user: UserSummary { id: row.user_id, full_name: row.full_name, email: row.email },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupExpenseView {
    pub id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub category: Category,
    pub user: UserSummary,
}

impl From<GroupExpenseRow> for GroupExpenseView {
    fn from(row: GroupExpenseRow) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            description: row.description,
            date: row.date,
            created_at: row.created_at,
            category: Category { id: row.category_id, name: row.category_name },
            user: UserSummary { id: row.user_id, full_name: row.full_name, email: row.email },
        }
    }
}

/// Detail shape for group endpoints, visible to members and the creator only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: UserSummary,
    pub members: Vec<MemberView>,
    pub expenses: Vec<GroupExpenseView>,
    pub total_expenses: Decimal,
    pub member_count: usize,
}

impl GroupView {
    pub fn assemble(row: GroupRow, members: Vec<GroupMemberRow>, expenses: Vec<GroupExpenseRow>) -> Self {
        let total_expenses = expenses.iter().map(|e| e.amount).sum();
        let member_count = members.len();
        Self {
            id: row.id,
            name: row.name,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            creator: UserSummary {
                id: row.created_by,
                full_name: row.creator_name,
                email: row.creator_email,
            },
            members: members.into_iter().map(MemberView::from).collect(),
            expenses: expenses.into_iter().map(GroupExpenseView::from).collect(),
            total_expenses,
            member_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_row(group_id: Uuid, role: &str, name: &str) -> GroupMemberRow {
        GroupMemberRow {
            id: Uuid::new_v4(),
            group_id,
            user_id: Uuid::new_v4(),
            role: role.into(),
            joined_at: Utc::now(),
            full_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn expense_row(group_id: Uuid, cents: i64, payer: &GroupMemberRow) -> GroupExpenseRow {
        GroupExpenseRow {
            id: Uuid::new_v4(),
            group_id,
            amount: Decimal::new(cents, 2),
            description: "Groceries".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            created_at: Utc::now(),
            category_id: Uuid::new_v4(),
            category_name: "Food".into(),
            user_id: payer.user_id,
            full_name: payer.full_name.clone(),
            email: payer.email.clone(),
        }
    }

    #[test]
    fn assembles_totals_and_counts() {
        let group_id = Uuid::new_v4();
        let creator = member_row(group_id, "admin", "Ana");
        let other = member_row(group_id, "member", "Ben");
        let row = GroupRow {
            id: group_id,
            name: "Flat".into(),
            created_by: creator.user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            creator_name: "Ana".into(),
            creator_email: "ana@example.com".into(),
        };
        let expenses = vec![expense_row(group_id, 1250, &creator), expense_row(group_id, 750, &other)];
        let view = GroupView::assemble(row, vec![creator.clone(), other], expenses);

        assert_eq!(view.member_count, 2);
        assert_eq!(view.total_expenses, Decimal::new(2000, 2));
        assert_eq!(view.creator.full_name, "Ana");

        let v = serde_json::to_value(&view).unwrap();
        assert_eq!(v["totalExpenses"], 20.0);
        assert_eq!(v["members"][0]["role"], "admin");
        assert_eq!(v["members"][1]["user"]["fullName"], "Ben");
        assert_eq!(v["expenses"][0]["category"]["name"], "Food");
        assert_eq!(v["expenses"][0]["user"]["id"], creator.user_id.to_string());
    }

    #[test]
    fn membership_helpers() {
        let creator_id = Uuid::new_v4();
        let admin_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        let group = Group {
            id: Uuid::new_v4(),
            name: "Trip".into(),
            created_by: creator_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let member = |user_id: Uuid, role: &str| GroupMember {
            id: Uuid::new_v4(),
            group_id: group.id,
            user_id,
            role: role.into(),
            joined_at: Utc::now(),
        };
        let g = GroupWithMembers {
            members: vec![member(creator_id, "admin"), member(admin_id, "admin"), member(member_id, "member")],
            group: group.clone(),
        };
        assert!(g.is_creator(creator_id));
        assert!(g.is_admin_member(admin_id));
        assert!(!g.is_admin_member(member_id));
        assert!(g.member(Uuid::new_v4()).is_none());
    }
}
