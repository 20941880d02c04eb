pub mod category;
pub mod expense;
pub mod goal;
pub mod group;
pub mod user;

pub use category::Category;
pub use expense::{ExpenseOwner, ExpenseRecord};
pub use goal::{Goal, GoalView};
pub use group::{
    Group, GroupExpenseRow, GroupMember, GroupMemberRow, GroupRow, GroupView, GroupWithMembers,
};
pub use user::{User, UserSummary};
