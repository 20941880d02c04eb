use uuid::Uuid;

use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{ExpenseQuery, SqlResult};

const FROM_CLAUSE: &str = "FROM expenses e JOIN categories c ON c.id = e.category_id";

pub const EXPENSE_COLUMNS: &str = "e.id, e.user_id, e.group_id, e.category_id, c.name AS category_name, \
     e.amount, e.date, e.description, e.created_at";

/// SQL generation for one user's filtered, sorted, paginated expense listing.
pub struct ExpenseFilter {
    user_id: Uuid,
    query: ExpenseQuery,
}

impl ExpenseFilter {
    pub fn new(user_id: Uuid, query: ExpenseQuery) -> Self {
        Self { user_id, query }
    }

    pub fn query(&self) -> &ExpenseQuery {
        &self.query
    }

    /// Page of rows. LIMIT and OFFSET are validated integers, inlined.
    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(self.user_id, &self.query);
        let order_clause = FilterOrder::generate(self.query.sort_by, self.query.sort_order);
        let query = format!(
            "SELECT {} {} WHERE {} {} LIMIT {} OFFSET {}",
            EXPENSE_COLUMNS,
            FROM_CLAUSE,
            where_clause,
            order_clause,
            self.query.limit,
            self.query.offset()
        );
        SqlResult { query, params }
    }

    /// Total matching rows, ignoring pagination.
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(self.user_id, &self.query);
        let query = format!("SELECT COUNT(*) {} WHERE {}", FROM_CLAUSE, where_clause);
        SqlResult { query, params }
    }
}
