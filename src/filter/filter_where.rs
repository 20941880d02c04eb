use uuid::Uuid;

use super::types::{ExpenseQuery, SqlParam};

/// Builds the conjunctive WHERE clause for an expense listing with `$n` placeholders.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    conditions: Vec<String>,
}

impl FilterWhere {
    fn new() -> Self {
        Self {
            param_values: vec![],
            conditions: vec![],
        }
    }

    /// Owner scoping is always the first condition and `$1`.
    pub fn generate(user_id: Uuid, query: &ExpenseQuery) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new();

        let p = filter_where.push_param(SqlParam::Uuid(user_id));
        filter_where.conditions.push(format!("e.user_id = {}", p));

        if let Some(search) = &query.search {
            let p = filter_where.push_param(SqlParam::Text(Self::like_pattern(search)));
            filter_where
                .conditions
                .push(format!("(e.description ILIKE {p} OR c.name ILIKE {p})"));
        }

        if let Some(category) = &query.category {
            let p = filter_where.push_param(SqlParam::Text(category.clone()));
            filter_where.conditions.push(format!("c.name = {}", p));
        }

        if let Some(start) = query.start_date {
            let p = filter_where.push_param(SqlParam::Date(start));
            filter_where.conditions.push(format!("e.date >= {}", p));
        }

        if let Some(end) = query.end_date {
            let p = filter_where.push_param(SqlParam::Date(end));
            filter_where.conditions.push(format!("e.date <= {}", p));
        }

        (filter_where.conditions.join(" AND "), filter_where.param_values)
    }

    fn push_param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }

    /// Substring pattern with LIKE wildcards in user input escaped.
    fn like_pattern(search: &str) -> String {
        let mut escaped = String::with_capacity(search.len() + 2);
        escaped.push('%');
        for ch in search.chars() {
            if matches!(ch, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(ch);
        }
        escaped.push('%');
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn owner_condition_is_always_present() {
        let user = Uuid::new_v4();
        let (sql, params) = FilterWhere::generate(user, &ExpenseQuery::new(10));
        assert_eq!(sql, "e.user_id = $1");
        assert_eq!(params, vec![SqlParam::Uuid(user)]);
    }

    #[test]
    fn search_matches_description_or_category_with_one_param() {
        let mut q = ExpenseQuery::new(10);
        q.search = Some("coffee".into());
        let (sql, params) = FilterWhere::generate(Uuid::nil(), &q);
        assert_eq!(sql, "e.user_id = $1 AND (e.description ILIKE $2 OR c.name ILIKE $2)");
        assert_eq!(params[1], SqlParam::Text("%coffee%".into()));
    }

    #[test]
    fn all_filters_are_conjunctive_in_order() {
        let mut q = ExpenseQuery::new(10);
        q.search = Some("x".into());
        q.category = Some("Food".into());
        q.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        q.end_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        let (sql, params) = FilterWhere::generate(Uuid::nil(), &q);
        assert_eq!(
            sql,
            "e.user_id = $1 AND (e.description ILIKE $2 OR c.name ILIKE $2) AND c.name = $3 AND e.date >= $4 AND e.date <= $5"
        );
        assert_eq!(params.len(), 5);
        assert_eq!(params[3], SqlParam::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    }

    #[test]
    fn end_date_alone_is_upper_bound() {
        let mut q = ExpenseQuery::new(10);
        q.end_date = NaiveDate::from_ymd_opt(2024, 6, 30);
        let (sql, _) = FilterWhere::generate(Uuid::nil(), &q);
        assert_eq!(sql, "e.user_id = $1 AND e.date <= $2");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(FilterWhere::like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
