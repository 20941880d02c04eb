use super::types::{SortField, SortOrder};

pub struct FilterOrder;

impl FilterOrder {
    /// `id` follows the requested key in the same direction so page boundaries are stable.
    pub fn generate(field: SortField, order: SortOrder) -> String {
        let dir = order.to_sql();
        format!("ORDER BY {} {}, e.id {}", field.column(), dir, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_field_then_id() {
        assert_eq!(
            FilterOrder::generate(SortField::Date, SortOrder::Desc),
            "ORDER BY e.date DESC, e.id DESC"
        );
        assert_eq!(
            FilterOrder::generate(SortField::Category, SortOrder::Asc),
            "ORDER BY c.name ASC, e.id ASC"
        );
        assert_eq!(
            FilterOrder::generate(SortField::Amount, SortOrder::Asc),
            "ORDER BY e.amount ASC, e.id ASC"
        );
    }
}
