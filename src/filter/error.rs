use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid sortBy '{0}'. Must be one of: date, amount, category")]
    InvalidSortField(String),

    #[error("Invalid sortOrder '{0}'. Must be asc or desc")]
    InvalidSortOrder(String),

    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
}
