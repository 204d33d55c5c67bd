//! Integer IDs for rows in the expense stores.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of an expense. Unique within a store.
pub type ExpenseId = DatabaseId;
