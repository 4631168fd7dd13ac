//! Parameterized search query construction for the books table.
//!
//! Filter values never reach the SQL text: the template only ever contains
//! constant column predicates and `$n` placeholders, and the values travel
//! separately in [`SearchStatement::args`].

use crate::models::book::BookFilter;

/// Column list shared by every books query
pub const BOOK_COLUMNS: &str = "id, title, author, quantity";

const ORDER_BY: &str = " ORDER BY id";

/// A value bound to a query placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlArg {
    Int(i32),
    Text(String),
}

/// Query template plus its ordered bind arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatement {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

/// Build the search statement for `filter`.
///
/// Applied predicates are joined with `WHERE` then `AND`, always in the
/// order id, title, author; absent filters leave no trace in the template.
pub fn build_search(filter: &BookFilter) -> SearchStatement {
    let predicates = [
        ("id = ", filter.id().map(SqlArg::Int)),
        ("title ILIKE ", filter.title().map(contains_pattern)),
        ("author ILIKE ", filter.author().map(contains_pattern)),
    ];

    let mut sql = format!("SELECT {BOOK_COLUMNS} FROM books");
    let mut args = Vec::new();

    for (predicate, value) in predicates {
        let Some(value) = value else { continue };
        args.push(value);
        sql.push_str(if args.len() == 1 { " WHERE " } else { " AND " });
        sql.push_str(predicate);
        sql.push('$');
        sql.push_str(&args.len().to_string());
    }

    sql.push_str(ORDER_BY);
    SearchStatement { sql, args }
}

/// `%text%` with LIKE metacharacters escaped, so `text` matches literally
fn contains_pattern(text: &str) -> SqlArg {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    SqlArg::Text(pattern)
}
