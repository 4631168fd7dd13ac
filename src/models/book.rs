//! Book record model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Store-assigned identifier
    pub id: i32,
    pub title: String,
    pub author: String,
    /// Copies currently available for checkout (never negative)
    pub quantity: i32,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1 to 255 characters"))]
    pub author: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
}

/// Raw search parameters, as received from the query string
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookSearch {
    /// Exact book id (negative or empty means no id filter)
    pub id: Option<String>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author
    pub author: Option<String>,
}

/// Typed search filter consumed by the query builder
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookFilter {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookFilter {
    /// Id filter, if one applies (negative ids mean "no filter")
    pub fn id(&self) -> Option<i32> {
        self.id.filter(|id| *id >= 0)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|s| !s.is_empty())
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref().filter(|s| !s.is_empty())
    }

    /// In-process equivalent of the SQL predicate built for this filter
    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        self.id().map_or(true, |id| book.id == id)
            && self.title().map_or(true, |t| contains(&book.title, t))
            && self.author().map_or(true, |a| contains(&book.author, a))
    }
}

/// Direction of a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    /// A copy leaves the shelf (-1)
    Checkout,
    /// A copy comes back (+1)
    Return,
}

impl std::fmt::Display for StockDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockDirection::Checkout => f.write_str("checkout"),
            StockDirection::Return => f.write_str("return"),
        }
    }
}
