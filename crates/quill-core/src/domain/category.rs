use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Category entity. Names are unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Key used for the case-insensitive uniqueness rule.
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Partial update of a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Categories seeded into an empty store.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Technology", "Latest tech news and trends"),
    ("Travel", "Adventures and guides"),
    ("Food", "Recipes and reviews"),
    ("Lifestyle", "Tips and inspiration"),
    ("Programming", "Coding tutorials and discussions"),
];
