//! Category management. Reads are public, writes are admin-only.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Category, CategoryChanges, DEFAULT_CATEGORIES, Principal};
use crate::error::DomainError;
use crate::policy;
use crate::ports::{CategoryRepository, PostRepository};
use crate::validation;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { categories, posts }
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("Category"))
    }

    pub async fn create(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<String>,
    ) -> Result<Category, DomainError> {
        Self::authorize(principal)?;
        let name = validation::category_name(name)?;

        if self.categories.find_by_name(&name).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Category '{name}' already exists."
            )));
        }

        let category = self
            .categories
            .insert(Category::new(name, description.unwrap_or_default()))
            .await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Category, DomainError> {
        Self::authorize(principal)?;
        let mut category = self.get(id).await?;

        if let Some(name) = changes.name.as_deref() {
            let name = validation::category_name(name)?;
            if let Some(other) = self.categories.find_by_name(&name).await? {
                if other.id != category.id {
                    return Err(DomainError::Conflict(format!(
                        "Another category named '{name}' already exists."
                    )));
                }
            }
            category.name = name;
        }
        if let Some(description) = changes.description {
            category.description = description;
        }
        category.updated_at = chrono::Utc::now();

        let category = self.categories.update(category).await?;
        tracing::info!(category_id = %category.id, "Category updated");
        Ok(category)
    }

    /// Refuses to delete a category that posts still point at.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        Self::authorize(principal)?;
        let category = self.get(id).await?;

        let in_use = self.posts.count_by_category(category.id).await?;
        if in_use > 0 {
            return Err(DomainError::Conflict(format!(
                "Cannot delete category '{}' as it is associated with {in_use} blog post(s).",
                category.name
            )));
        }

        self.categories.delete(category.id).await?;
        tracing::info!(category_id = %category.id, "Category deleted");
        Ok(())
    }

    /// Insert the default categories into an empty store.
    pub async fn seed_defaults(&self) -> Result<usize, DomainError> {
        if self.categories.count().await? > 0 {
            return Ok(0);
        }
        for (name, description) in DEFAULT_CATEGORIES {
            self.categories
                .insert(Category::new(name.to_string(), description.to_string()))
                .await?;
        }
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "Default categories seeded");
        Ok(DEFAULT_CATEGORIES.len())
    }

    fn authorize(principal: &Principal) -> Result<(), DomainError> {
        policy::can_mutate_category(principal)
            .require()
            .inspect_err(|_| {
                tracing::warn!(actor_id = %principal.id, "Category mutation denied");
            })
    }
}
