//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, NotSet,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
};
use uuid::Uuid;

use quill_core::domain::{
    Category, Comment, LikeOutcome, LikeTally, Page, Post, PostQuery, SortField, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthorPosts, CategoryRepository, CommentRepository, PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

// Membership test and recount happen in one statement, so concurrent likes
// serialize on the row lock and `likes` always equals the set size.
const ADD_LIKE_SQL: &str = r#"
UPDATE posts
   SET liked_by = array_append(liked_by, $2),
       likes = cardinality(array_append(liked_by, $2))
 WHERE id = $1 AND NOT ($2 = ANY(liked_by))
RETURNING *"#;

const REMOVE_LIKE_SQL: &str = r#"
UPDATE posts
   SET liked_by = array_remove(liked_by, $2),
       likes = cardinality(array_remove(liked_by, $2))
 WHERE id = $1 AND $2 = ANY(liked_by)
RETURNING *"#;

const REMOVE_LIKER_SQL: &str = r#"
UPDATE posts
   SET liked_by = array_remove(liked_by, $1),
       likes = cardinality(array_remove(liked_by, $1))
 WHERE $1 = ANY(liked_by)"#;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.len() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let active = user::ActiveModel {
            created_at: NotSet,
            ..user.into()
        };
        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

impl PostgresPostRepository {
    async fn run_like_statement(
        &self,
        sql: &str,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [post_id.into(), user_id.into()],
        );
        let updated = PostEntity::find()
            .from_raw_sql(stmt)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        if let Some(model) = updated {
            let post: Post = model.into();
            return Ok(LikeOutcome::Applied(LikeTally::from(&post)));
        }

        let exists = PostEntity::find_by_id(post_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();

        Ok(if exists {
            LikeOutcome::Unchanged
        } else {
            LikeOutcome::PostMissing
        })
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::for_update(post)
            .update(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn list_published(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let mut select =
            PostEntity::find().filter(post::Column::Status.eq(post::Status::Published));

        if let Some(category_id) = query.category_id {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }
        if let Some(author_id) = query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if !query.tags.is_empty() {
            select = select.filter(Expr::cust_with_values(
                r#""posts"."tags" && ?"#,
                [query.tags.clone()],
            ));
        }
        if let Some(term) = query.search.as_deref() {
            let pattern = format!("%{}%", escape_like(term));
            select = select.filter(
                Condition::any()
                    .add(Expr::cust_with_values(
                        r#""posts"."title" ILIKE ?"#,
                        [pattern.clone()],
                    ))
                    .add(Expr::cust_with_values(
                        r#""posts"."content" ILIKE ?"#,
                        [pattern],
                    )),
            );
        }

        let column = match query.sort.field {
            SortField::CreatedAt => post::Column::CreatedAt,
            SortField::Likes => post::Column::Likes,
            SortField::Title => post::Column::Title,
        };
        let order = if query.sort.descending {
            Order::Desc
        } else {
            Order::Asc
        };
        let select = select
            .order_by(column, order)
            .order_by(post::Column::Id, Order::Asc);

        let paginator = select.paginate(&self.db, query.limit);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let items = if query.offset() >= total {
            Vec::new()
        } else {
            paginator
                .fetch_page(query.page.saturating_sub(1))
                .await
                .map_err(map_db_err)?
        };

        Ok(Page {
            items: items.into_iter().map(Into::into).collect(),
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn find_by_author(
        &self,
        author_id: Uuid,
        filter: AuthorPosts,
    ) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find().filter(post::Column::AuthorId.eq(author_id));
        if filter.published_only {
            select = select.filter(post::Column::Status.eq(post::Status::Published));
        }

        let result = select
            .order_by_desc(post::Column::CreatedAt)
            .limit(filter.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        self.run_like_statement(ADD_LIKE_SQL, post_id, user_id).await
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        self.run_like_statement(REMOVE_LIKE_SQL, post_id, user_id)
            .await
    }

    async fn remove_liker(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                REMOVE_LIKER_SQL,
                [user_id.into()],
            ))
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(category::Column::Name)))
                    .eq(name.to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let active = category::ActiveModel {
            created_at: NotSet,
            ..category.into()
        };
        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        CategoryEntity::find()
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_email_local_part() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("nonsense"), "***");
    }

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
