use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    ProfilePic,
    Bio,
    Twitter,
    Linkedin,
    Github,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    AuthorId,
    Title,
    Content,
    CategoryId,
    Tags,
    CoverImage,
    Status,
    LikedBy,
    Likes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    AuthorId,
    Text,
    CreatedAt,
    UpdatedAt,
}

fn timestamps(table: &mut TableCreateStatement, created: impl IntoIden, updated: impl IntoIden) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut users = Table::create();
        users
            .table(Users::Table)
            .if_not_exists()
            .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
            .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
            .col(ColumnDef::new(Users::PasswordHash).string().not_null())
            .col(
                ColumnDef::new(Users::Role)
                    .string_len(16)
                    .not_null()
                    .default("user"),
            )
            .col(ColumnDef::new(Users::ProfilePic).string().not_null().default(""))
            .col(ColumnDef::new(Users::Bio).text().not_null().default(""))
            .col(ColumnDef::new(Users::Twitter).string())
            .col(ColumnDef::new(Users::Linkedin).string())
            .col(ColumnDef::new(Users::Github).string());
        timestamps(&mut users, Users::CreatedAt, Users::UpdatedAt);
        manager.create_table(users).await?;

        let mut categories = Table::create();
        categories
            .table(Categories::Table)
            .if_not_exists()
            .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Categories::Name).string().not_null())
            .col(
                ColumnDef::new(Categories::Description)
                    .text()
                    .not_null()
                    .default(""),
            );
        timestamps(&mut categories, Categories::CreatedAt, Categories::UpdatedAt);
        manager.create_table(categories).await?;

        // Category names are unique ignoring case.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name_lower ON categories (LOWER(name))",
            )
            .await?;

        let mut posts = Table::create();
        posts
            .table(Posts::Table)
            .if_not_exists()
            .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
            .col(ColumnDef::new(Posts::Title).string_len(150).not_null())
            .col(ColumnDef::new(Posts::Content).text().not_null())
            .col(ColumnDef::new(Posts::CategoryId).uuid().not_null())
            .col(
                ColumnDef::new(Posts::Tags)
                    .array(ColumnType::Text)
                    .not_null()
                    .default(Expr::cust("'{}'")),
            )
            .col(ColumnDef::new(Posts::CoverImage).string().not_null().default(""))
            .col(
                ColumnDef::new(Posts::Status)
                    .string_len(16)
                    .not_null()
                    .default("draft"),
            )
            .col(
                ColumnDef::new(Posts::LikedBy)
                    .array(ColumnType::Uuid)
                    .not_null()
                    .default(Expr::cust("'{}'")),
            )
            .col(ColumnDef::new(Posts::Likes).integer().not_null().default(0))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_posts_author")
                    .from(Posts::Table, Posts::AuthorId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_posts_category")
                    .from(Posts::Table, Posts::CategoryId)
                    .to(Categories::Table, Categories::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            );
        timestamps(&mut posts, Posts::CreatedAt, Posts::UpdatedAt);
        manager.create_table(posts).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_status_created_at")
                    .table(Posts::Table)
                    .col(Posts::Status)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_author")
                    .table(Posts::Table)
                    .col(Posts::AuthorId)
                    .to_owned(),
            )
            .await?;

        let mut comments = Table::create();
        comments
            .table(Comments::Table)
            .if_not_exists()
            .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Comments::PostId).uuid().not_null())
            .col(ColumnDef::new(Comments::AuthorId).uuid().not_null())
            .col(ColumnDef::new(Comments::Text).text().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_comments_post")
                    .from(Comments::Table, Comments::PostId)
                    .to(Posts::Table, Posts::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_comments_author")
                    .from(Comments::Table, Comments::AuthorId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            );
        timestamps(&mut comments, Comments::CreatedAt, Comments::UpdatedAt);
        manager.create_table(comments).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comments_post")
                    .table(Comments::Table)
                    .col(Comments::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}
