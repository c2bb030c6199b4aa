//! Domain entities - the core business objects.

mod category;
mod comment;
mod post;
mod principal;
mod user;

pub use category::{Category, CategoryChanges, DEFAULT_CATEGORIES};
pub use comment::Comment;
pub use post::{
    LikeOutcome, LikeTally, NewPost, Page, Post, PostChanges, PostQuery, PostSort, PostStatus,
    SortField,
};
pub use principal::Principal;
pub use user::{ProfileChanges, Role, SocialLinks, User};
