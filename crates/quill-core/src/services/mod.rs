//! Domain services. Every mutating call runs the authorization policy
//! against a fresh snapshot before touching storage.

mod accounts;
mod categories;
mod comments;
mod gate;
mod posts;
mod profiles;

pub use accounts::{AccountService, Registration, Session};
pub use categories::CategoryService;
pub use comments::CommentService;
pub use gate::AuthGate;
pub use posts::PostService;
pub use profiles::{PUBLIC_PROFILE_POSTS, ProfileService};
