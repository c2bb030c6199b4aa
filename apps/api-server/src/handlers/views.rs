//! Domain -> wire conversions.

use quill_core::domain::{Category, Comment, Post, SocialLinks, User};
use quill_core::services::Session;
use quill_shared::dto::{
    AuthResponse, CategoryResponse, CommentResponse, PostResponse, SocialLinksDto, UserResponse,
};

pub fn auth(session: Session) -> AuthResponse {
    AuthResponse {
        id: session.user.id,
        username: session.user.username,
        email: session.user.email,
        role: session.user.role.to_string(),
        token: session.token,
    }
}

/// Full account view for the owner or an administrator.
pub fn user(user: &User) -> UserResponse {
    UserResponse {
        email: Some(user.email.clone()),
        ..public_user(user)
    }
}

/// Account view shown to anyone; the email stays private.
pub fn public_user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: None,
        role: user.role.to_string(),
        profile_pic: user.profile_pic.clone(),
        bio: user.bio.clone(),
        social_links: social_links_dto(&user.social_links),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn social_links_dto(links: &SocialLinks) -> SocialLinksDto {
    SocialLinksDto {
        twitter: links.twitter.clone(),
        linkedin: links.linkedin.clone(),
        github: links.github.clone(),
    }
}

pub fn social_links(dto: SocialLinksDto) -> SocialLinks {
    SocialLinks {
        twitter: dto.twitter,
        linkedin: dto.linkedin,
        github: dto.github,
    }
}

pub fn post(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        author: post.author_id,
        category: post.category_id,
        tags: post.tags.clone(),
        cover_image: post.cover_image.clone(),
        status: post.status.to_string(),
        likes: post.likes(),
        liked_by: post.liked_by.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn posts(posts: &[Post]) -> Vec<PostResponse> {
    posts.iter().map(post).collect()
}

pub fn comment(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        blog: comment.post_id,
        author: comment.author_id,
        text: comment.text.clone(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

pub fn category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name.clone(),
        description: category.description.clone(),
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}
