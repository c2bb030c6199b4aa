//! Field rules shared by the services. Each function returns the normalized
//! value or a `Validation` error.

use crate::error::DomainError;

pub const USERNAME_MIN: usize = 3;
pub const PASSWORD_MIN: usize = 6;
pub const TITLE_MAX: usize = 150;
pub const COMMENT_MAX: usize = 1000;
pub const BIO_MAX: usize = 200;

fn invalid(msg: impl Into<String>) -> DomainError {
    DomainError::Validation(msg.into())
}

pub fn username(raw: &str) -> Result<String, DomainError> {
    let value = raw.trim();
    if value.chars().count() < USERNAME_MIN {
        return Err(invalid(format!(
            "Username must be at least {USERNAME_MIN} characters long"
        )));
    }
    Ok(value.to_string())
}

/// Emails are compared case-insensitively, so they are stored lower-cased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize and check an email: something before an `@`, and a domain with
/// a dot that is neither first nor last. Unlike a bare `\S+@\S+\.\S+` search,
/// whitespace anywhere in the address is rejected.
pub fn email(raw: &str) -> Result<String, DomainError> {
    let value = normalize_email(raw);
    if !looks_like_email(&value) {
        return Err(invalid("Please use a valid email address"));
    }
    Ok(value)
}

fn looks_like_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    value.match_indices('@').any(|(at, _)| {
        let domain = &value[at + 1..];
        at > 0
            && domain
                .match_indices('.')
                .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

pub fn password(raw: &str) -> Result<(), DomainError> {
    if raw.chars().count() < PASSWORD_MIN {
        return Err(invalid(format!(
            "Password must be at least {PASSWORD_MIN} characters long"
        )));
    }
    Ok(())
}

pub fn post_title(raw: &str) -> Result<String, DomainError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid("Blog title is required"));
    }
    if value.chars().count() > TITLE_MAX {
        return Err(invalid(format!("Title cannot exceed {TITLE_MAX} characters")));
    }
    Ok(value.to_string())
}

pub fn post_content(raw: &str) -> Result<String, DomainError> {
    if raw.trim().is_empty() {
        return Err(invalid("Blog content is required"));
    }
    Ok(raw.to_string())
}

pub fn comment_text(raw: &str) -> Result<String, DomainError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid("Comment text is required"));
    }
    if value.chars().count() > COMMENT_MAX {
        return Err(invalid(format!(
            "Comment cannot exceed {COMMENT_MAX} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn bio(raw: &str) -> Result<String, DomainError> {
    if raw.chars().count() > BIO_MAX {
        return Err(invalid(format!("Bio cannot exceed {BIO_MAX} characters")));
    }
    Ok(raw.to_string())
}

pub fn category_name(raw: &str) -> Result<String, DomainError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid("Category name is required"));
    }
    Ok(value.to_string())
}

/// Trim, drop empties and de-duplicate while keeping order.
pub fn tags(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized_and_checked() {
        assert_eq!(email("  Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(email("alice@example").is_err());
        assert!(email("alice example@x.io").is_err());
        assert!(email("@x.io").is_err());
        assert!(email("a@.io").is_err());
        assert!(email("a@b.c").is_ok());
    }

    #[test]
    fn username_and_password_lengths() {
        assert!(username(" ab ").is_err());
        assert_eq!(username(" bob ").unwrap(), "bob");
        assert!(password("12345").is_err());
        assert!(password("123456").is_ok());
    }

    #[test]
    fn title_limits() {
        assert!(post_title("   ").is_err());
        assert!(post_title(&"x".repeat(TITLE_MAX + 1)).is_err());
        assert_eq!(post_title(" Hello ").unwrap(), "Hello");
    }

    #[test]
    fn comment_limits() {
        assert!(comment_text("").is_err());
        assert!(comment_text(&"y".repeat(COMMENT_MAX + 1)).is_err());
        assert_eq!(comment_text("  nice post ").unwrap(), "nice post");
    }

    #[test]
    fn tags_are_cleaned() {
        let cleaned = tags(vec![" rust ".into(), "".into(), "web".into(), "rust".into()]);
        assert_eq!(cleaned, vec!["rust".to_string(), "web".to_string()]);
    }
}
