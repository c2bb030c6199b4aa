//! HTTP handlers and route configuration.

mod auth;
mod blogs;
mod categories;
mod comments;
mod health;
mod users;
mod views;

use std::sync::Arc;

use actix_web::web;

use quill_core::ports::RateLimiter;

use crate::middleware::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes. Only `/api/auth` is rate limited.
pub fn configure_routes(limiter: Arc<dyn RateLimiter>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health::health_check))
                    .service(
                        web::scope("/auth")
                            .wrap(RateLimitMiddleware::new(limiter))
                            .route("/signup", web::post().to(auth::signup))
                            .route("/login", web::post().to(auth::login)),
                    )
                    .service(
                        web::scope("/blogs")
                            .service(
                                web::resource("")
                                    .route(web::get().to(blogs::list))
                                    .route(web::post().to(blogs::create)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(blogs::get))
                                    .route(web::put().to(blogs::update))
                                    .route(web::delete().to(blogs::delete)),
                            )
                            .route("/{id}/like", web::put().to(blogs::like))
                            .route("/{id}/unlike", web::put().to(blogs::unlike))
                            .service(
                                web::resource("/{id}/comments")
                                    .route(web::get().to(comments::list))
                                    .route(web::post().to(comments::add)),
                            ),
                    )
                    .route("/comments/{id}", web::delete().to(comments::delete))
                    .service(
                        web::scope("/categories")
                            .service(
                                web::resource("")
                                    .route(web::get().to(categories::list))
                                    .route(web::post().to(categories::create)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(categories::get))
                                    .route(web::put().to(categories::update))
                                    .route(web::delete().to(categories::delete)),
                            ),
                    )
                    .service(
                        web::scope("/users")
                            .route("", web::get().to(users::list))
                            .service(
                                web::resource("/me")
                                    .route(web::get().to(users::me))
                                    .route(web::put().to(users::update_me)),
                            )
                            .route("/profile/{id}", web::get().to(users::public_profile))
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(users::get))
                                    .route(web::put().to(users::update))
                                    .route(web::delete().to(users::delete)),
                            ),
                    ),
            );
    }
}
