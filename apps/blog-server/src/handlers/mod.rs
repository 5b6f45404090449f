//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;
mod home;


use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::post().to(auth::logout))
        .service(
            web::resource("/blog")
                .route(web::get().to(blog::view_blog))
                .route(web::post().to(blog::create_post)),
        )
        .service(
            web::resource("/blog/edit/{post_id}")
                .route(web::get().to(blog::edit_post_page))
                .route(web::post().to(blog::update_post)),
        )
        .route("/blog/delete/{post_id}", web::post().to(blog::delete_post));
}
