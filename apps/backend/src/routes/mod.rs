use actix_web::web;

pub mod admin;
pub mod health;
pub mod quiz;
pub mod realtime;
pub mod signup;

/// Register every route of the service.
///
/// Shared by `main.rs` and the test app builder so both serve the same
/// paths; `main.rs` only adds the middleware stack around it.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    cfg.configure(health::configure_routes);

    // Participant routes: /api/quiz/**
    cfg.service(web::scope("/api/quiz").configure(quiz::configure_routes));

    // Signup: /api/signup
    cfg.service(web::scope("/api/signup").configure(signup::configure_routes));

    // Moderator routes: /api/admin/** (Basic auth per handler)
    cfg.service(web::scope("/api/admin").configure(admin::configure_routes));

    // Websocket push: /api/ws
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));
}
