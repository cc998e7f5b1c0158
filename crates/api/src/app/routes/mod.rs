use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub mod courses;
pub mod programs;
pub mod system;
pub mod users;

/// Routes reachable without a token: signup/login and the public catalog.
pub fn public_router() -> Router {
    Router::new()
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/programs", get(programs::list_programs))
        .route("/courses", get(courses::list_courses))
}

/// Routes behind the auth middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/programs", post(programs::create_program))
        .route(
            "/programs/:id",
            put(programs::update_program).delete(programs::delete_program),
        )
        .route("/programs/subscribe/:id", post(programs::subscribe))
        .route("/programs/unsubscribe/:id", delete(programs::unsubscribe))
        .route("/courses", post(courses::create_course))
        .route(
            "/courses/:id",
            put(courses::update_course).delete(courses::delete_course),
        )
        .route("/courses/subscribe/:id", post(courses::subscribe))
        .route("/courses/unsubscribe/:id", delete(courses::unsubscribe))
        .route("/users/me", get(users::me))
        .route("/users/programs", get(users::my_programs))
        .route("/users/courses", get(users::my_courses))
        .route("/users/messages", post(users::send_message))
        .route("/users/students", get(users::list_students))
        .route("/users/admin/messages", get(users::admin_messages))
        .route("/users/admin/messages/:id/resolve", put(users::resolve_message))
}
