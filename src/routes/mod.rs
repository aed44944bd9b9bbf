pub mod admin;
pub mod auth;
pub mod categories;
pub mod health;
pub mod task_categories;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Registers every API scope. Access rules live in
/// [`AuthorizationPolicy`](crate::auth::AuthorizationPolicy), not here.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(auth::login)
            .service(auth::logout)
            .service(auth::register)
            .service(auth::authenticated)
            .service(auth::is_admin),
    )
    .service(
        web::scope("/api/users")
            .service(users::get_profile)
            .service(users::update_profile)
            .service(users::change_password)
            .service(users::delete_account),
    )
    .service(
        web::scope("/api/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/api/categories")
            .service(categories::get_categories)
            .service(categories::create_category)
            .service(categories::get_category)
            .service(categories::delete_category),
    )
    .service(
        web::scope("/api/taskcategories")
            .service(task_categories::get_task_categories)
            .service(task_categories::create_task_category)
            .service(task_categories::update_task_category)
            .service(task_categories::get_category_for_task)
            .service(task_categories::delete_task_category),
    )
    .service(
        web::scope("/admin")
            .service(admin::list_users)
            .service(admin::create_user)
            .service(admin::update_user)
            .service(admin::delete_user)
            .service(admin::list_tasks),
    );
}
