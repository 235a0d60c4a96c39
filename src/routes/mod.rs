// Route exports
pub mod cron;
pub mod matches;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(matches::configure))
        .service(web::scope("/cron").configure(cron::configure));
}
