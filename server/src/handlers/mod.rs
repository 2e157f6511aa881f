use crate::connection::ws_index;
use actix_web::{web, HttpResponse, Responder};

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health)));
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)));
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("Whiteboard relay running")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::spawn_server;
    use actix_web::{test, App};

    #[actix_rt::test]
    async fn it_answers_health_check() {
        let srv_tx = spawn_server();
        let mut app = test::init_service(App::new().data(srv_tx).configure(root)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert!(resp.status().is_success());
    }
}
