use actix_web::{get, HttpResponse, Responder};

#[get("/healthcheck")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
