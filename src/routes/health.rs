use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

/// Liveness endpoint. Needs no authentication.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Todo List API"
    }))
}
