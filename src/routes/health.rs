use crate::response::Envelope;

/// Health check endpoint
///
/// Answers every method with a 200 envelope. Never authenticated.
pub async fn health() -> Envelope {
    Envelope::ok("health ok!", None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_rt::test]
    async fn test_health_endpoint() {
        let app = test::init_service(
            App::new().service(web::resource("/health").to(health)),
        )
        .await;

        for req in [
            test::TestRequest::get().uri("/health").to_request(),
            test::TestRequest::post().uri("/health").to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());

            let json: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(
                json,
                serde_json::json!({ "success": true, "code": 200, "message": "health ok!" })
            );
        }
    }
}
