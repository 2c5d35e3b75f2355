use actix_cors::Cors;

use crate::config::SecurityConfig;

/// CORS policy for the API: any origin when `*` is configured, otherwise only the
/// listed origins. Methods and headers are unrestricted.
pub fn cors(settings: &SecurityConfig) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if settings.allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    settings
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::{test, web, App, HttpResponse};

    fn settings(origins: &[&str]) -> SecurityConfig {
        SecurityConfig {
            allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[actix_web::test]
    async fn wildcard_allows_any_origin() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&settings(&["*"])))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://anywhere.test"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert!(resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[actix_web::test]
    async fn listed_origin_is_echoed() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&settings(&["https://app.test"])))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.test"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://app.test")
        );
    }
}
