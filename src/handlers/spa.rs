use std::path::{Path, PathBuf};

use actix_files::{Files, NamedFile};
use actix_web::{
    dev::{fn_service, ServiceRequest, ServiceResponse},
    web, HttpRequest, HttpResponse, ResponseError,
};

use crate::errors::AppError;

/// JSON 404 for any `/api/*` path no handler claimed.
pub async fn api_not_found(req: HttpRequest) -> HttpResponse {
    log::debug!("No API route for {} {}", req.method(), req.path());
    AppError::NotFound(format!("No API route for {}", req.path())).error_response()
}

async fn bundle_missing() -> HttpResponse {
    AppError::NotFound("Client bundle not found".to_string()).error_response()
}

/// Serves the built client from `static_dir`. Paths with no matching file get
/// `index.html` so the client-side router can handle them.
pub fn configure_static(cfg: &mut web::ServiceConfig, static_dir: &Path) {
    if !static_dir.is_dir() {
        log::warn!(
            "Static directory {} not found; client routes will return 404",
            static_dir.display()
        );
        cfg.service(web::resource("/{tail:.*}").to(bundle_missing));
        return;
    }

    let index: PathBuf = static_dir.join("index.html");

    cfg.service(
        Files::new("/", static_dir)
            .index_file("index.html")
            .default_handler(fn_service(move |req: ServiceRequest| {
                let index = index.clone();
                async move {
                    let (req, _) = req.into_parts();
                    let res = match NamedFile::open_async(&index).await {
                        Ok(file) => file.into_response(&req),
                        Err(err) => {
                            log::warn!("Client bundle missing at {}: {}", index.display(), err);
                            AppError::NotFound("Client bundle not found".to_string())
                                .error_response()
                        }
                    };
                    Ok(ServiceResponse::new(req, res))
                }
            })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use std::fs;

    fn temp_bundle(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("prepmind-spa-{}-{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(dir.join("assets")).expect("create bundle dir");
        fs::write(dir.join("index.html"), "<html>prepmind</html>").expect("write index");
        fs::write(dir.join("assets/app.js"), "console.log('hi');").expect("write asset");
        dir
    }

    #[actix_web::test]
    async fn test_assets_and_spa_fallback() {
        let dir = temp_bundle("serve");
        let app = test::init_service(App::new().configure(|cfg| configure_static(cfg, &dir))).await;

        let req = test::TestRequest::get().uri("/assets/app.js").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "console.log('hi');".as_bytes());

        for uri in ["/", "/practice", "/tutor/session"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
            let body = test::read_body(resp).await;
            assert_eq!(body, "<html>prepmind</html>".as_bytes());
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[actix_web::test]
    async fn test_missing_bundle_is_not_found() {
        let dir = std::env::temp_dir().join(format!("prepmind-missing-{}", uuid::Uuid::new_v4()));
        let app = test::init_service(App::new().configure(|cfg| configure_static(cfg, &dir))).await;

        let req = test::TestRequest::get().uri("/practice").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_api_not_found_is_json() {
        let app = test::init_service(
            App::new().service(web::scope("/api").default_service(web::to(api_not_found))),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 404);
    }
}
