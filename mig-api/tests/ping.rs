use actix_web::{App, http::StatusCode, test, web};
use mig_api::routes::ping::ping;
use mig_telemetry::init_test_tracing;

#[actix_web::test]
async fn ping_returns_pong() {
    init_test_tracing();

    let app = test::init_service(App::new().service(web::scope("/validator").service(ping))).await;

    let req = test::TestRequest::get()
        .uri("/validator/ping")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(body, "\"pong\"".as_bytes());
}
