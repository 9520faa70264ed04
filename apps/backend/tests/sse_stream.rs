//! The server-sent events stream: snapshot, transitions, unsubscribe on drop.

mod common;

use actix_web::body::MessageBody;
use actix_web::http::StatusCode;
use actix_web::test;
use futures_util::future::poll_fn;
use quiz_backend::domain::RoundState;
use quiz_backend::infra::state::build_state;
use quiz_backend::test_support::create_test_app_builder;

async fn next_frame<B>(body: &mut B) -> String
where
    B: MessageBody + Unpin,
    B::Error: std::fmt::Debug,
{
    let chunk = poll_fn(|cx| std::pin::Pin::new(&mut *body).poll_next(cx))
        .await
        .expect("stream ended")
        .expect("body chunk");
    String::from_utf8(chunk.to_vec()).unwrap()
}

#[actix_web::test]
async fn stream_sends_snapshot_then_each_transition() {
    let state = build_state().build().await.unwrap();
    let orchestrator = state.orchestrator();
    orchestrator.set_state(RoundState::Finished);
    let app = create_test_app_builder(state).build().await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/quiz/stream").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(orchestrator.subscriber_count(), 1);

    let mut body = resp.into_body();
    assert_eq!(next_frame(&mut body).await, "data: {\"status\":\"finished\"}\n\n");

    orchestrator.set_state(RoundState::Standby);
    assert_eq!(next_frame(&mut body).await, "data: {\"status\":\"standby\"}\n\n");

    drop(body);
    assert_eq!(orchestrator.subscriber_count(), 0);
}
