//! Poll loop behaviour against a scripted job service.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use hwpgen_client::error::WorkflowError;
use hwpgen_client::poller::{poll_until_terminal, PollPolicy, TransportErrorPolicy};
use hwpgen_core::job::{JobStatus, StatusResponse, MSG_JOB_FAILED_FALLBACK};
use tokio_util::sync::CancellationToken;

use common::*;

// ---------------------------------------------------------------------------
// Terminal statuses
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stops_on_first_completed() {
    let service = ScriptedService::new(
        created("abc123"),
        vec![Ok(pending()), Ok(completed("out.hwp")), Ok(pending())],
    );
    let cancel = CancellationToken::new();

    let filename = poll_until_terminal(&service, &job_id("abc123"), &PollPolicy::default(), &cancel)
        .await
        .unwrap();

    assert_eq!(filename, "out.hwp");
    assert_eq!(service.polls(), 2);

    // Nothing else is polled afterwards, even with time passing.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(service.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn polls_once_per_interval() {
    let service = ScriptedService::new(
        created("a"),
        vec![Ok(pending()), Ok(pending()), Ok(completed("out.hwp"))],
    );
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    poll_until_terminal(&service, &job_id("a"), &PollPolicy::default(), &cancel)
        .await
        .unwrap();

    // First check immediately, then one per second.
    assert_eq!(started.elapsed().as_secs(), 2);
    assert_eq!(service.polls(), 3);
}

#[tokio::test(start_paused = true)]
async fn error_message_surfaced_verbatim() {
    let service = ScriptedService::new(created("a"), vec![Ok(failed(Some("서식 오류")))]);
    let cancel = CancellationToken::new();

    let err = poll_until_terminal(&service, &job_id("a"), &PollPolicy::default(), &cancel)
        .await
        .unwrap_err();

    assert_matches!(err, WorkflowError::Job { ref message } if message == "서식 오류");
    assert_eq!(service.polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn error_without_detail_uses_fallback() {
    let service = ScriptedService::new(created("a"), vec![Ok(pending()), Ok(failed(None))]);
    let cancel = CancellationToken::new();

    let err = poll_until_terminal(&service, &job_id("a"), &PollPolicy::default(), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), MSG_JOB_FAILED_FALLBACK);
}

#[tokio::test(start_paused = true)]
async fn unknown_status_keeps_polling() {
    let processing = StatusResponse {
        status: JobStatus::Other("processing".into()),
        filename: None,
        error: None,
    };
    let service = ScriptedService::new(
        created("a"),
        vec![Ok(processing), Ok(completed("out.hwp"))],
    );
    let cancel = CancellationToken::new();

    let filename = poll_until_terminal(&service, &job_id("a"), &PollPolicy::default(), &cancel)
        .await
        .unwrap();
    assert_eq!(filename, "out.hwp");
    assert_eq!(service.polls(), 2);
}

// ---------------------------------------------------------------------------
// Transport failures
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn transport_error_aborts_by_default() {
    let service = ScriptedService::new(
        created("a"),
        vec![Ok(pending()), Err(unavailable("down")), Ok(completed("out.hwp"))],
    );
    let cancel = CancellationToken::new();

    let err = poll_until_terminal(&service, &job_id("a"), &PollPolicy::default(), &cancel)
        .await
        .unwrap_err();

    assert_matches!(err, WorkflowError::PollTransport { .. });
    assert_eq!(err.user_message(), "상태 확인 중 오류가 발생했습니다.");
    assert_eq!(service.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn tolerated_transport_errors_keep_polling() {
    let service = ScriptedService::new(
        created("a"),
        vec![
            Err(unavailable("down")),
            Err(unavailable("down")),
            Ok(pending()),
            Err(unavailable("down")),
            Ok(completed("out.hwp")),
        ],
    );
    let policy = PollPolicy {
        on_transport_error: TransportErrorPolicy::Tolerate { max_consecutive: 3 },
        ..Default::default()
    };
    let cancel = CancellationToken::new();

    let filename = poll_until_terminal(&service, &job_id("a"), &policy, &cancel)
        .await
        .unwrap();
    assert_eq!(filename, "out.hwp");
    assert_eq!(service.polls(), 5);
}

#[tokio::test(start_paused = true)]
async fn tolerance_exhausted_after_consecutive_failures() {
    let service = ScriptedService::new(
        created("a"),
        vec![Err(unavailable("down")), Err(unavailable("down"))],
    );
    let policy = PollPolicy {
        on_transport_error: TransportErrorPolicy::Tolerate { max_consecutive: 2 },
        ..Default::default()
    };
    let cancel = CancellationToken::new();

    let err = poll_until_terminal(&service, &job_id("a"), &policy, &cancel)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::PollTransport { .. });
    assert_eq!(service.polls(), 2);
}

// ---------------------------------------------------------------------------
// Limits and cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn attempt_limit_reached() {
    let service = ScriptedService::new(created("a"), vec![]);
    let policy = PollPolicy {
        max_attempts: Some(3),
        ..Default::default()
    };
    let cancel = CancellationToken::new();

    let err = poll_until_terminal(&service, &job_id("a"), &policy, &cancel)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::PollLimit { attempts: 3, .. });
    assert_eq!(service.polls(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_polling() {
    let service = Arc::new(ScriptedService::new(created("a"), vec![]));
    let cancel = CancellationToken::new();

    let task = {
        let service = Arc::clone(&service);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            poll_until_terminal(service.as_ref(), &job_id("a"), &PollPolicy::default(), &cancel)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(2500)).await;
    cancel.cancel();
    let result = task.await.unwrap();

    assert_matches!(result, Err(WorkflowError::Cancelled));
    let polls = service.polls();
    assert_eq!(polls, 3);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(service.polls(), polls);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_never_polls() {
    let service = ScriptedService::new(created("a"), vec![Ok(completed("out.hwp"))]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result =
        poll_until_terminal(&service, &job_id("a"), &PollPolicy::default(), &cancel).await;
    assert_matches!(result, Err(WorkflowError::Cancelled));
    assert_eq!(service.polls(), 0);
}
