use pref_dns_application::use_cases::ServiceProbe;
use pref_dns_domain::{ServiceNames, ServiceRole};
use pref_dns_jobs::{JobRunner, StatusPollJob};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::MockServiceControl;

fn make_status_poll(control: Arc<MockServiceControl>) -> StatusPollJob {
    let probe = Arc::new(ServiceProbe::new(control, Duration::from_millis(200)));
    StatusPollJob::new(probe, ServiceNames::default()).with_interval(Duration::from_millis(50))
}

#[tokio::test]
async fn test_job_runner_empty_starts_cleanly() {
    assert_eq!(JobRunner::new().start().await, 0);
}

#[tokio::test]
async fn test_job_runner_with_status_poll() {
    let control = Arc::new(MockServiceControl::new());
    control.install("cron", true);
    let job = make_status_poll(control);
    let mut rx = job.subscribe();

    let started = JobRunner::new().with_status_poll(job).start().await;

    assert_eq!(started, 1);
    timeout(Duration::from_secs(2), rx.changed()).await.unwrap().unwrap();
    let snapshot = rx.borrow().clone().unwrap();
    assert!(snapshot.services[&ServiceRole::Scheduler].running);
}

#[tokio::test]
async fn test_job_runner_shutdown_token_cancels_jobs() {
    let control = Arc::new(MockServiceControl::new());
    control.install("mosdns", true);
    let token = CancellationToken::new();
    let job = make_status_poll(control.clone());

    JobRunner::new()
        .with_status_poll(job)
        .with_shutdown_token(token.clone())
        .start()
        .await;

    sleep(Duration::from_millis(80)).await;
    token.cancel();
    sleep(Duration::from_millis(30)).await;
    let checks = control.check_count();
    sleep(Duration::from_millis(150)).await;

    assert_eq!(control.check_count(), checks);
}
