use std::path::PathBuf;

use playgrab_core::{
    CaptureStatus, Effect, Iteration, OutcomeError, Phase, Signal, TriggerControl,
};
use pretty_assertions::assert_eq;

fn iteration() -> Iteration {
    Iteration::new(TriggerControl::new("play3", "Play My Great Track!"))
}

#[test]
fn begin_requests_activation_of_the_control() {
    let mut it = iteration();
    assert_eq!(it.filename(), "my-great-track.mp4");
    assert_eq!(
        it.apply(Signal::Begin),
        vec![Effect::Activate {
            control_id: "play3".into()
        }]
    );
    assert_eq!(it.phase(), Phase::Idle);
}

#[test]
fn captured_url_leads_to_download() {
    let mut it = iteration();
    it.apply(Signal::Begin);
    assert_eq!(it.apply(Signal::Activated), vec![Effect::Settle]);
    assert_eq!(it.phase(), Phase::Triggered);
    assert_eq!(it.apply(Signal::Settled), vec![Effect::AwaitCapture]);
    assert_eq!(it.phase(), Phase::AwaitingCapture);

    let effects = it.apply(Signal::RequestCaptured("https://t4.bcbits.com/a".into()));
    assert_eq!(
        effects,
        vec![Effect::Download {
            url: "https://t4.bcbits.com/a".into(),
            filename: "my-great-track.mp4".into(),
        }]
    );
    assert_eq!(it.phase(), Phase::Captured);

    let effects = it.apply(Signal::DownloadSucceeded(PathBuf::from("my-great-track.mp4")));
    assert!(effects.is_empty());
    assert!(it.is_finished());

    let outcome = it.into_outcome().expect("terminal");
    assert_eq!(outcome.status, CaptureStatus::Captured);
    assert_eq!(outcome.url.as_deref(), Some("https://t4.bcbits.com/a"));
    assert_eq!(outcome.result, Ok(PathBuf::from("my-great-track.mp4")));
}

#[test]
fn window_elapsed_skips_without_download() {
    let mut it = iteration();
    it.apply(Signal::Begin);
    it.apply(Signal::Activated);
    it.apply(Signal::Settled);

    assert_eq!(it.apply(Signal::WindowElapsed), vec![Effect::Skip]);
    assert_eq!(it.phase(), Phase::TimedOut);
    assert!(!it.is_finished());

    // A capture arriving while the skip is pending is not a download.
    assert!(it.apply(Signal::RequestCaptured("late".into())).is_empty());
    assert_eq!(it.phase(), Phase::TimedOut);

    assert!(it.apply(Signal::Skipped).is_empty());
    assert_eq!(it.phase(), Phase::Skipped);
    assert!(it.is_finished());

    let outcome = it.into_outcome().expect("terminal");
    assert_eq!(outcome.status, CaptureStatus::TimedOut);
    assert_eq!(outcome.url, None);
    assert_eq!(outcome.result, Err(OutcomeError::CaptureTimeout));
}

#[test]
fn activation_failure_skips_immediately() {
    let mut it = iteration();
    it.apply(Signal::Begin);

    assert!(it.apply(Signal::ActivationFailed("gone".into())).is_empty());
    assert_eq!(it.phase(), Phase::Skipped);

    let outcome = it.into_outcome().expect("terminal");
    assert_eq!(outcome.status, CaptureStatus::NotActivated);
    assert_eq!(outcome.result, Err(OutcomeError::Activation("gone".into())));
}

#[test]
fn transfer_failure_is_recorded() {
    let mut it = iteration();
    it.apply(Signal::Begin);
    it.apply(Signal::Activated);
    it.apply(Signal::Settled);
    it.apply(Signal::RequestCaptured("https://t4.bcbits.com/b".into()));

    assert!(it.apply(Signal::DownloadFailed("http status 404".into())).is_empty());

    let outcome = it.into_outcome().expect("terminal");
    assert_eq!(outcome.status, CaptureStatus::Captured);
    assert_eq!(outcome.url.as_deref(), Some("https://t4.bcbits.com/b"));
    assert_eq!(
        outcome.result,
        Err(OutcomeError::Transfer("http status 404".into()))
    );
}

#[test]
fn out_of_order_signals_are_ignored() {
    let mut it = iteration();
    assert!(it.apply(Signal::Settled).is_empty());
    assert!(it.apply(Signal::RequestCaptured("x".into())).is_empty());
    assert!(it.apply(Signal::DownloadSucceeded(PathBuf::from("x"))).is_empty());
    assert!(it.apply(Signal::Skipped).is_empty());
    assert_eq!(it.phase(), Phase::Idle);

    it.apply(Signal::Activated);
    it.apply(Signal::Settled);
    it.apply(Signal::WindowElapsed);
    it.apply(Signal::Skipped);
    // A late capture after the window closed changes nothing.
    assert!(it.apply(Signal::RequestCaptured("late".into())).is_empty());
    assert_eq!(it.phase(), Phase::Skipped);
}

#[test]
fn unfinished_iteration_has_no_outcome() {
    let mut it = iteration();
    it.apply(Signal::Begin);
    it.apply(Signal::Activated);
    assert!(!it.is_finished());
    assert!(it.into_outcome().is_none());
}
