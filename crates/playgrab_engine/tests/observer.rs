use std::time::Duration;

use futures_util::StreamExt;
use playgrab_engine::{pending_queue, CapturedRequest, NetworkObserver, RequestStream};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

fn channel_stream() -> (mpsc::UnboundedSender<String>, RequestStream) {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|url| (url, rx))
    })
    .boxed();
    (tx, stream)
}

#[test]
fn queue_never_exceeds_capacity() {
    let (producer, mut queue) = pending_queue(3);

    assert!(producer.offer("a".into()));
    assert!(producer.offer("b".into()));
    assert!(producer.offer("c".into()));
    assert!(!producer.offer("d".into()));
    assert!(!producer.offer("e".into()));
    assert_eq!(queue.len(), 3);

    let drained = std::iter::from_fn(|| queue.try_next())
        .map(|request| request.url)
        .collect::<Vec<_>>();
    assert_eq!(drained, vec!["a", "b", "c"]);

    let stats = producer.stats();
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.dropped, 2);
}

#[test]
fn room_frees_up_after_a_dequeue() {
    let (producer, mut queue) = pending_queue(1);
    assert!(producer.offer("first".into()));
    assert!(!producer.offer("second".into()));

    assert_eq!(
        queue.try_next(),
        Some(CapturedRequest {
            url: "first".into(),
            sequence: 0
        })
    );
    assert!(producer.offer("third".into()));
    // Sequence counts every matching arrival, dropped ones included.
    assert_eq!(queue.try_next().map(|r| r.sequence), Some(2));
    assert!(queue.is_empty());
}

#[test]
fn zero_capacity_behaves_as_one() {
    let (producer, queue) = pending_queue(0);
    assert!(producer.offer("only".into()));
    assert!(!producer.offer("extra".into()));
    assert_eq!(queue.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn next_within_times_out_on_empty_queue() {
    let (_producer, mut queue) = pending_queue(4);
    let started = tokio::time::Instant::now();
    assert_eq!(queue.next_within(Duration::from_secs(2)).await, None);
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn next_within_takes_exactly_one_item() {
    let (producer, mut queue) = pending_queue(4);
    producer.offer("a".into());
    producer.offer("b".into());

    let first = queue.next_within(Duration::from_secs(2)).await;
    assert_eq!(first.map(|r| r.url).as_deref(), Some("a"));
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn observer_filters_by_target_host() {
    let (tx, stream) = channel_stream();
    let (observer, mut queue) = NetworkObserver::install(stream, "t4.bcbits.com", 10);

    for url in [
        "https://bandcamp.com/api/tracklist",
        "https://t4.bcbits.com/stream/abc/mp3-128/1?token=x",
        "https://f4.bcbits.com/img/cover.jpg",
        "https://t4.bcbits.com/stream/def/mp3-128/2?token=y",
    ] {
        tx.send(url.to_string()).unwrap();
    }

    let window = Duration::from_secs(1);
    let first = queue.next_within(window).await.unwrap();
    let second = queue.next_within(window).await.unwrap();
    assert_eq!(first.url, "https://t4.bcbits.com/stream/abc/mp3-128/1?token=x");
    assert_eq!(second.url, "https://t4.bcbits.com/stream/def/mp3-128/2?token=y");

    let stats = observer.shutdown().await;
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.dropped, 0);
    assert!(queue.try_next().is_none());
}

#[tokio::test]
async fn shutdown_stops_the_subscription() {
    let (tx, stream) = channel_stream();
    let (observer, mut queue) = NetworkObserver::install(stream, "t4.bcbits.com", 10);

    observer.shutdown().await;
    let _ = tx.send("https://t4.bcbits.com/stream/late".to_string());

    assert_eq!(queue.next_within(Duration::from_millis(50)).await, None);
}
