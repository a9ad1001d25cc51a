//! Launch pacing and the in-flight cap of the model loader.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use aerostat::{BoundedLoader, Inbox};
use parking_lot::Mutex;

#[tokio::test]
async fn test_launches_are_staggered_and_capped() {
    let loader = BoundedLoader::new(3, Duration::from_millis(20));
    let launches = Arc::new(Mutex::new(Vec::new()));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let inbox = Inbox::new();

    let stats = {
        let launches = Arc::clone(&launches);
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        let inbox = inbox.clone();
        loader
            .run(
                0..8_u32,
                move |id| {
                    launches.lock().push(Instant::now());
                    let in_flight = Arc::clone(&in_flight);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        id
                    }
                },
                move |id| {
                    inbox.push(id);
                },
            )
            .await
    };

    assert_eq!(stats.launched, 8);
    assert_eq!(stats.completed, 8);
    assert_eq!(stats.aborted, 0);
    assert!(stats.peak_in_flight <= 3);
    assert!(peak.load(Ordering::SeqCst) <= 3);

    let launches = launches.lock();
    for pair in launches.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(19));
    }

    let mut delivered = inbox.drain();
    delivered.sort_unstable();
    assert_eq!(delivered, (0..8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_results_after_close_are_discarded() {
    let loader = BoundedLoader::new(2, Duration::ZERO);
    let inbox: Inbox<u32> = Inbox::new();
    inbox.close();

    let sink = inbox.clone();
    let stats = loader
        .run(0..4_u32, |id| async move { id }, move |id| {
            sink.push(id);
        })
        .await;

    assert_eq!(stats.completed, 4);
    assert_eq!(inbox.pending(), 0);
    assert_eq!(inbox.discarded(), 4);
}
