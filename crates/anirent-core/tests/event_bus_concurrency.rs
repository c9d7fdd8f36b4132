//! Event bus behaviour under concurrent publishers and subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anirent_core::{BusError, DownloadEvent, EventBus, TicketId};
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_key_order_holds_across_concurrent_keys() {
    let bus = Arc::new(EventBus::<DownloadEvent>::new());
    let tickets: Vec<TicketId> = (0..8).map(|_| TicketId::generate()).collect();

    let mut receivers = Vec::new();
    let mut guards = Vec::new();
    for ticket in &tickets {
        bus.create_or_get_stream(ticket.as_str());
        let (tx, rx) = mpsc::unbounded_channel();
        let guard = assert_ok!(bus.subscribe(ticket.as_str(), move |ev: &DownloadEvent| {
            let _ = tx.send(ev.clone());
        }));
        guards.push(guard);
        receivers.push(rx);
    }

    let mut publishers = Vec::new();
    for ticket in tickets.clone() {
        let bus = Arc::clone(&bus);
        publishers.push(tokio::spawn(async move {
            for n in 0..100u64 {
                let event = DownloadEvent::progress(&ticket, "http://x", n, 100, "/tmp/x");
                bus.publish(ticket.as_str(), event).await;
            }
        }));
    }
    for publisher in publishers {
        publisher.await.unwrap();
    }

    for (ticket, rx) in tickets.iter().zip(receivers.iter_mut()) {
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            assert_eq!(&event.ticket_id, ticket);
            if let anirent_core::EventPayload::Progress {
                downloaded_bytes, ..
            } = event.payload
            {
                seen.push(downloaded_bytes);
            }
        }
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn churning_subscribers_never_disturb_a_stable_one() {
    let bus = Arc::new(EventBus::<u64>::new());
    bus.create_or_get_stream("ticket");

    let stable_count = Arc::new(AtomicUsize::new(0));
    let _stable = {
        let stable_count = Arc::clone(&stable_count);
        assert_ok!(bus.subscribe("ticket", move |_| {
            stable_count.fetch_add(1, Ordering::SeqCst);
        }))
    };

    let churn = {
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            for _ in 0..200 {
                let guard = bus.subscribe("ticket", |_| {}).unwrap();
                tokio::task::yield_now().await;
                guard.unsubscribe();
            }
        })
    };

    for n in 0..200 {
        bus.publish("ticket", n).await;
    }
    churn.await.unwrap();

    assert_eq!(stable_count.load(Ordering::SeqCst), 200);
    assert_eq!(bus.subscriber_count("ticket"), Some(1));
}

#[tokio::test]
async fn closed_key_reports_not_found() {
    let bus = EventBus::<u64>::new();
    bus.create_or_get_stream("ticket");
    bus.close("ticket");

    let err = assert_err!(bus.subscribe("ticket", |_| {}));
    assert!(matches!(err, BusError::NotFound { .. }));
}
