use std::{
    sync::{
        atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use dust_dds_status::infrastructure::{
    listener::Listener,
    status::{StatusChange, StatusKind},
};

mod utils;
use crate::utils::entity_tree::EntityTree;

const THREADS: usize = 8;
const RAISES_PER_THREAD: usize = 200;

/// Tracks how many callbacks of one listener run at the same time.
#[derive(Default)]
struct Occupancy {
    running: AtomicUsize,
    overlapped: AtomicBool,
}

impl Occupancy {
    fn enter(&self) {
        if self.running.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        thread::yield_now();
    }

    fn exit(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn callbacks_of_one_listener_never_overlap() {
    let tree = EntityTree::new();
    let occupancy = Arc::new(Occupancy::default());
    let received_changes = Arc::new(AtomicI32::new(0));
    let listener = Listener::new().on_sample_lost({
        let occupancy = occupancy.clone();
        let received_changes = received_changes.clone();
        move |_, status| {
            occupancy.enter();
            received_changes.fetch_add(status.total_count_change, Ordering::SeqCst);
            occupancy.exit();
        }
    });
    tree.participant
        .set_listener(Some(listener), &[StatusKind::SampleLost])
        .unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..RAISES_PER_THREAD {
                    tree.reader
                        .raise_status(StatusChange::SampleLost { delta: 1 });
                }
            });
        }
    });

    let total_raised = (THREADS * RAISES_PER_THREAD) as i32;
    assert!(!occupancy.overlapped.load(Ordering::SeqCst));
    assert_eq!(received_changes.load(Ordering::SeqCst), total_raised);
    assert!(tree.reader.get_status_changes().unwrap().is_empty());
    assert_eq!(
        tree.reader.dispatch_statistics().delivered,
        total_raised as u64
    );
}

#[test]
fn raises_on_different_entities_reach_their_listeners() {
    let tree = EntityTree::new();
    let reader_calls = Arc::new(AtomicUsize::new(0));
    let writer_calls = Arc::new(AtomicUsize::new(0));
    let reader_listener = Listener::new().on_data_available({
        let reader_calls = reader_calls.clone();
        move |_| {
            reader_calls.fetch_add(1, Ordering::SeqCst);
        }
    });
    let writer_listener = Listener::new().on_liveliness_lost({
        let writer_calls = writer_calls.clone();
        move |_, _| {
            writer_calls.fetch_add(1, Ordering::SeqCst);
        }
    });
    tree.reader
        .set_listener(Some(reader_listener), &[StatusKind::DataAvailable])
        .unwrap();
    tree.writer
        .set_listener(Some(writer_listener), &[StatusKind::LivelinessLost])
        .unwrap();

    thread::scope(|s| {
        for i in 0..THREADS {
            let tree = &tree;
            s.spawn(move || {
                for _ in 0..RAISES_PER_THREAD {
                    if i % 2 == 0 {
                        tree.reader.raise_status(StatusChange::DataAvailable);
                    } else {
                        tree.writer
                            .raise_status(StatusChange::LivelinessLost { delta: 1 });
                    }
                }
            });
        }
    });

    let raises_per_entity = THREADS / 2 * RAISES_PER_THREAD;
    assert_eq!(reader_calls.load(Ordering::SeqCst), raises_per_entity);
    assert_eq!(writer_calls.load(Ordering::SeqCst), raises_per_entity);
}

#[test]
fn listener_replaced_while_dispatching_gets_every_status_once() {
    let tree = EntityTree::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counting_listener = || {
        let calls = calls.clone();
        Listener::new().on_requested_deadline_missed(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    tree.subscriber
        .set_listener(
            Some(counting_listener()),
            &[StatusKind::RequestedDeadlineMissed],
        )
        .unwrap();
    let raising_done = AtomicBool::new(false);

    thread::scope(|s| {
        let raisers: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    for _ in 0..RAISES_PER_THREAD {
                        tree.reader
                            .raise_status(StatusChange::requested_deadline_missed(1));
                    }
                })
            })
            .collect();
        s.spawn(|| {
            while !raising_done.load(Ordering::SeqCst) {
                let previous = tree
                    .subscriber
                    .set_listener(
                        Some(counting_listener()),
                        &[StatusKind::RequestedDeadlineMissed],
                    )
                    .unwrap();
                assert!(previous.is_some());
            }
        });
        for raiser in raisers {
            raiser.join().unwrap();
        }
        raising_done.store(true, Ordering::SeqCst);
    });

    assert_eq!(calls.load(Ordering::SeqCst), THREADS * RAISES_PER_THREAD);
    assert_eq!(tree.reader.dispatch_statistics().undelivered, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn raises_from_blocking_tasks_are_all_accounted_for() {
    let tree = Arc::new(EntityTree::new());
    let received_changes = Arc::new(AtomicI32::new(0));
    let listener = Listener::new().on_inconsistent_topic({
        let received_changes = received_changes.clone();
        move |_, status| {
            received_changes.fetch_add(status.total_count_change, Ordering::SeqCst);
        }
    });
    tree.participant
        .set_listener(Some(listener), &[StatusKind::InconsistentTopic])
        .unwrap();

    let tasks: Vec<_> = (0..THREADS)
        .map(|_| {
            let tree = tree.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..RAISES_PER_THREAD {
                    tree.topic
                        .raise_status(StatusChange::InconsistentTopic { delta: 2 });
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(
        received_changes.load(Ordering::SeqCst),
        (2 * THREADS * RAISES_PER_THREAD) as i32
    );
}
