//! Queued updates from worker threads, drained by the frame driver

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::config::SceneConfig;
use crate::foundation::logging;
use crate::foundation::math::Vec3;
use crate::scene::{NodeTree, SceneManager, UpdateScheduler};

#[test]
fn test_worker_threads_queue_nodes_for_next_frame() {
    logging::init_with_level(log::LevelFilter::Debug);
    let mut scene = SceneManager::new();
    let root = scene.root_node();
    let nodes: Vec<_> = (0..32)
        .map(|i| scene.create_child_scene_node(root, Some(&format!("n{i}"))).unwrap())
        .collect();
    scene.update_scene_graph();
    scene.tree_mut().reset_stats();

    let queue = scene.update_queue();
    let handles: Vec<_> = nodes
        .chunks(8)
        .map(|chunk| {
            let queue = queue.clone();
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for node in chunk {
                    queue.queue_need_update(node);
                    // duplicates collapse
                    queue.queue_need_update(node);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(scene.tree().scheduler().pending_count(), 32);

    scene.update_scene_graph();
    assert_eq!(scene.tree().scheduler().pending_count(), 0);
    for node in nodes {
        assert_eq!(scene.tree().node(node).stats().recomputes, 1);
    }
}

#[test]
fn test_shared_scheduler_keeps_trees_apart() {
    let scheduler = UpdateScheduler::shared();
    let mut first = NodeTree::with_scheduler(Arc::clone(&scheduler));
    let mut second = NodeTree::with_scheduler(Arc::clone(&scheduler));
    let a = first.create_node(Some("a"));
    let b = second.create_node(Some("b"));
    first.update(a, true, true);
    second.update(b, true, true);

    first.queue_need_update(a);
    second.queue_need_update(b);
    assert_eq!(first.process_queued_updates(), 1);
    assert_eq!(scheduler.pending_count(), 1);
    assert!(second.update_queue().is_queued(b));
    assert_eq!(second.process_queued_updates(), 1);
}

#[test]
fn test_listeners_observe_every_recompute() {
    let scheduler = UpdateScheduler::shared();
    let mut scene = SceneManager::with_scheduler(SceneConfig::default(), scheduler).unwrap();
    let root = scene.root_node();
    let node = scene.create_child_scene_node(root, Some("body")).unwrap();
    scene.update_scene_graph();

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    scene.tree_mut().add_update_listener(node, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let queue = scene.update_queue();
    thread::spawn(move || {
        queue.queue_need_update(node);
    })
    .join()
    .unwrap();

    scene.update_scene_graph();
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    // a clean frame recomputes nothing
    scene.update_scene_graph();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_destroyed_node_queued_from_thread_is_ignored() {
    logging::init_with_level(log::LevelFilter::Warn);
    let mut scene = SceneManager::new();
    let root = scene.root_node();
    let node = scene.create_child_scene_node(root, Some("doomed")).unwrap();
    scene.destroy_scene_node(node);

    let queue = scene.update_queue();
    thread::spawn(move || {
        queue.queue_need_update(node);
    })
    .join()
    .unwrap();

    scene.update_scene_graph();
    assert_eq!(scene.tree().scheduler().pending_count(), 0);
    assert!(!scene.tree().contains(node));
}

#[test]
fn test_listener_queues_from_inside_the_cascade() {
    let mut tree = NodeTree::new();
    let root = tree.create_node(Some("root"));
    let body = tree.create_child(root, Some("body")).unwrap();
    tree.update(root, true, true);

    let queue = tree.update_queue();
    tree.add_update_listener(body, move |id, _| {
        queue.queue_need_update(id);
    });

    tree.set_position(body, Vec3::x());
    tree.update(root, true, false);

    assert!(tree.update_queue().is_queued(body));
    assert_eq!(tree.process_queued_updates(), 1);
}

#[test]
fn test_writers_wait_for_the_root_cascade() {
    let mut tree = NodeTree::new();
    let root = tree.create_node(Some("root"));
    let body = tree.create_child(root, Some("body")).unwrap();
    let other = tree.create_child(root, Some("other")).unwrap();
    tree.update(root, true, true);

    let (started, cascade_started) = mpsc::channel();
    let seen_mid_cascade = Arc::new(AtomicUsize::new(usize::MAX));
    let seen = Arc::clone(&seen_mid_cascade);
    let scheduler = Arc::clone(tree.scheduler());
    tree.add_update_listener(body, move |_, _| {
        let _ = started.send(());
        // give the writer time to reach the gate
        thread::sleep(Duration::from_millis(50));
        seen.store(scheduler.pending_count(), Ordering::SeqCst);
    });

    let queue = tree.update_queue();
    let writer = thread::spawn(move || {
        cascade_started.recv().unwrap();
        queue.queue_need_update(other)
    });

    tree.set_position(body, Vec3::x());
    tree.update(root, true, false);
    assert!(writer.join().unwrap());

    assert_eq!(seen_mid_cascade.load(Ordering::SeqCst), 0);
    assert!(tree.update_queue().is_queued(other));
    assert!(!tree.scheduler().is_cascading());
}
