use super::*;
use crate::scene::config::LayoutMode;

#[test]
fn snapshot_is_stable_across_later_writes() {
    let cell = SceneCell::default();
    let before = cell.load();

    cell.update(|c| c.mode = LayoutMode::Linear);

    assert_eq!(before.mode, LayoutMode::Circular);
    assert_eq!(cell.load().mode, LayoutMode::Linear);
}

#[test]
fn store_replaces_whole_config() {
    let cell = SceneCell::default();
    let next = SceneConfig {
        bar_count: 32,
        ..SceneConfig::default()
    };
    cell.store(next.clone());
    assert_eq!(*cell.load(), next);
}

#[test]
fn concurrent_updates_are_not_lost() {
    let cell = std::sync::Arc::new(SceneCell::new(SceneConfig {
        particle_count: 0,
        ..SceneConfig::default()
    }));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cell = cell.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    cell.update(|c| c.particle_count += 1);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(cell.load().particle_count, 100);
}
