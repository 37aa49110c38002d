//! # Identity Concurrency
//!
//! Contention on the identity lock through the dispatcher.
//!
//! ## Properties Covered
//!
//! - Concurrent `SetSystemPool` calls: the writes are ordered by the
//!   identity lock, the final name is the last writer's, and no reader ever
//!   observes a partial or out-of-order name
//! - Unlocks are serialized by the identity lock

#[cfg(test)]
mod tests {
    use super::super::*;
    use kb_01_system_identity::IdentityChange;
    use shared_storage::MemoryDataset;
    use shared_types::{fields, CommandTag, Token};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    const ALPHA: &str = "alpha-pool-with-a-rather-long-name";
    const BRAVO: &str = "bravo";

    #[test]
    fn test_concurrent_set_system_pool_has_single_winner() {
        for _ in 0..50 {
            let h = Arc::new(Harness::new());
            h.memory.storage.add_pool(ALPHA);
            h.memory.storage.add_pool(BRAVO);

            let stop = Arc::new(AtomicBool::new(false));
            let reader = {
                let h = h.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    let mut seen: Vec<String> = Vec::new();
                    while !stop.load(Ordering::Relaxed) {
                        if let Some(pool) = h.container.identity.snapshot().pool {
                            assert!(pool == ALPHA || pool == BRAVO, "torn pool name {pool:?}");
                            if seen.last() != Some(&pool) {
                                seen.push(pool);
                            }
                        }
                    }
                    seen
                })
            };

            let barrier = Arc::new(Barrier::new(2));
            let writers: Vec<_> = [ALPHA, BRAVO]
                .into_iter()
                .map(|pool| {
                    let h = h.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        let change = h.container.identity_api().set_system_pool(pool).unwrap();
                        (pool, change)
                    })
                })
                .collect();
            let changes: Vec<_> = writers.into_iter().map(|w| w.join().unwrap()).collect();
            stop.store(true, Ordering::Relaxed);
            let seen = reader.join().unwrap();

            // The writer that replaced nothing went first under the identity
            // lock; the other replaced its value and holds the final state.
            let first = changes
                .iter()
                .find(|(_, c)| *c == IdentityChange::Replaced { previous: None })
                .map(|(pool, _)| *pool)
                .expect("one writer replaced nothing");
            let (last, last_change) = changes
                .iter()
                .find(|(pool, _)| *pool != first)
                .cloned()
                .unwrap();
            assert_eq!(
                last_change,
                IdentityChange::Replaced {
                    previous: Some(first.to_string())
                }
            );
            assert_eq!(h.container.identity.snapshot().pool.as_deref(), Some(last));

            // Readers never see the first value come back after the last one.
            if let Some(pos) = seen.iter().position(|p| p == last) {
                assert!(seen[pos..].iter().all(|p| p == last), "order violated: {seen:?}");
            }
        }
    }

    #[test]
    fn test_set_system_pool_through_dispatcher_is_last_writer_wins() {
        let h = Harness::new();
        h.memory.storage.add_pool(ALPHA);
        h.memory.storage.add_pool(BRAVO);

        for pool in [ALPHA, BRAVO, ALPHA] {
            expect_success(h.send(request(CommandTag::SetSystemPool).with(fields::POOL, pool)));
            assert_eq!(h.container.identity.snapshot().pool.as_deref(), Some(pool));
        }
    }

    #[test]
    fn test_unlocks_are_serialized() {
        let h = Arc::new(Harness::new());
        h.memory.tokens.insert(Token::new(guid(1)));
        h.memory.vault.set_unlock_delay(Some(Duration::from_millis(20)));
        let datasets: Vec<String> = (0..4).map(|i| format!("zones/ds{i}")).collect();
        for name in &datasets {
            h.memory.storage.add_dataset(name.clone(), MemoryDataset::locked());
            h.memory.vault.seal(name, &guid(1), b"key");
        }

        let barrier = Arc::new(Barrier::new(datasets.len()));
        let handles: Vec<_> = datasets
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, name)| {
                let h = h.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    h.send_as(100 + i as i32, request(CommandTag::UnlockDataset).with(fields::DATASET, name))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_success());
        }
        assert_eq!(h.memory.vault.unlocks(), datasets.len());
        assert_eq!(h.memory.vault.peak_concurrent_unlocks(), 1);
        assert_eq!(h.memory.storage.load_calls(), datasets.len());
    }

    #[test]
    fn test_failed_token_lookup_releases_identity_lock() {
        let h = Harness::new();
        h.memory.tokens.set_outage(Some("pcscd not running".into()));

        let reply = expect_error(
            h.send(request(CommandTag::SetSystemToken).with(fields::GUID, guid(1).as_bytes().as_slice())),
            shared_types::ErrorKind::TokenError,
        );
        assert!(reply.to_string().contains("pcscd not running"));
        assert!(h.container.identity.try_lock().is_some());

        h.designate_system_pool();
        assert_eq!(h.container.identity.snapshot().token, None);
    }
}
