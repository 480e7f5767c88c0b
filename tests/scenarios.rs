//! End-to-end behavior through the public API

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use taskwarden::cache::ManualClock;
use taskwarden::prelude::*;

type Cache = GenericCache<i32, String, String>;

#[derive(Debug, Default)]
struct DeniedModuleInfo {
    native_calls: AtomicU32,
    management_calls: AtomicU32,
}

impl ProcessIntrospector for DeniedModuleInfo {
    fn module_file_name(&self, _process: &ProcessIdentity) -> GovernorResult<PathBuf> {
        Err(GovernorError::permission_denied("elevated process"))
    }

    fn image_file_name(&self, process: &ProcessIdentity, _capacity: usize) -> GovernorResult<PathBuf> {
        self.native_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from(format!("/usr/sbin/{}", process.name)))
    }

    fn management_query(
        &self,
        _process: &ProcessIdentity,
        _timeout: Duration,
    ) -> GovernorResult<PathBuf> {
        self.management_calls.fetch_add(1, Ordering::SeqCst);
        Err(GovernorError::NotFound)
    }
}

#[test]
fn least_recent_prune_drops_oldest_entry() {
    let clock = Arc::new(ManualClock::new());
    let cache = Cache::builder()
        .max_items(2)
        .min_items(1)
        .eviction_policy(EvictionPolicy::LeastRecent)
        .clock(clock.clone())
        .manual_pruning()
        .build()
        .unwrap();

    for (pid, name) in [(1, "a"), (2, "b"), (3, "c")] {
        cache.add(pid, name.to_string(), format!("/bin/{}", name));
        clock.advance(Duration::from_millis(10));
    }
    cache.prune();

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&1, None).is_none());
    assert!(cache.get(&2, None).is_some());
    assert!(cache.get(&3, None).is_some());
}

#[test]
fn stale_secondary_key_purges_entry() {
    let cache = Cache::builder().manual_pruning().build().unwrap();
    cache.add(5, "foo".to_string(), "/bin/a".to_string());

    assert_eq!(cache.get(&5, Some(&"bar".to_string())), None);
    assert_eq!(cache.get(&5, None), None);
}

#[test]
fn limit_clears_lowest_target_bits() {
    let affinity = AffinityContext::with_logical_processors(4).unwrap();
    let source = affinity.mask_from_bits(0b0011).unwrap();
    let target = affinity.mask_from_bits(0b1111).unwrap();

    let result = AffinityStrategy::Limit.apply(&source, &target).unwrap();
    assert_eq!(result.as_u64(), Some(0b1100));
    assert_eq!(target.as_u64(), Some(0b1111));
}

#[test]
fn denied_module_info_falls_back_to_native_buffer() {
    let introspector = Arc::new(DeniedModuleInfo::default());
    let mut config = GovernorConfig::default();
    config.resolver.management_query = true;
    let governor = GovernorContext::builder()
        .config(config)
        .introspector(introspector.clone())
        .manual_pruning()
        .build()
        .unwrap();

    let mut record = ProcessRecord::new(880, "svchost");
    let path = governor.observe(&mut record).unwrap();

    assert_eq!(path, Some(PathBuf::from("/usr/sbin/svchost")));
    let stats = governor.statistics().resolver;
    assert_eq!(stats.module_info.failures, 1);
    assert_eq!(stats.native_buffer.successes, 1);
    assert_eq!(stats.management.attempts, 0);
    assert_eq!(introspector.management_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn finished_record_is_handled_with_timer_stopped() {
    let governor = GovernorContext::builder()
        .introspector(Arc::new(DeniedModuleInfo::default()))
        .manual_pruning()
        .build()
        .unwrap();

    let mut record = ProcessRecord::new(17, "game");
    record.timer_mut().start(Duration::from_secs(5));
    governor.transition(&mut record, ProcessHandlingState::Finished);

    assert!(record.is_handled());
    assert!(!record.timer().is_running());
    assert!(!record.has_exited());
}

#[test]
fn reused_pid_is_not_served_from_cache() {
    let introspector = Arc::new(DeniedModuleInfo::default());
    let governor = GovernorContext::builder()
        .introspector(introspector.clone())
        .manual_pruning()
        .build()
        .unwrap();

    let mut first = ProcessRecord::new(300, "old");
    governor.observe(&mut first).unwrap();
    governor.process_exited(&mut first);

    let mut second = ProcessRecord::new(300, "new");
    let path = governor.observe(&mut second).unwrap();
    assert_eq!(path, Some(PathBuf::from("/usr/sbin/new")));
    assert_eq!(introspector.native_calls.load(Ordering::SeqCst), 2);
}
