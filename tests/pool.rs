mod tests {
    use embassy_time::{Duration, Instant};
    use pulsefield::events::EventPool;

    #[test]
    fn test_spawn_fills_free_slots() {
        let mut pool: EventPool<u8, 3> = EventPool::new();
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.active_count(), 0);

        pool.spawn(1, Instant::from_millis(0));
        pool.spawn(2, Instant::from_millis(10));
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_full_pool_evicts_oldest() {
        let mut pool: EventPool<u8, 3> = EventPool::new();
        pool.spawn(1, Instant::from_millis(0));
        pool.spawn(2, Instant::from_millis(10));
        pool.spawn(3, Instant::from_millis(20));
        assert_eq!(pool.active_count(), 3);

        pool.spawn(4, Instant::from_millis(30));
        assert_eq!(pool.active_count(), 3);

        let payloads: Vec<u8> = pool.iter_active().map(|(p, _)| *p).collect();
        assert!(!payloads.contains(&1));
        assert!(payloads.contains(&2));
        assert!(payloads.contains(&4));
    }

    #[test]
    fn test_retire_expired_frees_slots() {
        let mut pool: EventPool<u8, 3> = EventPool::new();
        let lifetime = Duration::from_millis(100);
        pool.spawn(1, Instant::from_millis(0));
        pool.spawn(2, Instant::from_millis(60));

        pool.retire_expired(Instant::from_millis(90), lifetime);
        assert_eq!(pool.active_count(), 2);

        // Exactly at its lifetime, the first event dies
        pool.retire_expired(Instant::from_millis(100), lifetime);
        assert_eq!(pool.active_count(), 1);
        let survivors: Vec<u8> = pool.iter_active().map(|(p, _)| *p).collect();
        assert_eq!(survivors, [2]);

        pool.retire_expired(Instant::from_millis(500), lifetime);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_retired_slot_is_reusable() {
        let mut pool: EventPool<u8, 2> = EventPool::new();
        let lifetime = Duration::from_millis(100);
        pool.spawn(1, Instant::from_millis(0));
        pool.spawn(2, Instant::from_millis(0));
        pool.retire_expired(Instant::from_millis(200), lifetime);

        pool.spawn(3, Instant::from_millis(200));
        assert_eq!(pool.active_count(), 1);
    }
}
