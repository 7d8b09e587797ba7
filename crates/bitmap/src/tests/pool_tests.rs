use crate::BitmapPool;

#[test]
fn acquire_returns_zeroed_bitmap_of_requested_length() {
    let pool = BitmapPool::new();
    let bm = pool.acquire(100);
    assert_eq!(bm.bits_len(), 100);
    assert!(bm.is_zero());
}

#[test]
fn dropped_bitmap_returns_to_pool() {
    let pool = BitmapPool::new();
    {
        let mut bm = pool.acquire(64);
        bm.set_bits();
    }
    assert_eq!(pool.idle_len(), 1);

    // Reacquired buffer carries no stale bits.
    let bm = pool.acquire(32);
    assert_eq!(pool.idle_len(), 0);
    assert!(bm.is_zero());
    assert_eq!(bm.bits_len(), 32);
}

#[test]
fn early_return_releases_the_bitmap() {
    let pool = BitmapPool::new();
    let scan = |abort: bool| -> Option<usize> {
        let mut bm = pool.acquire(16);
        bm.set_bits();
        if abort {
            return None; // guard drops here
        }
        Some(bm.count_ones())
    };
    assert_eq!(scan(true), None);
    assert_eq!(pool.idle_len(), 1);
    assert_eq!(scan(false), Some(16));
    assert_eq!(pool.idle_len(), 1);
}

#[test]
fn concurrent_acquire_release() {
    let pool = BitmapPool::global();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for len in 1..200 {
                    let mut bm = pool.acquire(len);
                    bm.set_bits();
                    assert_eq!(bm.count_ones(), len);
                }
            });
        }
    });
}
