use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use crate::Bitmap;

/// A free-list of reusable [`Bitmap`] buffers.
///
/// Block scanning acquires one scratch bitmap per block and releases it when
/// the block is done. [`acquire`](BitmapPool::acquire) hands out a
/// [`PooledBitmap`] guard whose `Drop` returns the buffer, so the bitmap goes
/// back to the pool on every exit path — normal completion, short-circuit,
/// or panic unwind.
#[derive(Debug, Default)]
pub struct BitmapPool {
    free: Mutex<Vec<Bitmap>>,
}

impl BitmapPool {
    pub const fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Returns a process-wide shared pool.
    pub fn global() -> &'static BitmapPool {
        static POOL: BitmapPool = BitmapPool::new();
        &POOL
    }

    /// Takes a bitmap from the pool (or allocates one) sized to `bits_len`
    /// with all bits unset.
    pub fn acquire(&self, bits_len: usize) -> PooledBitmap<'_> {
        let mut bm = self
            .free
            .lock()
            .expect("bitmap pool poisoned")
            .pop()
            .unwrap_or_default();
        bm.init(bits_len);
        PooledBitmap {
            pool: self,
            bm: Some(bm),
        }
    }

    fn release(&self, mut bm: Bitmap) {
        bm.reset();
        // A poisoned lock here means a panic elsewhere; dropping the buffer
        // instead of pushing it keeps release infallible.
        if let Ok(mut free) = self.free.lock() {
            free.push(bm);
        }
    }

    #[cfg(test)]
    pub(crate) fn idle_len(&self) -> usize {
        self.free.lock().expect("bitmap pool poisoned").len()
    }
}

/// Scoped handle to a pooled [`Bitmap`]; derefs to the bitmap and returns it
/// to its pool when dropped.
#[derive(Debug)]
pub struct PooledBitmap<'a> {
    pool: &'a BitmapPool,
    bm: Option<Bitmap>,
}

impl Deref for PooledBitmap<'_> {
    type Target = Bitmap;

    fn deref(&self) -> &Bitmap {
        self.bm.as_ref().expect("bitmap already released")
    }
}

impl DerefMut for PooledBitmap<'_> {
    fn deref_mut(&mut self) -> &mut Bitmap {
        self.bm.as_mut().expect("bitmap already released")
    }
}

impl Drop for PooledBitmap<'_> {
    fn drop(&mut self) {
        if let Some(bm) = self.bm.take() {
            self.pool.release(bm);
        }
    }
}
