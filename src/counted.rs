use core::mem;
use std::sync::atomic::{fence, AtomicU32, Ordering};

use crossbeam_utils::CachePadded;
use static_assertions::const_assert;

// Two bare atomic words; the cache-line padding is added at the allocation.
const_assert!(mem::size_of::<Counts>() == 2 * mem::size_of::<u32>());

/// An atomic counter whose conditional increment fails at zero instead of
/// reviving the count.
///
/// Useful for reference counting, where the managed memory is destroyed
/// when the counter hits zero, so a racing upgrade must not be able to
/// raise the counter back up from zero.
pub(crate) struct Counter {
    x: AtomicU32,
}

impl Counter {
    #[inline(always)]
    pub(crate) fn one() -> Self {
        Self {
            x: AtomicU32::new(1),
        }
    }

    /// Increments the counter. The caller must already hold a reference
    /// tracked by this counter, so the count is known to be nonzero.
    #[inline(always)]
    pub(crate) fn increment(&self) {
        let prev = self.x.fetch_add(1, Ordering::Relaxed);
        debug_assert!(prev != 0);
    }

    /// Increments the counter only if it is nonzero.
    ///
    /// The check and the increment are a single atomic step. A plain
    /// load-branch-add sequence would race with a concurrent last
    /// decrement and resurrect a count that already reached zero.
    #[inline]
    pub(crate) fn try_increment(&self) -> bool {
        let mut cur = self.x.load(Ordering::Relaxed);
        loop {
            if cur == 0 {
                return false;
            }
            match self
                .x
                .compare_exchange_weak(cur, cur + 1, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => return true,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Decrements the counter. Returns true iff it was decremented to zero.
    ///
    /// The counter must be nonzero when this is called.
    #[inline(always)]
    pub(crate) fn decrement(&self) -> bool {
        let prev = self.x.fetch_sub(1, Ordering::Release);
        debug_assert!(prev != 0);
        prev == 1
    }

    #[inline(always)]
    pub(crate) fn load(&self) -> u32 {
        self.x.load(Ordering::Acquire)
    }
}

/// Shared control data for one managed object.
///
/// `strong` counts the live [`Shared`] handles. `weak` counts the live
/// [`Weak`] handles plus one reference held collectively by the strong
/// handles, released when `strong` hits zero. Splitting the block's
/// lifetime this way makes the decrement that takes `weak` to zero unique,
/// so the block is freed exactly once even when the last strong and the
/// last weak release race on different threads.
///
/// [`Shared`]: crate::Shared
/// [`Weak`]: crate::Weak
pub(crate) struct Counts {
    strong: Counter,
    weak: Counter,
}

impl Counts {
    /// Allocates the control block for a freshly constructed [`Shared`].
    ///
    /// [`Shared`]: crate::Shared
    pub(crate) fn alloc() -> *mut CachePadded<Counts> {
        Box::into_raw(Box::new(CachePadded::new(Counts {
            strong: Counter::one(),
            weak: Counter::one(),
        })))
    }

    /// Frees a control block.
    ///
    /// # Safety
    ///
    /// `cnt` must originate from [`Counts::alloc`], the corresponding weak
    /// count must have been observed hitting zero, and `cnt` must not be
    /// used afterwards.
    pub(crate) unsafe fn free(cnt: *mut CachePadded<Counts>) {
        drop(Box::from_raw(cnt));
    }

    #[inline(always)]
    pub(crate) fn add_strong(&self) {
        self.strong.increment();
    }

    /// Attempts to acquire a strong reference on behalf of an upgrading
    /// observer. Fails if the object is already dead.
    #[inline(always)]
    pub(crate) fn try_add_strong(&self) -> bool {
        self.strong.try_increment()
    }

    /// Releases a strong reference. Returns true iff it was the last one,
    /// in which case the caller must destroy the managed object and then
    /// release the strong side's collective weak reference.
    ///
    /// A decrement-release plus an acquire fence on the zero path is the
    /// protocol recommended by Boost's atomic usage examples; the acquire
    /// is only relevant when the decrement zeroes the counter.
    #[inline(always)]
    pub(crate) fn release_strong(&self) -> bool {
        if self.strong.decrement() {
            fence(Ordering::Acquire);
            return true;
        }
        false
    }

    #[inline(always)]
    pub(crate) fn add_weak(&self) {
        self.weak.increment();
    }

    /// Releases a weak reference. Returns true iff the block is now
    /// unreferenced and the caller must free it.
    #[inline(always)]
    pub(crate) fn release_weak(&self) -> bool {
        if self.weak.decrement() {
            fence(Ordering::Acquire);
            return true;
        }
        false
    }

    #[inline(always)]
    pub(crate) fn use_count(&self) -> u32 {
        self.strong.load()
    }
}
