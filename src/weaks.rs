use std::fmt;
use std::ptr;

use crossbeam_utils::CachePadded;

use crate::counted::Counts;
use crate::strongs::Shared;

/// A non-owning observer of a [`Shared`] object.
///
/// A `Weak` never keeps the object alive and never delays its
/// destruction; it only pins the control block, through which it can tell
/// whether the object is still there and try to [`upgrade`] to a strong
/// handle.
///
/// [`upgrade`]: Weak::upgrade
pub struct Weak<T> {
    pub(crate) ptr: *mut T,
    pub(crate) cnt: *mut CachePadded<Counts>,
}

unsafe impl<T: Send + Sync> Send for Weak<T> {}
unsafe impl<T: Send + Sync> Sync for Weak<T> {}

impl<T> Weak<T> {
    /// An empty observer with no control block.
    pub fn null() -> Self {
        Self {
            ptr: ptr::null_mut(),
            cnt: ptr::null_mut(),
        }
    }

    /// Observes `shared`'s object, incrementing the weak count on its
    /// control block. Observing a handle without a block yields an empty
    /// `Weak`.
    pub fn from_strong(shared: &Shared<T>) -> Self {
        if let Some(counts) = unsafe { shared.cnt.as_ref() } {
            counts.add_weak();
        }
        Self {
            ptr: shared.ptr,
            cnt: shared.cnt,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// The number of live strong handles for the observed block, not the
    /// number of weak ones. 0 without a block.
    #[inline]
    pub fn use_count(&self) -> u32 {
        match unsafe { self.cnt.as_ref() } {
            Some(counts) => counts.use_count(),
            None => 0,
        }
    }

    /// True iff no strong handle for the observed object remains.
    #[inline]
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /// Attempts to acquire a strong handle to the observed object.
    ///
    /// The expiry check and the strong increment are one atomic step, so
    /// an object whose last strong handle is concurrently being dropped
    /// is never revived: an expired observer yields the empty handle,
    /// whose `use_count` is 0.
    pub fn upgrade(&self) -> Shared<T> {
        if let Some(counts) = unsafe { self.cnt.as_ref() } {
            if counts.try_add_strong() {
                return Shared {
                    ptr: self.ptr,
                    cnt: self.cnt,
                };
            }
        }
        Shared::null()
    }

    /// Drops the observation, freeing the block if it was the last
    /// reference of either kind. Leaves the handle empty.
    pub fn reset(&mut self) {
        let cnt = self.cnt;
        self.ptr = ptr::null_mut();
        self.cnt = ptr::null_mut();
        if let Some(counts) = unsafe { cnt.as_ref() } {
            if counts.release_weak() {
                unsafe { Counts::free(cnt) };
            }
        }
    }
}

impl<T> Clone for Weak<T> {
    /// Copies the observer, incrementing the weak count on its block.
    fn clone(&self) -> Self {
        if let Some(counts) = unsafe { self.cnt.as_ref() } {
            counts.add_weak();
        }
        Self {
            ptr: self.ptr,
            cnt: self.cnt,
        }
    }
}

impl<T> Drop for Weak<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for Weak<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> PartialEq for Weak<T> {
    /// Same-object identity, not pointee equality.
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> fmt::Debug for Weak<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(Weak)")
    }
}
