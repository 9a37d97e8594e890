use std::fmt;
use std::mem;
use std::ptr;

use crossbeam_utils::CachePadded;
use static_assertions::assert_eq_size;

use crate::counted::Counts;
use crate::weaks::Weak;

/// A strong reference-counted pointer to a heap-allocated object.
///
/// Every clone shares one control block; the object is destroyed when the
/// last strong handle releases it, regardless of surviving [`Weak`]
/// observers. The counts are synchronized, the pointee is not: concurrent
/// mutation of the object through sibling handles is the caller's problem.
pub struct Shared<T> {
    pub(crate) ptr: *mut T,
    pub(crate) cnt: *mut CachePadded<Counts>,
}

unsafe impl<T: Send + Sync> Send for Shared<T> {}
unsafe impl<T: Send + Sync> Sync for Shared<T> {}

// A handle is two plain words; all shared state lives behind `cnt`.
assert_eq_size!(Shared<u8>, [usize; 2]);

impl<T> Shared<T> {
    /// Moves `value` to the heap and allocates a fresh control block
    /// owning it.
    pub fn new(value: T) -> Self {
        Self {
            ptr: Box::into_raw(Box::new(value)),
            cnt: Counts::alloc(),
        }
    }

    /// An empty handle: no managed object, no control block.
    pub fn null() -> Self {
        Self {
            ptr: ptr::null_mut(),
            cnt: ptr::null_mut(),
        }
    }

    /// Takes ownership of a raw allocation, allocating a fresh control
    /// block for it. A null `raw` is legal and produces a handle that
    /// holds no object but still owns a (trivial) control block, so its
    /// [`use_count`] is 1.
    ///
    /// # Safety
    ///
    /// `raw` must be null or originate from [`Box::into_raw`], and must
    /// not be managed by any other handle. Adopting one pointer into two
    /// independently constructed handles double-frees it.
    ///
    /// [`use_count`]: Shared::use_count
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        Self {
            ptr: raw,
            cnt: Counts::alloc(),
        }
    }

    /// Creates a weak observer of this handle's object.
    pub fn downgrade(&self) -> Weak<T> {
        Weak::from_strong(self)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// The raw object pointer, null for an empty handle. No side effects.
    #[inline]
    pub fn get(&self) -> *mut T {
        self.ptr
    }

    /// The number of live strong handles sharing this control block, or 0
    /// for a handle that has none.
    #[inline]
    pub fn use_count(&self) -> u32 {
        match unsafe { self.cnt.as_ref() } {
            Some(counts) => counts.use_count(),
            None => 0,
        }
    }

    /// Unchecked access to the managed object.
    ///
    /// # Safety
    ///
    /// The handle must not be empty.
    #[inline]
    pub unsafe fn deref(&self) -> &T {
        &*self.ptr
    }

    /// Unchecked mutable access to the managed object.
    ///
    /// # Safety
    ///
    /// The handle must not be empty, and no sibling handle may access the
    /// object for the lifetime of the returned borrow.
    #[inline]
    pub unsafe fn deref_mut(&mut self) -> &mut T {
        &mut *self.ptr
    }

    /// Checked access to the managed object.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        unsafe { self.ptr.as_ref() }
    }

    /// Exchanges object and control block with `other`. No count traffic.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cnt, &mut other.cnt);
    }

    /// Releases current ownership, leaving the handle fully empty.
    pub fn reset(&mut self) {
        self.release();
    }

    /// Releases current ownership and adopts `raw` as a freshly managed
    /// object, as in [`Shared::from_raw`]. With a null `raw` the handle
    /// ends up fully empty, without a control block. Adopting the pointer
    /// already held is a no-op.
    ///
    /// # Safety
    ///
    /// Same contract as [`Shared::from_raw`].
    pub unsafe fn reset_raw(&mut self, raw: *mut T) {
        if raw == self.ptr {
            return;
        }
        self.release();
        if !raw.is_null() {
            *self = Self::from_raw(raw);
        }
    }

    /// The release protocol: drop this handle's strong reference, destroy
    /// the object on the last one, then hand the strong side's collective
    /// weak reference back so the block is freed once no observer remains.
    fn release(&mut self) {
        let (ptr, cnt) = (self.ptr, self.cnt);
        self.ptr = ptr::null_mut();
        self.cnt = ptr::null_mut();
        let counts = match unsafe { cnt.as_ref() } {
            Some(counts) => counts,
            None => return,
        };
        if counts.release_strong() {
            if !ptr.is_null() {
                drop(unsafe { Box::from_raw(ptr) });
            }
            if counts.release_weak() {
                unsafe { Counts::free(cnt) };
            }
        }
    }
}

impl<T> Clone for Shared<T> {
    /// Copies the handle, incrementing the strong count on its block.
    fn clone(&self) -> Self {
        if let Some(counts) = unsafe { self.cnt.as_ref() } {
            counts.add_strong();
        }
        Self {
            ptr: self.ptr,
            cnt: self.cnt,
        }
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> PartialEq for Shared<T> {
    /// Same-object identity, not pointee equality.
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ref() {
            Some(value) => f.debug_tuple("Shared").field(value).finish(),
            None => f.write_str("Shared(null)"),
        }
    }
}

impl<T> fmt::Pointer for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.ptr, f)
    }
}
