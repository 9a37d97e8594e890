use std::fmt;
use std::mem;
use std::ptr;

/// A move-only pointer with sole ownership of a heap-allocated object.
///
/// There is no counting: at most one live `Unique` refers to a given
/// object, and moving transfers that ownership. The owned object is
/// destroyed when the handle is dropped or [`reset`].
///
/// [`reset`]: Unique::reset
pub struct Unique<T> {
    ptr: *mut T,
}

unsafe impl<T: Send> Send for Unique<T> {}
unsafe impl<T: Sync> Sync for Unique<T> {}

impl<T> Unique<T> {
    /// Moves `value` to the heap under sole ownership of the new handle.
    pub fn new(value: T) -> Self {
        Self {
            ptr: Box::into_raw(Box::new(value)),
        }
    }

    /// An empty handle owning nothing.
    pub fn null() -> Self {
        Self {
            ptr: ptr::null_mut(),
        }
    }

    /// Takes sole ownership of a raw allocation. Null is legal and
    /// produces an empty handle.
    ///
    /// # Safety
    ///
    /// `raw` must be null or originate from [`Box::into_raw`], and must
    /// not be owned elsewhere.
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        Self { ptr: raw }
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

    /// Unchecked access to the owned object.
    ///
    /// # Safety
    ///
    /// The handle must not be empty.
    #[inline]
    pub unsafe fn deref(&self) -> &T {
        &*self.ptr
    }

    /// Unchecked mutable access to the owned object.
    ///
    /// # Safety
    ///
    /// The handle must not be empty.
    #[inline]
    pub unsafe fn deref_mut(&mut self) -> &mut T {
        &mut *self.ptr
    }

    /// Checked access to the owned object.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        unsafe { self.ptr.as_ref() }
    }

    /// Checked mutable access to the owned object.
    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        unsafe { self.ptr.as_mut() }
    }

    /// Relinquishes ownership without destroying the object and leaves
    /// the handle empty. The caller now owns the allocation and must
    /// eventually free it, e.g. via [`Box::from_raw`].
    pub fn release(&mut self) -> *mut T {
        mem::replace(&mut self.ptr, ptr::null_mut())
    }

    /// Destroys the owned object, if any, leaving the handle empty.
    pub fn reset(&mut self) {
        let old = self.release();
        if !old.is_null() {
            drop(unsafe { Box::from_raw(old) });
        }
    }

    /// Destroys the owned object and adopts `raw` as the new sole owner.
    /// Adopting the pointer already held is a no-op.
    ///
    /// # Safety
    ///
    /// Same contract as [`Unique::from_raw`].
    pub unsafe fn reset_raw(&mut self, raw: *mut T) {
        if raw == self.ptr {
            return;
        }
        self.reset();
        self.ptr = raw;
    }

    /// Exchanges owned objects with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
    }
}

impl<T> Drop for Unique<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for Unique<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: fmt::Debug> fmt::Debug for Unique<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ref() {
            Some(value) => f.debug_tuple("Unique").field(value).finish(),
            None => f.write_str("Unique(null)"),
        }
    }
}

impl<T> fmt::Pointer for Unique<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.ptr, f)
    }
}
