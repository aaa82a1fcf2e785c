#![cfg(target_os = "windows")]

//! Owning COM pointer.
//!
//! [`ComPtr`] holds exactly one reference on a COM object: `Clone` calls
//! `AddRef`, `Drop` calls `Release`. Every DirectInput handle in this crate
//! lives inside one.

use core::ffi::c_void;
use core::ptr::NonNull;

use super::ffi::IUnknownVtbl;

/// A COM interface struct whose first field is its vtable pointer, and whose
/// vtable starts with the `IUnknown` slots.
///
/// # Safety
/// Implementors must be `#[repr(C)]` with `lpVtbl` as the first field and a
/// vtable laid out as `IUnknownVtbl` followed by the interface's own slots.
pub unsafe trait Interface {
    type Vtbl;
}

pub struct ComPtr<T: Interface> {
    ptr: NonNull<T>,
}

impl<T: Interface> ComPtr<T> {
    /// Take ownership of a reference already counted for the caller
    /// (an out-parameter from `CreateDevice`, `DirectInput8Create`, ...).
    ///
    /// # Safety
    /// `raw` must be null or a live interface pointer of type `T` whose
    /// reference the caller owns.
    pub unsafe fn from_raw(raw: *mut T) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self { ptr })
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// The interface vtable.
    #[inline]
    pub fn vtbl(&self) -> &T::Vtbl {
        // SAFETY: `Interface` guarantees the first field is the vtable pointer,
        // and a live object's vtable outlives every reference to the object.
        unsafe { &**(self.ptr.as_ptr() as *const *const T::Vtbl) }
    }

    #[inline]
    fn unknown(&self) -> &IUnknownVtbl {
        // SAFETY: every COM vtable begins with the IUnknown slots.
        unsafe { &**(self.ptr.as_ptr() as *const *const IUnknownVtbl) }
    }
}

impl<T: Interface> Clone for ComPtr<T> {
    fn clone(&self) -> Self {
        // SAFETY: `self` owns a reference, so the object is alive.
        unsafe { (self.unknown().AddRef)(self.ptr.as_ptr() as *mut c_void) };
        Self { ptr: self.ptr }
    }
}

impl<T: Interface> Drop for ComPtr<T> {
    fn drop(&mut self) {
        // SAFETY: releases the one reference this value owns.
        unsafe { (self.unknown().Release)(self.ptr.as_ptr() as *mut c_void) };
    }
}
