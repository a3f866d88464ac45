use std::sync::atomic::{AtomicU64, Ordering};

type HandleTypeNative = [u8; 16]; // Originally in the DDS idl i32
const HANDLE_NIL_NATIVE: HandleTypeNative = [0; 16];

/// Local identifier of an entity or of a remote instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct InstanceHandle(HandleTypeNative);

impl InstanceHandle {
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generates a handle which is unique within the process.
    pub(crate) fn generate() -> Self {
        static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);
        let value = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        let mut bytes = HANDLE_NIL_NATIVE;
        bytes[8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl Default for InstanceHandle {
    fn default() -> Self {
        HANDLE_NIL
    }
}

impl From<[u8; 16]> for InstanceHandle {
    fn from(x: [u8; 16]) -> Self {
        Self(x)
    }
}

impl From<InstanceHandle> for [u8; 16] {
    fn from(this: InstanceHandle) -> Self {
        this.0
    }
}

pub const HANDLE_NIL: InstanceHandle = InstanceHandle(HANDLE_NIL_NATIVE);
