//! Defaulting for optional spec fields
//!
//! Spec fields that take part in defaulting are `Option<T>`. A field counts as
//! unset when it is `None` *or* holds the zero value of its type (`0`, `""`),
//! matching how a blank field in a manifest is treated by the API server.

/// Types with a zero value that means "not specified"
pub trait Unset {
    /// Whether this value should be replaced by a fallback
    fn is_unset(&self) -> bool;
}

impl Unset for i32 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl Unset for u32 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl Unset for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for &str {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// Return `value` when it is set, otherwise `fallback`
pub fn resolve<T: Unset>(value: Option<T>, fallback: T) -> T {
    present(value).unwrap_or(fallback)
}

/// Drop zero values so only meaningful settings remain
pub fn present<T: Unset>(value: Option<T>) -> Option<T> {
    value.filter(|v| !v.is_unset())
}
