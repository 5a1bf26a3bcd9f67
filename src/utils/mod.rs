#[doc(hidden)]
pub(crate) trait DivCeil: Sized {
    fn msrv_div_ceil(self, rhs: Self) -> Self;
}

impl DivCeil for usize {
    #[inline]
    fn msrv_div_ceil(self, rhs: Self) -> Self {
        let d = self / rhs;
        let r = self % rhs;
        if r > 0 {
            d + 1
        } else {
            d
        }
    }
}

/// Returns `max(a - b, 0)`.
#[inline]
pub(crate) fn sub_clamped(a: usize, b: usize) -> usize {
    a.saturating_sub(b)
}

pub mod thread;
