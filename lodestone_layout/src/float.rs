// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float helpers that work in both std and libm builds.

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("lodestone_layout requires either the `std` or `libm` feature");

#[cfg(feature = "std")]
#[inline]
pub(crate) fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
#[inline]
pub(crate) fn sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

/// `f64::abs` lives in std; this stays core-only.
#[inline]
pub(crate) fn abs(x: f64) -> f64 {
    if x < 0.0 { -x } else { x }
}
