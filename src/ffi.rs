//! Call-by-address entry point for statistical hosts (e.g. R's `.C`).

use crate::exact_test::allelic_exact_test;
use crate::types::{ContingencyTable, Method};
use std::os::raw::{c_double, c_int};

/// Written instead of a p-value when the test cannot run: the sample size
/// exceeds the log-factorial table capacity, or a count is negative.
/// Never a valid p-value.
pub const ERROR_SENTINEL: f64 = -1.0;

/// Fast-path p-value, or [`ERROR_SENTINEL`] on error.
pub fn p_value_or_sentinel(table: &ContingencyTable) -> f64 {
    allelic_exact_test(table, Method::Fast).unwrap_or(ERROR_SENTINEL)
}

/// Read six genotype counts by address and write the p-value to `pvalue`.
///
/// Negative counts produce [`ERROR_SENTINEL`].
///
/// # Safety
///
/// All seven pointers must be non-null, aligned and valid for the call.
#[no_mangle]
pub unsafe extern "C" fn allelic_exact_pvalue(
    d0: *const c_int,
    d1: *const c_int,
    d2: *const c_int,
    h0: *const c_int,
    h1: *const c_int,
    h2: *const c_int,
    pvalue: *mut c_double,
) {
    let raw = [*d0, *d1, *d2, *h0, *h1, *h2];
    let mut counts = [0u32; 6];
    for (slot, &value) in counts.iter_mut().zip(raw.iter()) {
        match u32::try_from(value) {
            Ok(v) => *slot = v,
            Err(_) => {
                tracing::warn!(count = value, "negative genotype count");
                *pvalue = ERROR_SENTINEL;
                return;
            }
        }
    }
    *pvalue = p_value_or_sentinel(&ContingencyTable::from_counts(counts));
}
