//! FFI bindings for liftload
//!
//! This module provides C-compatible functions for calling the engine from
//! other languages. All functions take and return null-terminated UTF-8 JSON
//! strings; returned strings must be freed with `liftload_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::ComputeError;
use crate::ingest::parse_day;
use crate::processor::{
    records_to_daily_json, records_to_date_json, records_to_summary_json, IntensityProcessor,
};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Hand a JSON result to C, or record the error and return NULL
fn into_c_result(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute daily intensities (newest first) for a JSON array of records.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `liftload_free_string`.
/// - Returns NULL on error; call `liftload_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftload_daily_intensities(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    into_c_result(records_to_daily_json(&json_str))
}

/// Compute the training summary for a JSON array of records.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `liftload_free_string`.
/// - Returns NULL on error; call `liftload_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftload_summary(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    into_c_result(records_to_summary_json(&json_str))
}

/// Compute day-local intensity for `date` (`YYYY-MM-DD`).
///
/// The result is the JSON literal `null` when no record falls on that day.
///
/// # Safety
/// - `json` and `date` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `liftload_free_string`.
/// - Returns NULL on error; call `liftload_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftload_intensity_for_date(
    json: *const c_char,
    date: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    let Some(date_str) = cstr_to_string(date) else {
        set_last_error("Invalid date string pointer");
        return ptr::null_mut();
    };

    into_c_result(parse_day(&date_str).and_then(|day| records_to_date_json(&json_str, day)))
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an IntensityProcessor
pub struct LiftloadProcessorHandle {
    processor: IntensityProcessor,
}

/// Create a new processor with an empty snapshot.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `liftload_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn liftload_processor_new() -> *mut LiftloadProcessorHandle {
    clear_last_error();

    let handle = Box::new(LiftloadProcessorHandle {
        processor: IntensityProcessor::new(),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `liftload_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn liftload_processor_free(processor: *mut LiftloadProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Add a JSON array of records to the processor snapshot.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `liftload_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns the number of records kept, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn liftload_processor_ingest(
    processor: *mut LiftloadProcessorHandle,
    json: *const c_char,
) -> i64 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return -1;
    };

    match handle.processor.ingest_json(&json_str) {
        Ok(kept) => kept as i64,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Summarize the processor snapshot.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `liftload_processor_new`.
/// - Returns a newly allocated string that must be freed with `liftload_free_string`.
/// - Returns NULL on error; call `liftload_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftload_processor_summary(
    processor: *mut LiftloadProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    into_c_result(serde_json::to_string(&handle.processor.summary()).map_err(ComputeError::from))
}

/// Save the processor snapshot as a JSON array.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `liftload_processor_new`.
/// - Returns a newly allocated string that must be freed with `liftload_free_string`.
/// - Returns NULL on error; call `liftload_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftload_processor_save_records(
    processor: *mut LiftloadProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    into_c_result(handle.processor.save_records())
}

/// Replace the processor snapshot with a saved JSON array.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `liftload_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `liftload_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn liftload_processor_load_records(
    processor: *mut LiftloadProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return -1;
    };

    match handle.processor.load_records(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by liftload functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a liftload function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn liftload_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next liftload call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn liftload_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn liftload_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_records_json() -> CString {
        CString::new(
            r#"[
                {
                    "id": "w1",
                    "userId": "u1",
                    "date": "2024-01-01T09:00:00+00:00",
                    "name": "Bench Press",
                    "sets": [{"weight": 60, "reps": 10}, {"weight": 80, "reps": 5}]
                },
                {
                    "id": "w2",
                    "userId": "u1",
                    "date": "2024-01-03T09:00:00+00:00",
                    "sets": [{"weight": 140, "reps": 4, "workoutType": "Squat"}]
                }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_daily_intensities() {
        let json = sample_records_json();

        unsafe {
            let result = liftload_daily_intensities(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.starts_with('['));
            assert!(result_str.contains("total_intensity"));

            liftload_free_string(result);
        }
    }

    #[test]
    fn test_ffi_summary() {
        let json = sample_records_json();

        unsafe {
            let result = liftload_summary(json.as_ptr());
            assert!(!result.is_null());

            let parsed: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(parsed["workouts"], 2);
            liftload_free_string(result);
        }
    }

    #[test]
    fn test_ffi_intensity_for_date_no_data() {
        let json = sample_records_json();
        let date = CString::new("1999-12-31").unwrap();

        unsafe {
            let result = liftload_intensity_for_date(json.as_ptr(), date.as_ptr());
            assert!(!result.is_null());
            assert_eq!(CStr::from_ptr(result).to_str().unwrap(), "null");
            liftload_free_string(result);
        }
    }

    #[test]
    fn test_ffi_intensity_for_date_bad_date() {
        let json = sample_records_json();
        let date = CString::new("yesterday").unwrap();

        unsafe {
            let result = liftload_intensity_for_date(json.as_ptr(), date.as_ptr());
            assert!(result.is_null());
            assert!(!liftload_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        unsafe {
            let processor = liftload_processor_new();
            assert!(!processor.is_null());

            let json = sample_records_json();
            assert_eq!(liftload_processor_ingest(processor, json.as_ptr()), 2);

            let summary = liftload_processor_summary(processor);
            assert!(!summary.is_null());
            liftload_free_string(summary);

            let saved = liftload_processor_save_records(processor);
            assert!(!saved.is_null());

            let processor2 = liftload_processor_new();
            assert_eq!(liftload_processor_load_records(processor2, saved), 0);

            liftload_free_string(saved);
            liftload_processor_free(processor);
            liftload_processor_free(processor2);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = liftload_daily_intensities(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = liftload_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            assert_eq!(liftload_processor_ingest(ptr::null_mut(), invalid_json.as_ptr()), -1);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = liftload_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
