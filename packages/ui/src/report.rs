//! The shared error reporter.

use std::fmt::{Debug, Display};

use dioxus::prelude::*;
use portal::ErrorReport;

use crate::toast::Toasts;

/// Log `err` and, when `notify` is set, show it as an error toast.
///
/// Debug builds log the full `Debug` form; release builds log the classified
/// message only. The toast always shows the classified message.
pub fn report_error<E>(context: &str, err: &E, notify: bool) -> ErrorReport
where
    E: Display + Debug + ?Sized,
{
    let report = ErrorReport::classify(&err);
    if cfg!(debug_assertions) {
        tracing::error!("{context}: {err:?}");
    } else {
        tracing::error!("{}", report.with_context(context));
    }
    if notify {
        match try_consume_context::<Toasts>() {
            Some(toasts) => toasts.error(report.with_context(context)),
            None => tracing::debug!("no toaster mounted, error not shown"),
        }
    }
    report
}

/// Unwrap a widget fetch, reporting the failure and falling back to the default.
pub fn or_default<T: Default, E: Display + Debug>(context: &str, result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            report_error(context, &e, false);
            T::default()
        }
    }
}
