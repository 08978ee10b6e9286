//! Helpers shared by the UI layer and the fetch cycle spawner.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking fetch cycle would otherwise vanish inside the runtime and
/// leave the dashboard stuck in its loading state. With this wrapper the
/// panic message comes back as `Err(String)` and can be reported as an
/// `AppEvent::TaskPanicked`.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(crate) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Center a `width` x `height` box inside `area`, clamped to fit.
pub(super) fn centered(area: ratatui::layout::Rect, width: u16, height: u16) -> ratatui::layout::Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    ratatui::layout::Rect::new(x, y, width, height)
}
