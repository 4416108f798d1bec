//! Instrumentation shortcuts.

/// Wrap a block or an expression with a timer context.
/// The elapsed time is recorded once the computation has been performed,
/// the expression result (if any) is transparently returned.
///
/// ```rust
/// # #[macro_use] extern crate meterstick;
/// # fn main() {
/// let timer = meterstick::Timer::new();
/// let answer = time!(timer, 6 * 7);
/// assert_eq!(answer, 42);
/// assert_eq!(timer.count(), 1);
/// # }
/// ```
#[macro_export]
macro_rules! time {
    ($timer: expr, $body: expr) => {{
        let _context = $timer.start();
        $body
    }};
}
