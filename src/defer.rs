/// Runs `f` when the returned guard is dropped, on every exit path.
///
/// Only used to emit worker lifecycle trace events; the guard fires for
/// panicking workers too.
pub(crate) fn defer<F: FnOnce()>(f: F) -> Defer<F> {
    Defer(Some(f))
}

pub(crate) struct Defer<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> Drop for Defer<F> {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}
