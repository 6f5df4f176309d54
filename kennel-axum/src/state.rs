use kennel_core::KennelApp;

/// Router state shared by every REST handler of one app.
pub struct KennelAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: KennelApp<R, P>,
}

impl<R, P> Clone for KennelAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
        }
    }
}

impl<R, P> KennelAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: KennelApp<R, P>) -> Self {
        Self { app }
    }
}
