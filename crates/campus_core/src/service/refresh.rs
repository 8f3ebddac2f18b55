//! Refresh dispatcher: re-render fan-out after every state mutation.
//!
//! # Invariants
//! - Every registered view is called once per pass, in registration order,
//!   but no view may depend on that order.
//! - A view whose render target is absent reports `NotMounted`; that is
//!   not an error and does not stop the pass.

use crate::service::session::Session;
use log::debug;

/// Result of one view render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// The view's target is not currently on screen.
    NotMounted,
}

/// A feature screen that re-renders from session state.
pub trait FeatureView {
    fn name(&self) -> &str;
    fn render(&mut self, session: &Session) -> RenderOutcome;
}

/// Adapts a closure into a `FeatureView`.
pub struct FnView<F> {
    name: String,
    render: F,
}

impl<F> FnView<F>
where
    F: FnMut(&Session) -> RenderOutcome,
{
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> FeatureView for FnView<F>
where
    F: FnMut(&Session) -> RenderOutcome,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&mut self, session: &Session) -> RenderOutcome {
        (self.render)(session)
    }
}

/// Counts of one refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub rendered: usize,
    pub not_mounted: usize,
}

#[derive(Default)]
pub struct RefreshDispatcher {
    views: Vec<Box<dyn FeatureView>>,
    passes: u64,
}

impl RefreshDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, view: Box<dyn FeatureView>) {
        self.views.push(view);
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Number of completed passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Renders every registered view from `session`.
    pub fn refresh(&mut self, session: &Session) -> RefreshReport {
        let mut report = RefreshReport::default();
        for view in &mut self.views {
            match view.render(session) {
                RenderOutcome::Rendered => report.rendered += 1,
                RenderOutcome::NotMounted => {
                    debug!(
                        "event=refresh_view module=refresh status=skipped view={}",
                        view.name()
                    );
                    report.not_mounted += 1;
                }
            }
        }
        self.passes += 1;
        debug!(
            "event=refresh module=refresh status=ok rendered={} not_mounted={}",
            report.rendered, report.not_mounted
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::{FnView, RefreshDispatcher, RenderOutcome};
    use crate::service::session::Session;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn empty_dispatcher_completes_a_pass() {
        let mut dispatcher = RefreshDispatcher::new();
        let report = dispatcher.refresh(&Session::new("114-1"));
        assert_eq!(report.rendered, 0);
        assert_eq!(dispatcher.passes(), 1);
    }

    #[test]
    fn unmounted_views_do_not_stop_the_pass() {
        let calls = Rc::new(Cell::new(0));
        let mut dispatcher = RefreshDispatcher::new();
        dispatcher.register(Box::new(FnView::new("calendar", |_| RenderOutcome::NotMounted)));
        let counter = Rc::clone(&calls);
        dispatcher.register(Box::new(FnView::new("grades", move |session: &Session| {
            counter.set(counter.get() + 1);
            assert_eq!(session.current_semester(), "114-1");
            RenderOutcome::Rendered
        })));

        let report = dispatcher.refresh(&Session::new("114-1"));
        assert_eq!(report.rendered, 1);
        assert_eq!(report.not_mounted, 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(dispatcher.len(), 2);
    }
}
