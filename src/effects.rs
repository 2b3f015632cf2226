use crate::constants::*;
use tunnel_core::FrameReport;
use web_sys as web;

/// Page-level visual state driven by the frame report: invert band, glitch
/// flash, the collapse transition and the final navigation.
pub struct BodyEffects {
    body: web::HtmlElement,
    invert: bool,
    glitch: bool,
    collapsing: bool,
}

impl BodyEffects {
    pub fn new(body: web::HtmlElement) -> Self {
        Self {
            body,
            invert: false,
            glitch: false,
            collapsing: false,
        }
    }

    pub fn apply(&mut self, report: &FrameReport) {
        let classes = self.body.class_list();
        if report.invert != self.invert {
            self.invert = report.invert;
            _ = classes.toggle_with_force(INVERT_CLASS, report.invert);
        }

        if report.collapse_progress.is_some() && !self.collapsing {
            self.collapsing = true;
            self.begin_collapse();
        }

        if report.glitch != self.glitch {
            self.glitch = report.glitch;
            _ = classes.toggle_with_force(SHAKE_CLASS, report.glitch);
            // The collapse owns the filter once it has started.
            if !self.collapsing {
                let filter = if report.glitch { GLITCH_FILTER } else { "" };
                _ = self.body.style().set_property("filter", filter);
            }
        }

        if let Some(target) = &report.navigate {
            if let Some(w) = web::window() {
                log::info!("[effects] leaving for {target}");
                _ = w.location().set_href(target);
            }
        }
    }

    fn begin_collapse(&self) {
        let css = self.body.style();
        _ = css.set_property("transform-origin", COLLAPSE_ORIGIN);
        _ = css.set_property("transform", COLLAPSE_TRANSFORM);
        _ = css.set_property("filter", COLLAPSE_FILTER);
        _ = css.set_property("transition", COLLAPSE_TRANSITION);
    }
}
