use crate::constants::*;
use crate::dom;
use crate::style;
use tunnel_core::{depth_readout, Section, SectionVisual};
use wasm_bindgen::JsCast;
use web_sys as web;

struct SectionEl {
    el: web::HtmlElement,
    depth: f32,
}

/// The DOM half of the tunnel: container, sections and the depth counter.
pub struct TunnelScene {
    container: web::HtmlElement,
    sections: Vec<SectionEl>,
    readout: Option<web::HtmlElement>,
    last_readout: String,
}

impl TunnelScene {
    /// `None` when the page has no tunnel container.
    pub fn from_document(document: &web::Document) -> Option<Self> {
        let container = dom::html_element_by_id(document, TUNNEL_CONTAINER_ID)?;
        let mut sections = Vec::new();
        if let Ok(list) = document.query_selector_all(SECTION_SELECTOR) {
            for i in 0..list.length() {
                let Some(el) = list.item(i).and_then(|n| n.dyn_into::<web::HtmlElement>().ok()) else {
                    continue;
                };
                let raw = el.style().get_property_value(SECTION_DEPTH_VAR).unwrap_or_default();
                let depth = style::parse_depth(&raw).unwrap_or_else(|| {
                    log::warn!("[scene] section {i} has unreadable {SECTION_DEPTH_VAR} '{raw}'");
                    0.0
                });
                sections.push(SectionEl { el, depth });
            }
        }
        log::info!("[scene] {} tunnel sections", sections.len());
        Some(Self {
            container,
            sections,
            readout: dom::html_element_by_id(document, DEPTH_READOUT_ID),
            last_readout: String::new(),
        })
    }

    pub fn sections(&self) -> Vec<Section> {
        self.sections.iter().map(|s| Section { depth: s.depth }).collect()
    }

    pub fn apply(&mut self, depth: f32, visuals: &[SectionVisual]) {
        if let Some(readout) = &self.readout {
            let text = depth_readout(depth);
            if text != self.last_readout {
                readout.set_inner_text(&text);
                self.last_readout = text;
            }
        }
        _ = self
            .container
            .style()
            .set_property("transform", &style::container_transform(depth));

        for (sec, v) in self.sections.iter().zip(visuals) {
            let css = sec.el.style();
            _ = css.set_property("opacity", &v.opacity.to_string());
            // Faint sections keep whatever transform they last had.
            if v.opacity > tunnel_core::constants::JITTER_MIN_OPACITY {
                _ = css.set_property(
                    "transform",
                    &style::section_transform(v.offset.x, v.offset.y, sec.depth),
                );
            }
        }
    }
}
