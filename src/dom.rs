use crate::constants::SURFACE_ATTR;
use crate::surface::{backing_size, Claim, SurfaceRegistry};
use scene_core::{
    AttachmentError, EventHandler, HostContainer, HostEvent, ListenerKind, ResourceError,
    ViewportBounds,
};
use std::cell::RefCell;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

thread_local! {
    // Surfaces currently owned by a mounted viewport, across all containers.
    static SURFACES: RefCell<SurfaceRegistry> =
        RefCell::new(SurfaceRegistry::new(js_sys::Date::now() as u64));
}

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Size the canvas backing store to `css_w` x `css_h` CSS pixels at the
/// current devicePixelRatio. Returns `true` when the backing size changed.
pub fn set_canvas_backing_size(canvas: &web::HtmlCanvasElement, css_w: u32, css_h: u32) -> bool {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let (w_px, h_px) = backing_size(css_w, css_h, dpr);
    if canvas.width() == w_px && canvas.height() == h_px {
        return false;
    }
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    true
}

pub fn create_canvas(css_w: u32, css_h: u32) -> Result<web::HtmlCanvasElement, ResourceError> {
    let document =
        window_document().ok_or_else(|| ResourceError::Surface("no document".into()))?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| ResourceError::Surface(format!("{:?}", e)))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| ResourceError::Surface(format!("{:?}", e)))?;
    let style = canvas.style();
    _ = style.set_property("display", "block");
    _ = style.set_property("width", "100%");
    _ = style.set_property("height", "100%");
    set_canvas_backing_size(&canvas, css_w, css_h);
    Ok(canvas)
}

/// A live DOM listener; removed and freed by `WebContainer::remove_listener`.
pub struct DomListener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

/// Host element the scene canvas lives in.
#[derive(Clone)]
pub struct WebContainer {
    element: web::HtmlElement,
}

impl WebContainer {
    pub fn find(id: &str) -> Result<Self, AttachmentError> {
        let element = window_document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
            .ok_or_else(|| AttachmentError::ContainerMissing(id.to_string()))?;
        Ok(Self { element })
    }

    fn marked_surfaces(&self) -> Vec<web::Element> {
        let selector = format!("canvas[{}]", SURFACE_ATTR);
        let Ok(list) = self.element.query_selector_all(&selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web::Element>().ok())
            .collect()
    }
}

impl HostContainer for WebContainer {
    type Surface = web::HtmlCanvasElement;
    type Subscription = DomListener;

    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    fn measure(&self) -> ViewportBounds {
        let rect = self.element.get_bounding_client_rect();
        ViewportBounds {
            left: rect.left() as f32,
            top: rect.top() as f32,
            width: rect.width() as f32,
            height: rect.height() as f32,
        }
    }

    /// Refuses a container that still holds a mounted surface; marked
    /// canvases left behind by anything else are removed first.
    fn attach_surface(&self, surface: &web::HtmlCanvasElement) -> Result<(), AttachmentError> {
        let marked = self.marked_surfaces();
        let markers: Vec<String> = marked
            .iter()
            .map(|el| el.get_attribute(SURFACE_ATTR).unwrap_or_default())
            .collect();
        let claim = SURFACES.with(|r| r.borrow_mut().claim(markers.iter().map(String::as_str)));
        let marker = match claim {
            Claim::Granted { marker } => marker,
            Claim::Occupied { marker } => {
                log::warn!("[viewport] container already holds surface {}", marker);
                return Err(AttachmentError::Occupied);
            }
        };
        for stale in &marked {
            stale.remove();
        }
        if !marked.is_empty() {
            log::info!("[viewport] removed {} stale surface(s)", marked.len());
        }
        _ = surface.set_attribute(SURFACE_ATTR, &marker);
        if let Err(e) = self.element.append_child(surface) {
            SURFACES.with(|r| r.borrow_mut().release(&marker));
            return Err(AttachmentError::Surface(format!("{:?}", e)));
        }
        Ok(())
    }

    fn detach_surface(&self, surface: &web::HtmlCanvasElement) {
        if let Some(marker) = surface.get_attribute(SURFACE_ATTR) {
            SURFACES.with(|r| r.borrow_mut().release(&marker));
        }
        let host: &web::Node = self.element.as_ref();
        if surface.parent_node().as_ref() == Some(host) {
            _ = self.element.remove_child(surface);
        }
    }

    fn add_listener(
        &self,
        kind: ListenerKind,
        mut handler: EventHandler,
    ) -> Result<DomListener, AttachmentError> {
        let target: web::EventTarget = match kind {
            ListenerKind::PointerMove => self.element.clone().into(),
            ListenerKind::WindowResize => web::window()
                .ok_or(AttachmentError::Listener(kind.event_name()))?
                .into(),
        };
        let closure = Closure::wrap(Box::new(move |ev: web::Event| match kind {
            ListenerKind::PointerMove => {
                if let Some(mouse) = ev.dyn_ref::<web::MouseEvent>() {
                    handler(HostEvent::PointerMove {
                        client_x: mouse.client_x() as f32,
                        client_y: mouse.client_y() as f32,
                    });
                }
            }
            ListenerKind::WindowResize => handler(HostEvent::Resize),
        }) as Box<dyn FnMut(_)>);
        target
            .add_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref())
            .map_err(|_| AttachmentError::Listener(kind.event_name()))?;
        Ok(DomListener {
            target,
            event: kind.event_name(),
            closure,
        })
    }

    fn remove_listener(&self, listener: DomListener) {
        _ = listener.target.remove_event_listener_with_callback(
            listener.event,
            listener.closure.as_ref().unchecked_ref(),
        );
    }
}
