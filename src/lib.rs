#![cfg(target_arch = "wasm32")]
//! Browser front-end for the contact-section scene: DOM container,
//! `requestAnimationFrame` scheduling and a WebGPU renderer around
//! `scene_core::Viewport`.

use scene_core::{InstantClock, SceneConfig, Viewport};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

mod constants;
mod dom;
mod frame;
mod render;
mod surface;

use dom::WebContainer;
use frame::RafScheduler;
use render::WgpuBackend;

pub type WebViewport = Viewport<WebContainer, WgpuBackend, RafScheduler>;

thread_local! {
    // Scene mounted by `start` into the page's default container.
    static AUTO_MOUNTED: RefCell<Option<WebViewport>> = const { RefCell::new(None) };
    // Settles once the start-up mount has finished, whether or not it succeeded.
    static AUTO_MOUNT_DONE: RefCell<Option<js_sys::Promise>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("scene-web starting");

    let done = future_to_promise(async move {
        if let Err(e) = auto_mount().await {
            log::error!("[viewport] auto mount failed: {:?}", e);
        }
        Ok(JsValue::UNDEFINED)
    });
    AUTO_MOUNT_DONE.with(|slot| *slot.borrow_mut() = Some(done));
    Ok(())
}

async fn auto_mount() -> anyhow::Result<()> {
    if dom::window_document()
        .and_then(|d| d.get_element_by_id(constants::CONTAINER_ID))
        .is_none()
    {
        log::info!("[viewport] no #{} on this page", constants::CONTAINER_ID);
        return Ok(());
    }
    let viewport = mount_into(constants::CONTAINER_ID, SceneConfig::default()).await?;
    AUTO_MOUNTED.with(|slot| {
        // Replacing drops (and so unmounts) any earlier scene.
        slot.borrow_mut().replace(viewport);
    });
    Ok(())
}

async fn mount_into(container_id: &str, config: SceneConfig) -> anyhow::Result<WebViewport> {
    let container = WebContainer::find(container_id)?;
    let viewport = Viewport::mount(
        container,
        &WgpuBackend,
        RafScheduler::default(),
        Box::new(InstantClock::new()),
        config,
    )
    .await?;
    viewport.on_tick_error(|err| log::error!("[viewport] scene stopped: {err}"));
    Ok(viewport)
}

/// Handle to a scene mounted from JavaScript.
#[wasm_bindgen]
pub struct ContactScene {
    viewport: Option<WebViewport>,
    last_error: Option<String>,
}

#[wasm_bindgen]
impl ContactScene {
    /// Mount into the element with id `container_id`. Omitted tuning values
    /// keep their defaults.
    pub async fn mount(
        container_id: String,
        yaw_sensitivity: Option<f32>,
        pitch_sensitivity: Option<f32>,
        smoothing: Option<f32>,
    ) -> Result<ContactScene, JsValue> {
        let defaults = SceneConfig::default();
        let config = defaults
            .clone()
            .with_sensitivity(
                yaw_sensitivity.unwrap_or(defaults.yaw_sensitivity),
                pitch_sensitivity.unwrap_or(defaults.pitch_sensitivity),
            )
            .with_smoothing(smoothing.unwrap_or(defaults.smoothing));
        // Take the default container over from the start-up mount, once that
        // mount has settled; its surface would otherwise occupy the container.
        if container_id == constants::CONTAINER_ID {
            if let Some(done) = AUTO_MOUNT_DONE.with(|slot| slot.borrow().clone()) {
                _ = JsFuture::from(done).await;
            }
            let previous = AUTO_MOUNTED.with(|slot| slot.borrow_mut().take());
            drop(previous);
        }
        let viewport = mount_into(&container_id, config)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        Ok(ContactScene {
            viewport: Some(viewport),
            last_error: None,
        })
    }

    pub fn unmount(&mut self) {
        if let Some(mut viewport) = self.viewport.take() {
            if let Some(err) = viewport.take_tick_error() {
                self.last_error = Some(err.to_string());
            }
            viewport.unmount();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.viewport
            .as_ref()
            .is_some_and(|v| v.loop_state() == scene_core::LoopState::Running)
    }

    /// Message of the error that stopped the render loop, if any.
    #[wasm_bindgen(getter, js_name = lastError)]
    pub fn last_error(&mut self) -> Option<String> {
        if let Some(err) = self.viewport.as_ref().and_then(|v| v.take_tick_error()) {
            self.last_error = Some(err.to_string());
        }
        self.last_error.clone()
    }
}
