#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Great-circle arcs on a sphere, split into the part facing the viewer and
//! the part behind the sphere, assembled into a quadrilaterized spherical cube
//! diagram and written as SVG.

pub mod geom;
pub mod parse;
pub mod render;
pub mod scene;

use std::fmt;

use render::SvgOptions;
use scene::{Scene, SceneConfig};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no panic hook without the feature
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second initialize() finds the logger already set.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start the rayon thread pool: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Browser-facing handle: holds a scene configuration and the last built scene.
#[wasm_bindgen]
pub struct SketchEngine {
    initialized: bool,
    config: SceneConfig,
    scene: Option<Scene>,
    svg_options: SvgOptions,
}

impl Default for SketchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SketchEngine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> SketchEngine {
        SketchEngine {
            initialized: true,
            config: SceneConfig::default(),
            scene: None,
            svg_options: SvgOptions::default(),
        }
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Replace the configuration with a parsed `<scene>` document.
    #[wasm_bindgen]
    pub fn load_scene_xml(&mut self, xml: &str) -> Result<(), JsValue> {
        let config = parse::parse_str(xml).map_err(to_js_error)?;
        debug_log!("scene loaded with {} extra arcs", config.arcs.len());
        self.config = config;
        self.scene = None;
        Ok(())
    }

    /// Move the camera. The scene is rebuilt on the next render.
    #[wasm_bindgen]
    pub fn set_camera(&mut self, elevation: f64, azimuth: f64) -> Result<(), JsValue> {
        let mut config = self.config.clone();
        config.elevation = elevation;
        config.azimuth = azimuth;
        config.view().map_err(to_js_error)?;
        self.config = config;
        self.scene = None;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn render_svg(&mut self) -> Result<String, JsValue> {
        let options = self.svg_options.clone();
        let scene = self.scene_mut()?;
        render::render_svg(scene, &options).map_err(to_js_error)
    }

    /// Drawing commands of the current scene, in scene coordinates.
    #[wasm_bindgen]
    pub fn get_geometry(&mut self) -> Result<JsValue, JsValue> {
        let scene = self.scene_mut()?;
        serde_wasm_bindgen::to_value(&scene.drawing).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn get_diagnostics(&mut self) -> Result<String, JsValue> {
        let scene = self.scene_mut()?;
        Ok(scene.diagnostics.to_string())
    }
}

impl SketchEngine {
    fn scene_mut(&mut self) -> Result<&mut Scene, JsValue> {
        if self.scene.is_none() {
            let scene = scene::build_scene(&self.config).map_err(to_js_error)?;
            self.scene = Some(scene);
        }
        self.scene
            .as_mut()
            .ok_or_else(|| js_error("scene could not be built"))
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
