#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod drawing;
pub mod export;
pub mod geom;
pub mod model;
pub mod presenter;

use std::fmt;
use std::time::Duration;

use config::ConfiguratorConfig;
use drawing::{ProjectionError, ViewDrawing, ViewportSize, project_all};
use export::texture::{PRESENTER_TEXTURE_SIZE, encode_png, finish_texture};
use export::{ArtifactId, ExportError, ExportSession, GlbBackend};
use model::{ChangeEffect, ConfiguratorState, FieldChange, FormError, HANDLE_METAL, MaterialSpec, Readouts};
use presenter::{DoorPhase, InteractionState, Presenter, PresenterError, RetainedScene, SceneDiff};
use serde::Serialize;
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
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    log::set_logger(&DEFAULT_LOGGER).expect("error initializing logger");
    log::set_max_level(LevelFilter::Debug);
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateExport<'a> {
    state: &'a ConfiguratorState,
    readouts: Readouts,
    y_translation: f64,
    interaction: InteractionState,
    rendering_available: bool,
    export_available: bool,
}

#[derive(Debug, Serialize)]
struct MaterialsExport {
    body: MaterialSpec,
    handle: MaterialSpec,
}

/// Sessie-object voor de host: formulier, 3D-scène, aanzichten en AR-export.
#[wasm_bindgen]
pub struct Configurator {
    state: ConfiguratorState,
    margin: f64,
    presenter: Presenter<RetainedScene>,
    viewport: ViewportSize,
    drawings: Vec<ViewDrawing>,
    exports: ExportSession<GlbBackend>,
}

#[wasm_bindgen]
impl Configurator {
    #[wasm_bindgen(constructor)]
    pub fn new(rendering_available: bool, export_available: bool) -> Result<Configurator, JsValue> {
        Self::from_config(
            ConfiguratorConfig::default(),
            rendering_available,
            export_available,
        )
        .map_err(to_js_error)
    }

    /// Maak een configurator vanuit een (gedeeltelijk) JS-configuratieobject.
    #[wasm_bindgen]
    pub fn with_config(
        config: JsValue,
        rendering_available: bool,
        export_available: bool,
    ) -> Result<Configurator, JsValue> {
        let config: ConfiguratorConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|err| JsError::new(&err.to_string()))?;
        Self::from_config(config, rendering_available, export_available).map_err(to_js_error)
    }

    /// Verwerk een numerieke formulierwijziging; geeft het effect terug.
    #[wasm_bindgen]
    pub fn set_field_number(&mut self, field: &str, value: f64) -> Result<String, JsValue> {
        self.apply_js(&FieldChange::number(field, value))
    }

    /// Verwerk een keuzeveld (materiaal, eenheid, referentievlak).
    #[wasm_bindgen]
    pub fn set_field_text(&mut self, field: &str, value: &str) -> Result<String, JsValue> {
        self.apply_js(&FieldChange::option(field, value))
    }

    #[wasm_bindgen]
    pub fn set_field_bool(&mut self, field: &str, value: bool) -> Result<String, JsValue> {
        self.apply_js(&FieldChange::flag(field, value))
    }

    /// Huidige parameters, uitleeswaarden en interactiestatus.
    #[wasm_bindgen]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        let export = StateExport {
            state: &self.state,
            readouts: self.state.readouts(),
            y_translation: self.state.y_translation(),
            interaction: self.presenter.interaction(),
            rendering_available: self.presenter.is_available(),
            export_available: self.exports.is_available(),
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Zet de animatie een frame verder; `true` zolang er beweging is.
    #[wasm_bindgen]
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        let dt = Duration::try_from_secs_f64(dt_ms / 1000.0).unwrap_or(Duration::ZERO);
        self.advance_by(dt)
    }

    /// Open of sluit de deur; geeft terug of de deur nu naar open beweegt.
    #[wasm_bindgen]
    pub fn toggle_door(&mut self) -> Result<bool, JsValue> {
        self.toggle_door_phase()
            .map(DoorPhase::is_open_target)
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn toggle_wireframe(&mut self) -> Result<bool, JsValue> {
        self.toggle_wireframe_flag().map_err(to_js_error)
    }

    /// Haalt de scènewijzigingen sinds de vorige aanroep op in een "diff" formaat.
    #[wasm_bindgen]
    pub fn get_scene_diff(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.take_scene_diff())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Nieuwe canvasgrootte; tekent alle aanzichten opnieuw.
    #[wasm_bindgen]
    pub fn set_view_size(
        &mut self,
        pixel_width: f64,
        pixel_height: f64,
        device_pixel_ratio: f64,
    ) -> Result<(), JsValue> {
        self.resize(ViewportSize::new(pixel_width, pixel_height, device_pixel_ratio))
            .map_err(to_js_error)
    }

    /// Tekenopdrachten van de zes aanzichten.
    #[wasm_bindgen]
    pub fn get_views(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.drawings).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Oppervlakte-eigenschappen van romp en handgreep voor de renderer.
    #[wasm_bindgen]
    pub fn get_materials(&self) -> Result<JsValue, JsValue> {
        let materials = MaterialsExport {
            body: self.state.params.material.spec(),
            handle: HANDLE_METAL,
        };
        serde_wasm_bindgen::to_value(&materials).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// PNG-textuur van de huidige rompafwerking (leeg als er geen patroon is).
    #[wasm_bindgen]
    pub fn body_texture_png(&self) -> Result<Vec<u8>, JsValue> {
        self.body_texture().map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn export_available(&self) -> bool {
        self.exports.is_available()
    }

    /// Bouw de AR-export (GLB) van de huidige kast.
    #[wasm_bindgen]
    pub fn export_glb(&mut self) -> Result<Vec<u8>, JsValue> {
        self.export()
            .map(|(_, bytes)| bytes.to_vec())
            .map_err(to_js_error)
    }

    /// Id van het huidige exportartefact, als dat er is.
    #[wasm_bindgen]
    pub fn current_export_id(&self) -> Option<u32> {
        self.exports.current().map(|(id, _)| id.0)
    }

    /// Artefacten die de host mag opruimen (bijv. object-URL's intrekken).
    #[wasm_bindgen]
    pub fn take_released_exports(&mut self) -> Vec<u32> {
        self.exports.take_released().into_iter().map(|id| id.0).collect()
    }
}

impl Configurator {
    /// Builds the session and draws the first scene and views.
    ///
    /// Fails only when the configured parameters are invalid.
    pub fn from_config(
        config: ConfiguratorConfig,
        rendering_available: bool,
        export_available: bool,
    ) -> Result<Self, FormError> {
        let state = ConfiguratorState::new(config.params.clone(), config.placement)?;

        let host = if rendering_available {
            Some(RetainedScene::new())
        } else {
            log::warn!("3D-weergave niet beschikbaar; alleen aanzichten en export");
            None
        };
        let backend = if export_available {
            Some(GlbBackend {
                max_texture_size: config.export_texture_cap,
            })
        } else {
            None
        };

        let mut configurator = Self {
            state,
            margin: config.view_margin,
            presenter: Presenter::with_door_duration(host, config.door_duration()),
            viewport: ViewportSize::default(),
            drawings: Vec::new(),
            exports: ExportSession::with_backend(backend),
        };
        configurator.rebuild_scene();
        configurator.redraw();
        Ok(configurator)
    }

    #[must_use]
    pub fn state(&self) -> &ConfiguratorState {
        &self.state
    }

    #[must_use]
    pub fn presenter(&self) -> &Presenter<RetainedScene> {
        &self.presenter
    }

    #[must_use]
    pub fn drawings(&self) -> &[ViewDrawing] {
        &self.drawings
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Applies one form edit and brings every consumer up to date.
    ///
    /// A rejected edit leaves the state, the scene and the drawings untouched.
    pub fn apply(&mut self, change: &FieldChange) -> Result<ChangeEffect, FormError> {
        let effect = self.state.apply_change(change)?;
        match effect {
            ChangeEffect::Geometry => {
                self.rebuild_scene();
                self.redraw();
                if self.exports.release() {
                    log::debug!("export-artefact vrijgegeven na wijziging van `{}`", change.field);
                }
            }
            ChangeEffect::Placement => {
                if self.presenter.is_available() {
                    if let Err(err) = self.presenter.set_y_translation(self.state.y_translation()) {
                        log::warn!("plaatsing niet bijgewerkt: {err}");
                    }
                }
            }
            ChangeEffect::Unchanged => {}
        }
        Ok(effect)
    }

    pub fn advance_by(&mut self, dt: Duration) -> bool {
        self.presenter.advance(dt)
    }

    pub fn toggle_door_phase(&mut self) -> Result<DoorPhase, PresenterError> {
        self.presenter.toggle_door()
    }

    pub fn toggle_wireframe_flag(&mut self) -> Result<bool, PresenterError> {
        self.presenter.toggle_wireframe()
    }

    /// Pending scene changes; empty when rendering is unavailable.
    pub fn take_scene_diff(&mut self) -> SceneDiff {
        self.presenter
            .host_mut()
            .map(RetainedScene::take_diff)
            .unwrap_or_default()
    }

    /// Stores the new size and redraws; on failure the last good drawings stay.
    pub fn resize(&mut self, viewport: ViewportSize) -> Result<(), ProjectionError> {
        self.viewport = viewport;
        let drawings = project_all(&self.state.params, &self.viewport, self.margin)?;
        self.drawings = drawings;
        Ok(())
    }

    /// Exports the current cabinet, replacing (and releasing) the previous artifact.
    pub fn export(&mut self) -> Result<(ArtifactId, &[u8]), ExportError> {
        let (id, bytes) = self.exports.export_now(&self.state.params)?;
        Ok((id, bytes.as_slice()))
    }

    /// PNG finish texture for the interactive view; empty for flat materials.
    pub fn body_texture(&self) -> Result<Vec<u8>, image::ImageError> {
        let spec = self.state.params.material.spec();
        if spec.pattern.is_none() {
            return Ok(Vec::new());
        }
        let image = finish_texture(&spec, PRESENTER_TEXTURE_SIZE);
        encode_png(&image, PRESENTER_TEXTURE_SIZE)
    }

    pub fn release_export(&mut self) -> bool {
        self.exports.release()
    }

    pub fn released_exports(&mut self) -> Vec<ArtifactId> {
        self.exports.take_released()
    }

    fn apply_js(&mut self, change: &FieldChange) -> Result<String, JsValue> {
        match self.apply(change) {
            Ok(effect) => Ok(effect_name(effect).to_owned()),
            Err(err) => {
                debug_log!("wijziging `{}` geweigerd: {err}", change.field);
                Err(to_js_error(err))
            }
        }
    }

    fn rebuild_scene(&mut self) {
        if !self.presenter.is_available() {
            return;
        }
        if let Err(err) = self
            .presenter
            .rebuild(&self.state.params, self.state.y_translation())
        {
            log::warn!("scène niet opnieuw opgebouwd: {err}");
        }
    }

    fn redraw(&mut self) {
        match project_all(&self.state.params, &self.viewport, self.margin) {
            Ok(drawings) => self.drawings = drawings,
            Err(err) => log::warn!("aanzichten niet bijgewerkt: {err}"),
        }
    }
}

fn effect_name(effect: ChangeEffect) -> &'static str {
    match effect {
        ChangeEffect::Geometry => "geometry",
        ChangeEffect::Placement => "placement",
        ChangeEffect::Unchanged => "unchanged",
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
