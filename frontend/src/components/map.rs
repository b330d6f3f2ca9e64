use common::req::Device;
use log::{error, info};
use wasm_bindgen::{closure::Closure, JsCast};
use yew::prelude::*;

use crate::{
    batch::{Renderer, CHUNK_DELAY},
    components::{device_form::DeviceFormDialog, toast::Toasts},
    layer::ClusterLayer,
    leaflet::{self, Map},
    request,
    state::{AppState, FormField},
};

const MAP_CONTAINER_ID: &str = "map";
const START_LAT: f64 = 55.751244;
const START_LNG: f64 = 37.618423;
const START_ZOOM: f64 = 15.0;

pub enum Msg {
    Load,
    Loaded(Result<Vec<Device>, request::Error>),
    RenderChunk(u64),
    ZoomChanged,
    BeginAdd,
    MapClicked { lng: f64, lat: f64 },
    FieldChanged(FormField, String),
    Save,
    Saved(Result<Device, request::Error>),
    CloseDialog,
    DismissToast(u32),
}

/// The device map page. Owns the application state, the renderer and the
/// Leaflet layer; every async result comes back as a message.
pub struct Model {
    state: AppState,
    renderer: Renderer,
    layer: Option<ClusterLayer>,
    _on_zoom: Option<Closure<dyn FnMut()>>,
}

impl Component for Model {
    type Message = Msg;

    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            state: AppState::default(),
            renderer: Renderer::default(),
            layer: None,
            _on_zoom: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                let link = ctx.link().clone();
                wasm_bindgen_futures::spawn_local(async move {
                    link.send_message(Msg::Loaded(request::devices().await));
                });
                false
            }
            Msg::Loaded(Ok(devices)) => {
                info!("Loaded {} devices", devices.len());
                let snapshot = self.state.replace_devices(devices);
                let generation = self.renderer.render_all(snapshot);
                ctx.link().send_message(Msg::RenderChunk(generation));
                true
            }
            Msg::Loaded(Err(e)) => {
                error!("Failed to load devices: {e}");
                self.state.load_failed();
                true
            }
            Msg::RenderChunk(generation) => {
                if let Some(layer) = self.layer.as_mut() {
                    if self.renderer.run_chunk(generation, layer) {
                        let link = ctx.link().clone();
                        wasm_bindgen_futures::spawn_local(async move {
                            yew::platform::time::sleep(CHUNK_DELAY).await;
                            link.send_message(Msg::RenderChunk(generation));
                        });
                    }
                }
                false
            }
            Msg::ZoomChanged => {
                let generation = self.renderer.render_all(self.state.snapshot());
                ctx.link().send_message(Msg::RenderChunk(generation));
                false
            }
            Msg::BeginAdd => {
                self.state.begin_add_flow();
                if let Some(layer) = self.layer.as_ref() {
                    arm_map_pick(ctx, layer.map());
                }
                true
            }
            Msg::MapClicked { lng, lat } => self.state.map_clicked(lng, lat),
            Msg::FieldChanged(field, value) => {
                self.state.set_field(field, value);
                true
            }
            Msg::Save => {
                if let Some(payload) = self.state.begin_save() {
                    let link = ctx.link().clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        link.send_message(Msg::Saved(request::create_device(&payload).await));
                    });
                }
                true
            }
            Msg::Saved(Ok(dev)) => {
                info!("Device {} saved", dev.id);
                if self.renderer.is_rendering() {
                    // the running pass would clear it again
                    self.state.save_succeeded(dev);
                    let generation = self.renderer.render_all(self.state.snapshot());
                    ctx.link().send_message(Msg::RenderChunk(generation));
                } else {
                    if let Some(layer) = self.layer.as_mut() {
                        self.renderer.render_one(&dev, layer);
                    }
                    self.state.save_succeeded(dev);
                }
                true
            }
            Msg::Saved(Err(e)) => {
                error!("Failed to save device: {e}");
                self.state.save_failed(&e.to_string());
                true
            }
            Msg::CloseDialog => {
                self.state.close_dialog();
                true
            }
            Msg::DismissToast(id) => self.state.dismiss_toast(id),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let state = &self.state;

        html! {
            <div class="map-page">
                <div id={MAP_CONTAINER_ID} class="map"></div>
                <div class="map-controls">
                    <button type="button"
                        class={classes!("btn", "btn-primary", state.is_pick_armed().then_some("active"))}
                        onclick={link.callback(|_| Msg::BeginAdd)}>
                        {"Add device"}
                    </button>
                    <span class="badge text-bg-secondary">{format!("{} devices", state.devices().len())}</span>
                </div>
                <DeviceFormDialog
                    open={state.is_dialog_open()}
                    saving={state.is_saving()}
                    form={state.form().clone()}
                    on_change={link.callback(|(field, value): (FormField, String)| {
                        Msg::FieldChanged(field, value)
                    })}
                    on_save={link.callback(|()| Msg::Save)}
                    on_close={link.callback(|()| Msg::CloseDialog)}
                />
                <Toasts toasts={state.toasts().to_vec()} on_dismiss={link.callback(Msg::DismissToast)} />
            </div>
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            let map = Map::create(MAP_CONTAINER_ID, START_LAT, START_LNG, START_ZOOM);

            let link = ctx.link().clone();
            let on_zoom = Closure::<dyn FnMut()>::new(move || link.send_message(Msg::ZoomChanged));
            map.on("zoomend", on_zoom.as_ref().unchecked_ref());

            self._on_zoom = Some(on_zoom);
            self.layer = Some(ClusterLayer::new(map));
            ctx.link().send_message(Msg::Load);
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let Some(layer) = self.layer.take() {
            layer.map().remove();
        }
    }
}

/// Sends the coordinates of the next map click, once.
fn arm_map_pick(ctx: &Context<Model>, map: &Map) {
    let link = ctx.link().clone();
    let on_click = Closure::once_into_js(move |e: leaflet::MouseEvent| {
        let latlng = e.latlng();
        link.send_message(Msg::MapClicked {
            lng: latlng.lng(),
            lat: latlng.lat(),
        });
    });
    map.once("click", on_click.unchecked_ref());
}
