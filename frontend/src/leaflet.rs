//! Minimal bindings to the global `L` object of Leaflet.

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;

pub const OSM_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str =
    "<a href=\"https://openstreetmap.org/copyright\" target=\"_blank\">© OpenStreetMap</a>";
pub const MAX_ZOOM: f64 = 19.0;

#[wasm_bindgen]
extern "C" {
    pub type Map;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn new_map(container_id: &str, options: &JsValue) -> Map;

    #[wasm_bindgen(js_namespace = L)]
    fn canvas() -> JsValue;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &Map, center: &Array, zoom: f64) -> Map;

    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &Map) -> f64;

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, handler: &Function) -> Map;

    #[wasm_bindgen(method)]
    pub fn once(this: &Map, event: &str, handler: &Function) -> Map;

    #[wasm_bindgen(method)]
    pub fn remove(this: &Map) -> Map;
}

#[wasm_bindgen]
extern "C" {
    pub type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn new_tile_layer(url: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &TileLayer, map: &Map) -> TileLayer;
}

#[wasm_bindgen]
extern "C" {
    pub type LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    fn new_layer_group() -> LayerGroup;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &LayerGroup, map: &Map) -> LayerGroup;

    #[wasm_bindgen(method, js_name = addLayer)]
    pub fn add_layer(this: &LayerGroup, layer: &Marker) -> LayerGroup;

    #[wasm_bindgen(method, js_name = removeLayer)]
    pub fn remove_layer(this: &LayerGroup, layer: &Marker) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    pub fn clear_layers(this: &LayerGroup) -> LayerGroup;
}

#[wasm_bindgen]
extern "C" {
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn new_marker(lat_lng: &Array, options: &JsValue) -> Marker;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    fn new_div_icon(options: &JsValue) -> JsValue;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &Marker, html: &str) -> Marker;
}

#[wasm_bindgen]
extern "C" {
    /// `L.LeafletMouseEvent`
    pub type MouseEvent;

    #[wasm_bindgen(method, getter)]
    pub fn latlng(this: &MouseEvent) -> LatLng;

    pub type LatLng;

    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &LatLng) -> f64;
}

fn options(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in entries {
        // plain fresh object, set cannot fail
        let _ = Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    obj.into()
}

fn lat_lng(lat: f64, lng: f64) -> Array {
    Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lng))
}

impl Map {
    /// Canvas-rendered map with OpenStreetMap tiles inside the element
    /// `container_id`.
    pub fn create(container_id: &str, lat: f64, lng: f64, zoom: f64) -> Map {
        let map = new_map(container_id, &options(&[("renderer", canvas())]));
        map.set_view(&lat_lng(lat, lng), zoom);

        new_tile_layer(
            OSM_TILES,
            &options(&[
                ("maxZoom", JsValue::from_f64(MAX_ZOOM)),
                ("attribution", JsValue::from_str(OSM_ATTRIBUTION)),
            ]),
        )
        .add_to(&map);

        map
    }
}

impl LayerGroup {
    pub fn create(map: &Map) -> LayerGroup {
        let group = new_layer_group();
        group.add_to(map);
        group
    }
}

impl Marker {
    /// Marker drawn as the given html, `size` pixels square.
    pub fn with_html(lat: f64, lng: f64, html: &str, size: u32) -> Marker {
        let size = Array::of2(&JsValue::from(size), &JsValue::from(size));
        let icon = new_div_icon(&options(&[
            ("className", JsValue::from_str("custom-marker")),
            ("html", JsValue::from_str(html)),
            ("iconSize", size.into()),
        ]));
        new_marker(&lat_lng(lat, lng), &options(&[("icon", icon)]))
    }
}
