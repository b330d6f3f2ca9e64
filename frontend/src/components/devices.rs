use common::req::Device;
use log::error;
use yew::{function_component, html, use_effect_with, use_state, Html};

use crate::{marker::COVERAGE_RADIUS_M, request, signal::color_for_signal};

#[function_component(Devices)]
pub fn device_list() -> Html {
    let devices = use_state(|| None::<Result<Vec<Device>, String>>);

    // requests
    {
        let devices = devices.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                let resp = request::devices().await.map_err(|e| {
                    error!("Failed to load devices: {e}");
                    e.to_string()
                });
                devices.set(Some(resp));
            });
        });
    }

    match devices.as_ref() {
        None => html! { <div>{"Loading..."}</div> },
        Some(Err(_)) => html! { <div>{"Cannot get device list"}</div> },
        Some(Ok(devices)) => {
            let rows: Html = devices
                .iter()
                .map(|dev| {
                    let color = color_for_signal(dev.signal_quality as f64).to_string();
                    html! {
                        <tr key={dev.id}>
                            <td>{dev.id}</td>
                            <td>{dev.device_id.clone()}</td>
                            <td>{format!("{:.6}", dev.coordinate_x)}</td>
                            <td>{format!("{:.6}", dev.coordinate_y)}</td>
                            <td>
                                <span class="signal-swatch" style={format!("background: {color};")}></span>
                                {format!(" {}/10", dev.signal_quality)}
                            </td>
                        </tr>
                    }
                })
                .collect();

            html! {
                <table class="table table-hover">
                    <caption>{format!("{} devices, {}m coverage each", devices.len(), COVERAGE_RADIUS_M)}</caption>
                    <thead>
                        <tr>
                            <th>{"#"}</th>
                            <th>{"Device ID"}</th>
                            <th>{"Longitude"}</th>
                            <th>{"Latitude"}</th>
                            <th>{"Signal"}</th>
                        </tr>
                    </thead>
                    <tbody>{rows}</tbody>
                </table>
            }
        }
    }
}
