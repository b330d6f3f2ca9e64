use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::state::{DeviceForm, FormField};

#[derive(Properties, PartialEq)]
pub struct Props {
    pub open: bool,
    pub saving: bool,
    pub form: DeviceForm,
    pub on_change: Callback<(FormField, String)>,
    pub on_save: Callback<()>,
    pub on_close: Callback<()>,
}

/// Modal for a new device. Coordinates arrive pre-filled from the map pick.
#[function_component(DeviceFormDialog)]
pub fn device_form_dialog(props: &Props) -> Html {
    if !props.open {
        return html! {};
    }

    let fields = [
        (FormField::DeviceId, "Device ID", "text", None),
        (FormField::CoordinateX, "Longitude", "number", Some("0.000001")),
        (FormField::CoordinateY, "Latitude", "number", Some("0.000001")),
        (FormField::SignalQuality, "Signal quality (0-10)", "number", Some("1")),
    ];

    let inputs: Vec<_> = fields
        .iter()
        .map(|&(field, label, kind, step)| {
            let cb = props.on_change.clone();
            let oninput = Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                cb.emit((field, input.value()));
            });

            html! {
                <div class="mb-3">
                    <label class="form-label" for={field.name()}>{label}</label>
                    <input class="form-control" id={field.name()} name={field.name()}
                        type={kind} {step} value={props.form.get(field).to_owned()} {oninput}/>
                </div>
            }
        })
        .collect();

    let on_save = props.on_save.reform(|_: MouseEvent| ());
    let on_close = props.on_close.reform(|_: MouseEvent| ());

    html! {
        <div class="modal d-block" tabindex="-1">
            <div class="modal-dialog">
                <div class="modal-content">
                    <div class="modal-header">
                        <h5 class="modal-title">{"Add device"}</h5>
                        <button type="button" class="btn-close" onclick={on_close.clone()}></button>
                    </div>
                    <form class="modal-body" id="deviceForm">
                        {inputs}
                    </form>
                    <div class="modal-footer">
                        <button type="button" class="btn btn-secondary" onclick={on_close}>{"Cancel"}</button>
                        <button type="button" class="btn btn-primary" disabled={props.saving} onclick={on_save}>
                            if props.saving {
                                <span class="spinner-border spinner-border-sm"></span>{" Saving..."}
                            } else {
                                {"Save"}
                            }
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}
