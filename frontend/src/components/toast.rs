use yew::prelude::*;

use crate::state::{Toast, ToastKind};

#[derive(Properties, PartialEq)]
pub struct Props {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u32>,
}

#[function_component(Toasts)]
pub fn toasts(props: &Props) -> Html {
    html! {
        <div class="toast-container position-fixed top-0 end-0 p-3">
            { for props.toasts.iter().map(|toast| html! {
                <ToastItem key={toast.id} toast={toast.clone()} on_dismiss={props.on_dismiss.clone()}/>
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ItemProps {
    toast: Toast,
    on_dismiss: Callback<u32>,
}

#[function_component(ToastItem)]
fn toast_item(props: &ItemProps) -> Html {
    let id = props.toast.id;

    // hide after the kind's delay
    {
        let delay = props.toast.kind.delay();
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with(id, move |&id| {
            wasm_bindgen_futures::spawn_local(async move {
                yew::platform::time::sleep(delay).await;
                on_dismiss.emit(id);
            });
        });
    }

    let class = match props.toast.kind {
        ToastKind::Success => "toast show align-items-center text-bg-success border-0",
        ToastKind::Error => "toast show align-items-center text-bg-danger border-0",
        ToastKind::Hint => "toast show align-items-center text-bg-info border-0",
    };
    let onclick = props.on_dismiss.reform(move |_: MouseEvent| id);

    html! {
        <div {class} role="alert">
            <div class="d-flex">
                <div class="toast-body">{props.toast.message.clone()}</div>
                <button type="button" class="btn-close btn-close-white me-2 m-auto" {onclick}></button>
            </div>
        </div>
    }
}
