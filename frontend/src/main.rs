mod batch;
mod cluster;
mod components;
mod layer;
mod leaflet;
mod marker;
mod request;
mod signal;
mod state;

use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Map,
    #[at("/devices")]
    Devices,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    pub current_route: Route,
}

struct Model {}

impl Component for Model {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {}
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <BrowserRouter>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        }
    }
}

#[function_component(PageMap)]
pub fn page_map() -> Html {
    html! {
        <div class="container-fluid">
            <div class="row">
                <Sidebar current_route={Route::Map}/>
                <div class="col-sm-9 col-md-10 main">
                    <components::map::Model />
                </div>
            </div>
        </div>
    }
}

#[function_component(PageDevices)]
pub fn page_devices() -> Html {
    html! {
        <div class="container-fluid">
            <div class="row">
                <Sidebar current_route={Route::Devices}/>
                <div class="col-sm-9 col-md-10 main">
                    <h1 class="page-header">{"Devices"}</h1>
                    <components::devices::Devices />
                </div>
            </div>
        </div>
    }
}

#[function_component(Sidebar)]
pub fn sidebar(props: &Props) -> Html {
    let cr = &props.current_route;
    let class_active = move |r| {
        if *cr == r {
            "active"
        } else {
            ""
        }
    };

    html! {
        <div class="col-sm-3 col-md-2 sidebar">
            <ul class="nav nav-sidebar">
                <li class={class_active(Route::Map)}>
                    <Link<Route> to={Route::Map}>{"🗺 Map"}</Link<Route>>
                </li>
                <li class={class_active(Route::Devices)}>
                    <Link<Route> to={Route::Devices}>{"📡 Devices"}</Link<Route>>
                </li>
            </ul>

            <ul class="nav nav-sidebar fix-bottom">
            {format!("v{}", env!("CARGO_PKG_VERSION"))}
            </ul>
        </div>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Map => html! { <PageMap/> },
        Route::Devices => html! { <PageDevices/> },
        Route::NotFound => html! { <h1>{ "404" }</h1> },
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<Model>::new().render();
}
