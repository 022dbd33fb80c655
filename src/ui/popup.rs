/// Popup UI for Hold My Page extension

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use patternfly_yew::prelude::*;
use log::{debug, error};
use std::rc::Rc;
use crate::browser::{ChromeBrowser, load_config};
use crate::client::HttpBookmarkService;
use crate::workflow::{Indicator, Workflow};

type PopupWorkflow = Workflow<HttpBookmarkService, ChromeBrowser>;

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Ready,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let workflow = use_state(|| None::<Rc<PopupWorkflow>>);

    // Build the session workflow once, after the config is read
    {
        let state = state.clone();
        let workflow = workflow.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let config = load_config().await;

                match HttpBookmarkService::new(&config) {
                    Ok(service) => {
                        let wf = Workflow::new(service, ChromeBrowser, Indicator::from(&config));
                        workflow.set(Some(Rc::new(wf)));
                        state.set(AppState::Ready);
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Failed to start: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    // Hold current page handler
    let on_bookmark_current = {
        let workflow = workflow.clone();

        Callback::from(move |_| {
            let Some(wf) = (*workflow).clone() else { return };

            spawn_local(async move {
                if let Err(e) = wf.bookmark_current_tab().await {
                    error!("Hold current page failed: {}", e);
                }
            });
        })
    };

    // Hold all tabs handler
    let on_bookmark_all = {
        let workflow = workflow.clone();

        Callback::from(move |_| {
            let Some(wf) = (*workflow).clone() else { return };

            spawn_local(async move {
                match wf.bookmark_all_tabs().await {
                    Ok(outcome) => debug!("{:?}, {} pages held this session", outcome, wf.held_count()),
                    Err(e) => error!("Hold all tabs failed: {}", e),
                }
            });
        })
    };

    // Reopen held tabs handler
    let on_open_saved = {
        let workflow = workflow.clone();

        Callback::from(move |_| {
            let Some(wf) = (*workflow).clone() else { return };

            spawn_local(async move {
                if let Err(e) = wf.open_saved_tabs().await {
                    error!("Open saved tabs failed: {}", e);
                }
            });
        })
    };

    let is_ready = matches!(*state, AppState::Ready);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Hold My Page"}</h1>

            {match &*state {
                AppState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Ready => html! {}
            }}

            <div class="flex-column-gap">
                <Button onclick={on_bookmark_current} disabled={!is_ready} variant={ButtonVariant::Primary} block={true}>
                    {"Hold This Page"}
                </Button>
                <Button onclick={on_bookmark_all} disabled={!is_ready} variant={ButtonVariant::Secondary} block={true}>
                    {"Hold All Tabs"}
                </Button>
                <Button onclick={on_open_saved} disabled={!is_ready} variant={ButtonVariant::Secondary} block={true}>
                    {"Open All Held Tabs"}
                </Button>
            </div>

            <p class="footer-popup">
                {"Hold My Page v0.1.0"}
            </p>
        </div>
    }
}
