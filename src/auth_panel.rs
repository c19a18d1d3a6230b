use gloo::timers::callback::Timeout;
use yew::prelude::*;

use crate::auth::{
    AuthClient, AuthSession, LocalStorageStore, PasswordStrength, RegistrationForm,
};
use crate::components::Modal;
use crate::utils::input_value;

/// Delay before switching to the login tab after a successful registration.
const SWITCH_TO_LOGIN_MS: u32 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    Login,
    Register,
}

/// Message under a form: an error or a success notice.
#[derive(Debug, Clone, PartialEq)]
enum FormNotice {
    Error(String),
    Success(String),
}

fn notice_view(id: &'static str, notice: &Option<FormNotice>) -> Html {
    let Some(notice) = notice else {
        return html! {};
    };
    let (color, text) = match notice {
        FormNotice::Error(text) => ("bg-red-50 text-red-700 border-red-200", text),
        FormNotice::Success(text) => ("bg-green-50 text-green-700 border-green-200", text),
    };
    html! {
        <div {id} class={classes!("mb-3", "p-2", "border", "rounded", "text-sm", "whitespace-pre-line", color)}>
            {text.clone()}
        </div>
    }
}

fn text_input(id: &'static str, label: &'static str, kind: &'static str, value: &UseStateHandle<String>) -> Html {
    let oninput = {
        let value = value.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(v) = input_value(&e) {
                value.set(v);
            }
        })
    };
    html! {
        <div class="mb-3">
            <label for={id} class="block text-sm font-medium text-gray-700 mb-1">{label}</label>
            <input
                {id}
                type={kind}
                value={(**value).clone()}
                {oninput}
                class="w-full px-3 py-2 border border-gray-300 rounded-lg text-sm focus:outline-none focus:ring-2 focus:ring-blue-500"
            />
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct PasswordInputProps {
    id: &'static str,
    label: &'static str,
    value: UseStateHandle<String>,
    #[prop_or_default]
    invalid: Option<bool>,
}

/// Password field with a show/hide toggle.
#[function_component(PasswordInput)]
fn password_input(props: &PasswordInputProps) -> Html {
    let visible = use_state(|| false);

    let oninput = {
        let value = props.value.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(v) = input_value(&e) {
                value.set(v);
            }
        })
    };
    let on_toggle = {
        let visible = visible.clone();
        Callback::from(move |_: MouseEvent| visible.set(!*visible))
    };

    let border = match props.invalid {
        Some(true) => "is-invalid border-red-500",
        Some(false) => "is-valid border-green-500",
        None => "border-gray-300",
    };

    html! {
        <div class="mb-3">
            <label for={props.id} class="block text-sm font-medium text-gray-700 mb-1">{props.label}</label>
            <div class="flex">
                <input
                    id={props.id}
                    type={if *visible { "text" } else { "password" }}
                    value={(*props.value).clone()}
                    {oninput}
                    class={classes!("flex-1", "px-3", "py-2", "border", "rounded-l-lg", "text-sm", "focus:outline-none", border)}
                />
                <button
                    type="button"
                    class="toggle-password px-3 border border-l-0 border-gray-300 rounded-r-lg text-xs text-gray-600 hover:bg-gray-100"
                    onclick={on_toggle}
                >
                    {if *visible { "Hide" } else { "Show" }}
                </button>
            </div>
        </div>
    }
}

fn strength_bar(id: &'static str, label: &'static str, ok: bool) -> Html {
    html! {
        <div class="flex items-center gap-2 text-xs">
            <div class="flex-1 h-1.5 bg-gray-200 rounded">
                <div
                    {id}
                    class={classes!("h-1.5", "rounded", if ok { "bg-green-500" } else { "bg-red-500" })}
                    style={if ok { "width: 100%" } else { "width: 0%" }}
                />
            </div>
            <span class="w-28 text-gray-600">{label}</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AuthModalProps {
    pub client: AuthClient,
    pub initial_tab: AuthTab,
    pub on_login: Callback<AuthSession>,
    pub on_close: Callback<()>,
}

/// Login and registration forms in one dialog.
#[function_component(AuthModal)]
pub fn auth_modal(props: &AuthModalProps) -> Html {
    let tab = use_state(|| props.initial_tab);
    let busy = use_state(|| false);

    let login_username = use_state(String::new);
    let login_password = use_state(String::new);
    let login_notice = use_state(|| None::<FormNotice>);

    let reg_username = use_state(String::new);
    let reg_email = use_state(String::new);
    let reg_password = use_state(String::new);
    let reg_confirm = use_state(String::new);
    let reg_notice = use_state(|| None::<FormNotice>);

    let on_login_submit = {
        let client = props.client.clone();
        let on_login = props.on_login.clone();
        let username = login_username.clone();
        let password = login_password.clone();
        let notice = login_notice.clone();
        let busy = busy.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            notice.set(None);
            busy.set(true);

            let client = client.clone();
            let on_login = on_login.clone();
            let username = username.clone();
            let password = password.clone();
            let notice = notice.clone();
            let busy = busy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.login(&LocalStorageStore, &username, &password).await;
                busy.set(false);
                match result {
                    Ok(session) => {
                        username.set(String::new());
                        password.set(String::new());
                        on_login.emit(session);
                    }
                    Err(e) => {
                        log::error!("Login failed: {e}");
                        notice.set(Some(FormNotice::Error(e.to_string())));
                    }
                }
            });
        })
    };

    let on_register_submit = {
        let client = props.client.clone();
        let fields = (
            reg_username.clone(),
            reg_email.clone(),
            reg_password.clone(),
            reg_confirm.clone(),
        );
        let notice = reg_notice.clone();
        let busy = busy.clone();
        let tab = tab.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            notice.set(None);

            let (username, email, password, confirm) = fields.clone();
            let form = RegistrationForm {
                username: (*username).clone(),
                email: (*email).clone(),
                password: (*password).clone(),
                password_confirm: (*confirm).clone(),
            };
            let client = client.clone();
            let notice = notice.clone();
            let busy = busy.clone();
            let tab = tab.clone();
            busy.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.register(&form).await;
                busy.set(false);
                match result {
                    Ok(()) => {
                        for field in [&username, &email, &password, &confirm] {
                            field.set(String::new());
                        }
                        notice.set(Some(FormNotice::Success(
                            "Registration successful! You can now log in.".to_string(),
                        )));
                        Timeout::new(SWITCH_TO_LOGIN_MS, move || tab.set(AuthTab::Login)).forget();
                    }
                    Err(e) => {
                        log::error!("Registration failed: {e}");
                        notice.set(Some(FormNotice::Error(e.to_string())));
                    }
                }
            });
        })
    };

    let tab_button = |target: AuthTab, id: &'static str, label: &'static str| {
        let tab = tab.clone();
        let active = *tab == target;
        html! {
            <button
                {id}
                type="button"
                onclick={Callback::from(move |_: MouseEvent| tab.set(target))}
                class={classes!(
                    "flex-1", "py-2", "text-sm", "font-medium", "border-b-2",
                    if active { "active border-blue-500 text-blue-600" } else { "border-transparent text-gray-500" }
                )}
            >
                {label}
            </button>
        }
    };

    let submit_label = |idle: &'static str, working: &'static str| if *busy { working } else { idle };

    let strength = PasswordStrength::of(&reg_password);
    let typed = !reg_password.is_empty();
    let confirm_state = (!reg_confirm.is_empty()).then(|| *reg_confirm != *reg_password);

    let body = match *tab {
        AuthTab::Login => html! {
            <form id="login-form" onsubmit={on_login_submit}>
                { notice_view("login-error", &login_notice) }
                { text_input("login-username", "Username", "text", &login_username) }
                <PasswordInput id="login-password" label="Password" value={login_password.clone()} />
                <button
                    type="submit"
                    disabled={*busy}
                    class="w-full px-4 py-2 bg-blue-500 text-white rounded-lg text-sm font-medium hover:bg-blue-600 transition-colors disabled:opacity-50"
                >
                    { submit_label("Log in", "Logging in…") }
                </button>
            </form>
        },
        AuthTab::Register => html! {
            <form id="register-form" onsubmit={on_register_submit}>
                { notice_view("register-error", &reg_notice) }
                { text_input("register-username", "Username", "text", &reg_username) }
                { text_input("register-email", "Email", "email", &reg_email) }
                <PasswordInput
                    id="register-password"
                    label="Password"
                    value={reg_password.clone()}
                    invalid={typed.then_some(!strength.is_valid())}
                />
                <div class="mb-3 space-y-1">
                    { strength_bar("password-length-check", "8+ characters", strength.length) }
                    { strength_bar("password-uppercase-check", "Uppercase letter", strength.uppercase) }
                    { strength_bar("password-lowercase-check", "Lowercase letter", strength.lowercase) }
                    { strength_bar("password-digit-check", "Digit", strength.digit) }
                </div>
                <PasswordInput
                    id="register-password-confirm"
                    label="Confirm password"
                    value={reg_confirm.clone()}
                    invalid={confirm_state}
                />
                <button
                    type="submit"
                    disabled={*busy}
                    class="w-full px-4 py-2 bg-blue-500 text-white rounded-lg text-sm font-medium hover:bg-blue-600 transition-colors disabled:opacity-50"
                >
                    { submit_label("Register", "Registering…") }
                </button>
            </form>
        },
    };

    html! {
        <Modal id="loginModal" title="Account" on_close={props.on_close.clone()}>
            <div class="flex mb-4 border-b border-gray-200">
                { tab_button(AuthTab::Login, "login-tab", "Log in") }
                { tab_button(AuthTab::Register, "register-tab", "Register") }
            </div>
            {body}
        </Modal>
    }
}

#[derive(Properties, PartialEq)]
pub struct AuthHeaderProps {
    pub session: Option<AuthSession>,
    pub on_login: Callback<()>,
    pub on_logout: Callback<()>,
    pub on_about: Callback<()>,
}

/// Login/about buttons, or the user name with logout when logged in.
#[function_component(AuthHeader)]
pub fn auth_header(props: &AuthHeaderProps) -> Html {
    let emit = |cb: &Callback<()>| {
        let cb = cb.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    let button = "px-3 py-1 rounded text-sm border border-white/40 hover:bg-white/10";

    match &props.session {
        Some(session) => html! {
            <div id="user-profile" class="flex items-center gap-3">
                <span id="user-display-name" class="text-sm font-medium">{&session.user.username}</span>
                <button id="about-btn-logged" type="button" class={button} onclick={emit(&props.on_about)}>{"About"}</button>
                <button id="logout-btn" type="button" class={button} onclick={emit(&props.on_logout)}>{"Log out"}</button>
            </div>
        },
        None => html! {
            <div id="auth-buttons" class="flex items-center gap-3">
                <button id="about-btn" type="button" class={button} onclick={emit(&props.on_about)}>{"About"}</button>
                <button id="login-btn" type="button" class={button} onclick={emit(&props.on_login)}>{"Log in"}</button>
            </div>
        },
    }
}

#[derive(Properties, PartialEq)]
pub struct AuthBannerProps {
    pub on_login: Callback<()>,
}

/// Shown to anonymous users above the layer list.
#[function_component(AuthBanner)]
pub fn auth_banner(props: &AuthBannerProps) -> Html {
    let onclick = {
        let on_login = props.on_login.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_login.emit(());
        })
    };
    html! {
        <div id="auth-info-banner" class="m-4 p-3 bg-blue-50 border border-blue-200 rounded text-sm text-blue-800">
            {"Thematic layers are available after "}
            <a href="#" id="login-info-link" class="underline font-medium" {onclick}>{"logging in"}</a>
            {"."}
        </div>
    }
}
