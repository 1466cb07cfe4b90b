//! Leptos application with routing.

use std::rc::Rc;

use leptos::*;
use leptos_router::*;

use timekeep_auth::{
    AccessDecision, AccessGuard, Credentials, MockVerifier, NAVIGATION, Session, SessionStore,
    UserRole, requested_path, visible_navigation,
};

use crate::frontend::storage::LocalStorage;

type WebSessionStore = SessionStore<LocalStorage, MockVerifier>;

/// Session handle handed to the view tree through Leptos context.
///
/// `session` mirrors the store's watch channel so views re-render on every
/// change; the store itself stays the only writer.
#[derive(Clone)]
pub struct SessionContext {
    store: Rc<WebSessionStore>,
    guard: Rc<AccessGuard>,
    session: RwSignal<Session>,
}

impl SessionContext {
    fn open() -> Self {
        let store = Rc::new(SessionStore::open(LocalStorage::new(), MockVerifier::reference()));
        let session = create_rw_signal(store.session().clone());

        let mut changes = store.subscribe();
        spawn_local(async move {
            while changes.changed().await.is_ok() {
                let next = changes.borrow_and_update().clone();
                session.set(next);
            }
        });

        Self {
            store,
            guard: Rc::new(AccessGuard::default()),
            session,
        }
    }
}

fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    provide_context(SessionContext::open());

    view! {
        <Router>
            <Routes>
                <Route path="/login" view=LoginPage/>
                <Route path="/dashboard" view=|| view! { <Protected><DashboardLayout/></Protected> }>
                    <Route path="" view=HomePage/>
                    <Route path="profile" view=ProfilePage/>
                    <Route path="*section" view=SectionPage/>
                </Route>
                <Route path="/*any" view=|| view! { <Redirect path="/dashboard"/> }/>
            </Routes>
        </Router>
    }
}

/// Renders `children` only when the guard admits the current location.
#[component]
fn Protected(children: ChildrenFn) -> impl IntoView {
    let ctx = use_session();
    let location = use_location();

    move || {
        if ctx.session.with(Session::is_loading) {
            return view! { <div class="loading">"Loading..."</div> }.into_view();
        }

        let path = requested_path(
            &location.pathname.get(),
            &location.search.get(),
            &location.hash.get(),
        );
        match ctx.session.with(|session| ctx.guard.authorize(session, &path)) {
            AccessDecision::Pending => {
                view! { <div class="loading">"Loading..."</div> }.into_view()
            }
            AccessDecision::Admit => children().into_view(),
            AccessDecision::Redirect(redirect) => {
                let from: String = js_sys::encode_uri_component(&redirect.return_to).into();
                let target = format!("{}?from={}", redirect.login_path, from);
                view! { <Redirect path=target/> }.into_view()
            }
        }
    }
}

/// Login page component.
#[component]
fn LoginPage() -> impl IntoView {
    let ctx = use_session();
    let query = use_query_map();
    let navigate = use_navigate();

    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let is_submitting = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        let credentials = Credentials::new(email.get_untracked(), password.get_untracked());
        if let Err(err) = credentials.validate() {
            error.set(Some(err.to_string()));
            return;
        }

        error.set(None);
        is_submitting.set(true);
        let ctx = ctx.clone();
        let navigate = navigate.clone();
        let return_to = query.with_untracked(|q| q.get("from").cloned());

        spawn_local(async move {
            match ctx.store.login(&credentials).await {
                Ok(_) => {
                    let target = ctx.guard.landing_path(return_to.as_deref()).to_string();
                    navigate(&target, Default::default());
                }
                Err(err) => error.set(Some(err.to_string())),
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="login">
            <h1>"Employee Time Tracking"</h1>
            <p>"Log in to manage your work hours"</p>

            <form on:submit=submit>
                <label for="email">"Email"</label>
                <input
                    id="email"
                    type="email"
                    placeholder="name@example.com"
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />

                <label for="password">"Password"</label>
                <input
                    id="password"
                    type="password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />

                {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}

                <button type="submit" disabled=move || is_submitting.get()>
                    {move || if is_submitting.get() { "Signing in..." } else { "Sign in" }}
                </button>
            </form>

            <div class="demo-credentials">
                <p>"Demo credentials:"</p>
                <p>"Admin: admin@example.com / password"</p>
                <p>"Employee: employee@example.com / password"</p>
            </div>
        </div>
    }
}

#[component]
fn DashboardLayout() -> impl IntoView {
    view! {
        <div class="dashboard">
            <Sidebar/>
            <main>
                <Outlet/>
            </main>
        </div>
    }
}

/// Role-filtered navigation plus the signed-in user and a logout button.
#[component]
fn Sidebar() -> impl IntoView {
    let ctx = use_session();
    let session = ctx.session;
    let entries = move || {
        session.with(|s| s.role().map(visible_navigation).unwrap_or_default())
    };
    let logout = move |_| ctx.store.logout();

    view! {
        <aside class="sidebar">
            <header>"App Dashboard"</header>
            <nav>
                <For
                    each=entries
                    key=|entry| entry.target
                    children=|entry| {
                        view! {
                            <A href=entry.target>
                                <span class=format!("icon icon-{}", entry.icon)></span>
                                <span>{entry.label}</span>
                            </A>
                        }
                    }
                />
            </nav>
            <footer>
                {move || {
                    session.with(|s| {
                        s.user().map(|user| {
                            view! {
                                <div class="user">
                                    <span>{user.name().to_string()}</span>
                                    <span>{user.email().to_string()}</span>
                                </div>
                            }
                        })
                    })
                }}
                <button title="Logout" on:click=logout>"Logout"</button>
            </footer>
        </aside>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let session = use_session().session;

    move || {
        session.with(|s| {
            let name = s.user().map(|u| u.name().to_string()).unwrap_or_else(|| "User".into());
            match s.role() {
                Some(UserRole::Admin) => view! {
                    <h1>"Admin Dashboard"</h1>
                    <p>{format!("Welcome back, {name}! You are logged in as an administrator.")}</p>
                }
                .into_view(),
                _ => view! {
                    <h1>"Employee Dashboard"</h1>
                    <p>{format!("Welcome back, {name}! Here's your daily overview.")}</p>
                }
                .into_view(),
            }
        })
    }
}

#[component]
fn ProfilePage() -> impl IntoView {
    let session = use_session().session;

    move || {
        session.with(|s| {
            s.user().map(|user| {
                view! {
                    <h1>"Profile"</h1>
                    <dl>
                        <dt>"Name"</dt>
                        <dd>{user.name().to_string()}</dd>
                        <dt>"Email"</dt>
                        <dd>{user.email().to_string()}</dd>
                        <dt>"User ID"</dt>
                        <dd>{user.id().to_string()}</dd>
                        <dt>"Role"</dt>
                        <dd>{user.role().to_string()}</dd>
                    </dl>
                }
            })
        })
    }
}

/// Placeholder for the remaining navigation targets.
#[component]
fn SectionPage() -> impl IntoView {
    let location = use_location();

    move || {
        let path = location.pathname.get();
        let title = NAVIGATION
            .iter()
            .find(|entry| entry.target == path)
            .map(|entry| entry.label)
            .unwrap_or("Not Found");
        view! { <h1>{title}</h1> }
    }
}
