//! Stub session backend served by actix-web on an ephemeral port.
//!
//! The stub owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Client calls are driven on the same
//! runtime through [`StubBackend::block_on`]. Dropping the stub stops the
//! server.

use std::future::Future;
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::{App, HttpResponse, HttpServer, web};
use client::outbound::http::HttpBackend;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;
use url::Url;

const SESSION_EMAIL_KEY: &str = "email";
const VALID_PLANS: [&str; 3] = ["Brief", "Motion", "Verdict"];

/// Seeded account with one stored analysis.
pub const ADA_EMAIL: &str = "ada@example.com";
pub const ADA_USERNAME: &str = "ada";
pub const ADA_PASSWORD: &str = "correct horse";

#[derive(Debug, Clone)]
struct StubAccount {
    username: String,
    email: String,
    password: String,
    plan: Option<String>,
    analyses: Vec<Value>,
}

impl StubAccount {
    fn profile(&self) -> Value {
        json!({ "id": format!("id-{}", self.username), "username": self.username, "email": self.email })
    }
}

#[derive(Debug, Default)]
struct StubState {
    accounts: Vec<StubAccount>,
    analyses_requests: usize,
}

type SharedState = Arc<Mutex<StubState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn seeded_state() -> StubState {
    StubState {
        accounts: vec![StubAccount {
            username: ADA_USERNAME.to_owned(),
            email: ADA_EMAIL.to_owned(),
            password: ADA_PASSWORD.to_owned(),
            plan: None,
            analyses: vec![json!({
                "id": "analysis-1",
                "fileName": "lease.pdf",
                "analysisDate": "2026-03-01T10:15:00Z",
                "analysisResult": {
                    "clauses": [
                        { "clause": "Termination", "riskLevel": "High", "explanation": "one-sided" },
                        { "clause": "Rent review", "riskLevel": "Medium" },
                        { "clause": "Notices", "riskLevel": "Low" }
                    ]
                }
            })],
        }],
        analyses_requests: 0,
    }
}

/// Running stub backend plus the runtime that drives it.
pub struct StubBackend {
    runtime: Runtime,
    local: LocalSet,
    base_url: Url,
    server: ServerHandle,
    state: SharedState,
}

impl StubBackend {
    /// Start a stub seeded with the `ada` account.
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let local = LocalSet::new();
        let state: SharedState = Arc::new(Mutex::new(seeded_state()));
        let (base_url, server) = local
            .block_on(&runtime, spawn_stub_server(state.clone()))
            .expect("stub server starts");
        Self {
            runtime,
            local,
            base_url,
            server,
            state,
        }
    }

    /// Drive `future` to completion alongside the server.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }

    /// API root, ending in `/api/`.
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// A fresh HTTP adapter with its own, empty cookie jar.
    pub fn client(&self) -> Arc<HttpBackend> {
        Arc::new(HttpBackend::new(self.base_url(), Duration::from_secs(5)).expect("client builds"))
    }

    /// Number of analyses list requests served so far.
    pub fn analyses_requests(&self) -> usize {
        lock(&self.state).analyses_requests
    }

    /// Add an account directly, bypassing signup validation.
    pub fn register(&self, username: &str, email: &str, password: &str) {
        lock(&self.state).accounts.push(StubAccount {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            plan: None,
            analyses: Vec::new(),
        });
    }

    /// Plan stored for `email`, if the account exists and has one.
    pub fn plan_of(&self, email: &str) -> Option<String> {
        lock(&self.state)
            .accounts
            .iter()
            .find(|account| account.email == email)
            .and_then(|account| account.plan.clone())
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        let server = self.server.clone();
        self.local.block_on(&self.runtime, async move {
            server.stop(true).await;
        });
    }
}

fn detail(message: &str) -> Value {
    json!({ "detail": message })
}

fn unauthenticated() -> HttpResponse {
    HttpResponse::Unauthorized().json(detail("Not authenticated"))
}

fn session_email(session: &Session) -> Option<String> {
    session.get::<String>(SESSION_EMAIL_KEY).ok().flatten()
}

fn start_session(session: &Session, email: &str) -> Result<(), HttpResponse> {
    session.renew();
    session
        .insert(SESSION_EMAIL_KEY, email)
        .map_err(|err| HttpResponse::InternalServerError().json(detail(&err.to_string())))
}

/// Run `action` against the signed-in account, or answer 401.
fn with_account(
    state: &SharedState,
    session: &Session,
    action: impl FnOnce(&mut StubAccount) -> HttpResponse,
) -> HttpResponse {
    let Some(email) = session_email(session) else {
        return unauthenticated();
    };
    let mut guard = lock(state);
    match guard.accounts.iter_mut().find(|account| account.email == email) {
        Some(account) => action(account),
        None => unauthenticated(),
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignupBody {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct PasswordBody {
    current_password: String,
    new_password: String,
}

#[derive(Deserialize)]
struct PlanBody {
    plan: String,
}

async fn me(state: web::Data<SharedState>, session: Session) -> HttpResponse {
    with_account(&state, &session, |account| {
        HttpResponse::Ok().json(account.profile())
    })
}

async fn login(
    state: web::Data<SharedState>,
    session: Session,
    body: web::Json<LoginBody>,
) -> HttpResponse {
    let profile = lock(&state)
        .accounts
        .iter()
        .find(|account| account.email == body.email && account.password == body.password)
        .map(StubAccount::profile);
    let Some(profile) = profile else {
        return HttpResponse::Unauthorized().json(detail("Invalid credentials"));
    };
    match start_session(&session, &body.email) {
        Ok(()) => HttpResponse::Ok().json(profile),
        Err(response) => response,
    }
}

async fn signup(
    state: web::Data<SharedState>,
    session: Session,
    body: web::Json<SignupBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let profile = {
        let mut guard = lock(&state);
        if guard.accounts.iter().any(|account| account.email == body.email) {
            return HttpResponse::BadRequest().json(detail("Email already registered"));
        }
        let account = StubAccount {
            username: body.username,
            email: body.email.clone(),
            password: body.password,
            plan: None,
            analyses: Vec::new(),
        };
        let profile = account.profile();
        guard.accounts.push(account);
        profile
    };
    match start_session(&session, &body.email) {
        Ok(()) => HttpResponse::Ok().json(profile),
        Err(response) => response,
    }
}

async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(json!({ "success": true }))
}

async fn update_password(
    state: web::Data<SharedState>,
    session: Session,
    body: web::Json<PasswordBody>,
) -> HttpResponse {
    let body = body.into_inner();
    with_account(&state, &session, |account| {
        if account.password != body.current_password {
            return HttpResponse::BadRequest().json(detail("Current password is incorrect"));
        }
        account.password = body.new_password;
        HttpResponse::Ok().json(json!({ "success": true }))
    })
}

async fn analyses(state: web::Data<SharedState>, session: Session) -> HttpResponse {
    lock(&state).analyses_requests += 1;
    with_account(&state, &session, |account| {
        HttpResponse::Ok().json(&account.analyses)
    })
}

async fn plan_status(state: web::Data<SharedState>, session: Session) -> HttpResponse {
    with_account(&state, &session, |account| {
        HttpResponse::Ok().json(json!({
            "plan": account.plan,
            "isPro": account.plan.is_some(),
        }))
    })
}

async fn activate_plan(
    state: web::Data<SharedState>,
    session: Session,
    body: web::Json<PlanBody>,
) -> HttpResponse {
    let plan = body.into_inner().plan;
    if !VALID_PLANS.contains(&plan.as_str()) {
        return HttpResponse::BadRequest().json(detail("Invalid plan"));
    }
    with_account(&state, &session, |account| {
        account.plan = Some(plan.clone());
        HttpResponse::Ok().json(json!({ "success": true, "plan": plan }))
    })
}

async fn cancel_plan(state: web::Data<SharedState>, session: Session) -> HttpResponse {
    with_account(&state, &session, |account| {
        account.plan = None;
        HttpResponse::Ok().json(json!({ "success": true }))
    })
}

fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .build()
}

async fn spawn_stub_server(state: SharedState) -> Result<(Url, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        let api = web::scope("/api")
            .wrap(session_middleware(key.clone()))
            .route("/auth/me", web::get().to(me))
            .route("/auth/login", web::post().to(login))
            .route("/auth/signup", web::post().to(signup))
            .route("/auth/logout", web::post().to(logout))
            .route("/auth/update-password", web::post().to(update_password))
            .route("/user/analyses", web::get().to(analyses))
            .route("/user/plan/", web::get().to(plan_status))
            .route("/user/plan/activate", web::post().to(activate_plan))
            .route("/user/plan/cancel", web::post().to(cancel_plan));

        App::new().app_data(data.clone()).service(api)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    let base_url = Url::parse(&format!("http://{addr}/api/")).map_err(|err| err.to_string())?;
    Ok((base_url, handle))
}
