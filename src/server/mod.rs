//! Local launcher server.
//!
//! Serves the most recently exported catalog for browsing, embeds a chosen
//! game's demo URL, and tracks a synthetic "virtual balance". The balance
//! is exposed at a stable DOM location (`<span id="virtual-balance">`) and
//! over `GET/POST /api/balance` so external overlay scripts can read and
//! update it; any site-specific DOM patching stays outside this crate.
//!
//! Reads exported files only; never writes them. One interactive user is
//! the expected load.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::types::ids::GameId;
use crate::error::Result;
use crate::export;
use crate::site::types::GameRecord;

/// Default virtual balance shown before any update.
pub const DEFAULT_BALANCE: f64 = 5000.0;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory exported files are read from.
    pub data_dir: PathBuf,
}

struct AppState {
    data_dir: PathBuf,
    balance: Mutex<f64>,
}

impl AppState {
    /// Most recently modified export in the data directory, if any.
    fn latest_export(&self) -> Option<PathBuf> {
        ["games.json", "games.csv"]
            .iter()
            .map(|name| self.data_dir.join(name))
            .filter(|p| p.is_file())
            .max_by_key(|p| {
                p.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(std::time::UNIX_EPOCH)
            })
    }

    fn load_records(&self) -> Vec<GameRecord> {
        let Some(path) = self.latest_export() else {
            warn!(dir = %self.data_dir.display(), "no exported games file found");
            return Vec::new();
        };
        match export::read_records(&path) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read exported games");
                Vec::new()
            }
        }
    }

    fn balance(&self) -> f64 {
        // A handler panicking mid-update must not take the launcher down.
        *self.balance.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Case-insensitive substring filter on name and provider.
pub fn filter_games(records: &[GameRecord], query: &str) -> Vec<GameRecord> {
    if query.is_empty() {
        return records.to_vec();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r.provider.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const BALANCE_WIDGET: &str = r#"<div class="balance">Virtual balance: <span id="virtual-balance">--</span>
<input id="balance-input" type="number" step="0.01" style="width:6em">
<button onclick="setBalance()">set</button>
<script>
  async function refreshBalance() {
    const res = await fetch('/api/balance');
    const body = await res.json();
    document.getElementById('virtual-balance').textContent = body.balance.toFixed(2);
  }
  async function setBalance() {
    const value = parseFloat(document.getElementById('balance-input').value);
    if (isNaN(value)) return;
    await fetch('/api/balance', {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify({balance: value}),
    });
    refreshBalance();
  }
  refreshBalance();
  setInterval(refreshBalance, 2000);
</script>
</div>"#;

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let count = state.load_records().len();
    Html(format!(
        r#"<!doctype html><html><head><title>gamedex launcher</title></head><body>
<h1>gamedex launcher</h1>
{BALANCE_WIDGET}
<p>{count} games in the current export.</p>
<form action="/games" method="get">
  <input name="q" placeholder="filter by name or provider">
  <button type="submit">Browse games</button>
</form>
<form action="/launch" method="get">
  <input name="id" placeholder="game id">
  <button type="submit">Launch demo</button>
</form>
</body></html>"#
    ))
}

#[derive(Debug, Deserialize)]
struct GamesQuery {
    #[serde(default)]
    q: String,
}

async fn games_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GamesQuery>,
) -> Html<String> {
    let records = filter_games(&state.load_records(), &params.q);
    let mut rows = String::new();
    for r in &records {
        let launch = match &r.demo_url {
            Some(_) => format!("<a href=\"/launch?id={}\">demo</a>", r.id),
            None => "-".to_string(),
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            r.id,
            html_escape(&r.name),
            html_escape(&r.provider),
            html_escape(&r.category_name),
            launch,
        ));
    }
    Html(format!(
        r#"<!doctype html><html><head><title>games</title></head><body>
<h1>Games ({count})</h1>
{BALANCE_WIDGET}
<p><a href="/">back</a></p>
<table border="1"><tr><th>id</th><th>name</th><th>provider</th><th>category</th><th></th></tr>
{rows}</table>
</body></html>"#,
        count = records.len(),
    ))
}

async fn games_json(State(state): State<Arc<AppState>>) -> Json<Vec<GameRecord>> {
    Json(state.load_records())
}

#[derive(Debug, Deserialize)]
struct LaunchQuery {
    id: u64,
}

async fn launch_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LaunchQuery>,
) -> Response {
    let id = GameId::new(params.id);
    let records = state.load_records();
    let Some(record) = records.iter().find(|r| r.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            format!("game {id} not found in exported data"),
        )
            .into_response();
    };
    let Some(demo_url) = &record.demo_url else {
        return (
            StatusCode::NOT_FOUND,
            format!("game {id} has no demo URL"),
        )
            .into_response();
    };
    Html(format!(
        r#"<!doctype html><html><head><title>{name}</title>
<style>body{{margin:0}} .bar{{padding:4px 8px;font-family:sans-serif}} iframe{{border:0;width:100vw;height:94vh}}</style>
</head><body>
<div class="bar">{name} - {provider} | {BALANCE_WIDGET} | <a href="/games">back</a></div>
<iframe src="{url}" allow="fullscreen"></iframe>
</body></html>"#,
        name = html_escape(&record.name),
        provider = html_escape(&record.provider),
        url = html_escape(demo_url),
    ))
    .into_response()
}

#[derive(Debug, Serialize, Deserialize)]
struct BalanceBody {
    balance: f64,
}

async fn get_balance(State(state): State<Arc<AppState>>) -> Json<BalanceBody> {
    Json(BalanceBody {
        balance: state.balance(),
    })
}

async fn set_balance(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BalanceBody>,
) -> Json<BalanceBody> {
    *state.balance.lock().unwrap_or_else(|e| e.into_inner()) = body.balance;
    info!(balance = body.balance, "virtual balance updated");
    Json(body)
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/games", get(games_page))
        .route("/api/games", get(games_json))
        .route("/launch", get(launch_page))
        .route("/api/balance", get(get_balance).post(set_balance))
        .with_state(state)
}

/// Run the launcher server, optionally opening a browser on one game.
pub async fn run(config: ServerConfig, open_game: Option<GameId>) -> Result<()> {
    let state = Arc::new(AppState {
        data_dir: config.data_dir.clone(),
        balance: Mutex::new(DEFAULT_BALANCE),
    });
    let app = router(state);

    let listener = TcpListener::bind(("127.0.0.1", config.port)).await?;
    let addr = listener.local_addr()?;
    info!(addr = %addr, dir = %config.data_dir.display(), "launcher listening");
    println!("Launcher running at http://{addr}/");

    if let Some(id) = open_game {
        open_in_browser(&format!("http://{addr}/launch?id={id}"));
    }

    axum::serve(listener, app).await?;
    Ok(())
}

/// Best-effort browser open via xdg-open.
pub fn open_in_browser(url: &str) {
    if std::process::Command::new("xdg-open")
        .arg(url)
        .spawn()
        .is_err()
    {
        warn!(url = %url, "xdg-open not available; open the URL manually");
    }
}

/// Default data directory when none is given: the current directory, or the
/// user cache dir as a fallback for `--launch` shortcuts.
pub fn default_data_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| {
        dirs::cache_dir()
            .map(|d| d.join("gamedex"))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}
