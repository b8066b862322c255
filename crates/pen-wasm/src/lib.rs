#![forbid(unsafe_code)]

use std::sync::{LazyLock, RwLock};

use pen_core::Diagnostic;
use pen_interp::{DEFAULT_SCRIPT, RunSummary, Session, SessionConfig};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SessionInitConfig {
    while_iteration_limit: Option<usize>,
    max_block_depth: Option<usize>,
    default_graph: Option<String>,
}

/// Run result in the shape a browser host consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutput<'a> {
    success: usize,
    errors: usize,
    last_message: &'a str,
    diagnostics: &'a [Diagnostic],
    current_graph: &'a str,
}

impl<'a> RunOutput<'a> {
    fn new(summary: &'a RunSummary, session: &'a Session) -> Self {
        Self {
            success: summary.success,
            errors: summary.errors,
            last_message: &summary.last_message,
            diagnostics: &summary.diagnostics,
            current_graph: session.store().current_name(),
        }
    }
}

static SHARED_SESSION: LazyLock<RwLock<Session>> =
    LazyLock::new(|| RwLock::new(Session::default()));

fn with_shared_session<R>(f: impl FnOnce(&mut Session) -> R) -> R {
    match SHARED_SESSION.write() {
        Ok(mut guard) => f(&mut guard),
        Err(poisoned) => f(&mut poisoned.into_inner()),
    }
}

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

fn parse_js_value_or_default<T>(value: Option<JsValue>) -> Result<T, JsValue>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match value {
        None => Ok(T::default()),
        Some(raw) if raw.is_undefined() || raw.is_null() => Ok(T::default()),
        Some(raw) => {
            #[cfg(target_arch = "wasm32")]
            {
                serde_wasm_bindgen::from_value(raw)
                    .map_err(|err| js_error(format!("invalid config: {err}")))
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = raw;
                Ok(T::default())
            }
        }
    }
}

fn to_js_value<T>(value: &T) -> Result<JsValue, JsValue>
where
    T: Serialize,
{
    #[cfg(target_arch = "wasm32")]
    {
        serde_wasm_bindgen::to_value(value)
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        serde_json::to_string(value)
            .map(|json| JsValue::from_str(&json))
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
}

fn merge_session_config(
    base: &SessionConfig,
    overrides: &SessionInitConfig,
) -> Result<SessionConfig, String> {
    let mut merged = base.clone();
    if let Some(limit) = overrides.while_iteration_limit {
        merged.while_iteration_limit = limit;
    }
    if let Some(depth) = overrides.max_block_depth {
        if depth == 0 {
            return Err("maxBlockDepth must be at least 1".to_string());
        }
        merged.max_block_depth = depth;
    }
    if let Some(name) = overrides.default_graph.as_deref() {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(format!("invalid defaultGraph: {name:?}"));
        }
        merged.default_graph = name.to_string();
    }
    Ok(merged)
}

fn session_from_js(config: Option<JsValue>) -> Result<Session, JsValue> {
    let overrides: SessionInitConfig = parse_js_value_or_default(config)?;
    let config = merge_session_config(&SessionConfig::default(), &overrides).map_err(js_error)?;
    Ok(Session::with_config(config))
}

/// Replace the shared session with a fresh one built from `config`.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn init(config: Option<JsValue>) -> Result<(), JsValue> {
    let session = session_from_js(config)?;
    with_shared_session(|shared| *shared = session);
    Ok(())
}

/// Run script text against the shared session.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = run))]
pub fn run_js(source: &str) -> Result<JsValue, JsValue> {
    with_shared_session(|session| {
        let summary = session.run(source);
        to_js_value(&RunOutput::new(&summary, session))
    })
}

/// Current graph of the shared session, for drawing.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = snapshot))]
pub fn snapshot_js() -> Result<JsValue, JsValue> {
    with_shared_session(|session| to_js_value(&session.snapshot()))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = defaultScript))]
#[must_use]
pub fn default_script() -> String {
    DEFAULT_SCRIPT.to_string()
}

/// Independent interpreter session owned by the host.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Debug, Clone, Default)]
pub struct PenSession {
    inner: Session,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl PenSession {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(config: Option<JsValue>) -> Result<Self, JsValue> {
        Ok(Self {
            inner: session_from_js(config)?,
        })
    }

    pub fn run(&mut self, source: &str) -> Result<JsValue, JsValue> {
        let summary = self.inner.run(source);
        to_js_value(&RunOutput::new(&summary, &self.inner))
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.inner.snapshot())
    }

    /// Drop every graph and variable, keeping the session's limits.
    pub fn reset(&mut self) {
        self.inner = Session::with_config(self.inner.config().clone());
    }
}

impl PenSession {
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            inner: Session::with_config(config),
        }
    }

    pub fn run_summary(&mut self, source: &str) -> RunSummary {
        self.inner.run(source)
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.inner
    }
}
