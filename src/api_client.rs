// src/api_client.rs

//! Cliente HTTP fino para consumir a API (app, scripts e testes de ponta a ponta).

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use reqwest::{Method, header};
use serde_json::Value;
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const DEFAULT_ERROR_MESSAGE: &str = "Erro na requisição";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Falha de rede: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resposta inválida: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Falha no armazenamento local: {0}")]
    Storage(#[from] std::io::Error),
}

/// Armazenamento persistente de chave/valor (guarda o JWT entre execuções).
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
        Ok(())
    }
}

/// Guarda as chaves num arquivo JSON (`{"token": "..."}`).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> HashMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut values = self.load();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut values = self.load();
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

pub enum RequestBody {
    Json(Value),
    Multipart(reqwest::multipart::Form),
}

pub struct RequestOptions {
    pub method: Method,
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::GET, body: None }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self { method: Method::DELETE, body: None }
    }

    pub fn post(body: Value) -> Self {
        Self { method: Method::POST, body: Some(RequestBody::Json(body)) }
    }

    pub fn put(body: Value) -> Self {
        Self { method: Method::PUT, body: Some(RequestBody::Json(body)) }
    }

    pub fn multipart(method: Method, form: reqwest::multipart::Form) -> Self {
        Self { method, body: Some(RequestBody::Multipart(form)) }
    }
}

/// Extrai a mensagem de erro do corpo: `error`, depois `message`, senão a padrão.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "message"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

// Corpo vazio (204, DELETE...) vira `null`
pub fn parse_body(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    pub fn save_token(&self, token: &str) -> Result<(), ClientError> {
        self.storage.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), ClientError> {
        self.storage.remove(TOKEN_KEY)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Monta a requisição com o bearer salvo e o corpo adequado.
    pub fn prepare(&self, endpoint: &str, options: RequestOptions) -> Result<reqwest::Request, ClientError> {
        let mut builder = self.http.request(options.method, self.url(endpoint));

        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }

        builder = match options.body {
            // `.json()` já define o Content-Type
            Some(RequestBody::Json(body)) => builder.json(&body),
            // O boundary do Content-Type vem do próprio Form
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            None => builder.header(header::ACCEPT, "application/json"),
        };

        Ok(builder.build()?)
    }

    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ClientError> {
        let request = self.prepare(endpoint, options)?;
        tracing::debug!("➡️ {} {}", request.method(), request.url());

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Api { status: status.as_u16(), message: error_message(&body) });
        }
        parse_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_with_token(token: Option<&str>) -> ApiClient {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(token) = token {
            storage.set(TOKEN_KEY, token).unwrap();
        }
        ApiClient::new("http://localhost:3000/api/", storage)
    }

    #[test]
    fn error_message_prefers_error_then_message() {
        assert_eq!(error_message(r#"{"error": "Acesso negado a este recurso."}"#), "Acesso negado a este recurso.");
        assert_eq!(error_message(r#"{"message": "Falhou"}"#), "Falhou");
        assert_eq!(error_message("<html>502</html>"), DEFAULT_ERROR_MESSAGE);
        assert_eq!(error_message(r#"{"error": 42}"#), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body("").unwrap(), Value::Null);
        assert_eq!(parse_body("  \n").unwrap(), Value::Null);
        assert_eq!(parse_body(r#"{"ok": true}"#).unwrap(), json!({ "ok": true }));
    }

    #[test]
    fn stored_token_becomes_bearer_header() {
        let client = client_with_token(Some("abc.def.ghi"));
        let request = client.prepare("/clients", RequestOptions::get()).unwrap();

        assert_eq!(request.url().as_str(), "http://localhost:3000/api/clients");
        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer abc.def.ghi");
    }

    #[test]
    fn no_token_means_no_authorization_header() {
        let client = client_with_token(None);
        let request = client.prepare("login", RequestOptions::post(json!({ "email": "a@b.com" }))).unwrap();

        assert!(request.headers().get(header::AUTHORIZATION).is_none());
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn multipart_keeps_its_boundary() {
        let client = client_with_token(Some("t"));
        let form = reqwest::multipart::Form::new().text("descricao", "Foto do serviço");
        let request = client.prepare("uploads", RequestOptions::multipart(Method::POST, form)).unwrap();

        let content_type = request.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn file_storage_survives_a_new_instance() {
        let path = std::env::temp_dir().join(format!("gestao-sessao-{}.json", uuid::Uuid::new_v4()));

        FileStorage::new(&path).set(TOKEN_KEY, "persistido").unwrap();
        assert_eq!(FileStorage::new(&path).get(TOKEN_KEY).as_deref(), Some("persistido"));

        FileStorage::new(&path).remove(TOKEN_KEY).unwrap();
        assert!(FileStorage::new(&path).get(TOKEN_KEY).is_none());

        let _ = fs::remove_file(&path);
    }
}
