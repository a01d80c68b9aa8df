mod types;

use anyhow::{anyhow, ensure, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as AsyncClient, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use self::types::ErrorResponse;
use super::remote::{Remote, Select};
use crate::config::{ANON_KEY_ENV, ARCH, EXEC_NAME, URL_ENV, VERSION};

const REST_PATH: &str = "/rest/v1";
pub const AUTH_PATH: &str = "/auth/v1";

#[derive(Debug, Clone)]
pub struct HttpClient {
    pub client: AsyncClient,
    pub base_url: String,
    pub headers: HeaderMap,
    pub ua: String,
}

impl HttpClient {
    pub fn new(
        url: Option<String>,
        anon_key: Option<String>,
        token: Option<String>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert("accept", HeaderValue::from_static("application/json"));

        if let Some(ref anon_key) = anon_key {
            headers.insert("apikey", HeaderValue::from_str(anon_key)?);
        }

        // signed out requests run as the anonymous role
        if let Some(bearer) = token.or(anon_key) {
            headers.insert(
                "authorization",
                HeaderValue::from_str(&format!("Bearer {bearer}"))?,
            );
        }

        let ua = format!(
            "appdeck/{VERSION} on {} {ARCH}",
            sys_info::os_type().unwrap_or_else(|_| "unknown".to_string())
        );

        Ok(Self {
            client: AsyncClient::builder()
                .user_agent(ua.clone())
                .default_headers(headers.clone())
                .build()?,
            base_url: url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            headers,
            ua,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && self.headers.contains_key("apikey")
    }

    pub async fn handle_response<T>(&self, response: reqwest::Response) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if !status.is_success() {
            return self.handle_error(response, status).await;
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.text().await?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| anyhow!("Error while parsing response: {e}"))
    }

    async fn handle_error<T>(
        &self,
        response: reqwest::Response,
        status: StatusCode,
    ) -> Result<Option<T>> {
        let body = response.json::<ErrorResponse>().await;

        match body.map(ErrorResponse::message) {
            Ok(Some(message)) => Err(anyhow!("{message}")),
            Ok(None) => Err(anyhow!("Error: HTTP {status}")),
            Err(err) => {
                log::debug!("Error deserialize message: {:#?}", err);

                Err(anyhow!("Error: HTTP {status}"))
            }
        }
    }

    pub async fn request<T>(
        &self,
        method: &str,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
        prefer: Option<&str>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        ensure!(
            self.is_configured(),
            "No backend configured. Set `{URL_ENV}` and `{ANON_KEY_ENV}` or run `{EXEC_NAME} auth login --url <URL> --anon-key <KEY>` first."
        );

        let mut request = self
            .client
            .request(method.parse()?, format!("{}{}", self.base_url, path))
            .query(query);

        log::debug!("request: {} {} {:?}", method, path, query);

        if let Some(prefer) = prefer {
            request = request.header("prefer", prefer);
        }

        if let Some(body) = body {
            // show body in debug mode / when developing
            #[cfg(debug_assertions)]
            log::debug!("request body: {body}");

            request = request.json(&body);
        }

        let request = request.build()?;

        #[cfg(debug_assertions)]
        let now = tokio::time::Instant::now();

        let response = self.client.execute(request).await?;

        #[cfg(debug_assertions)]
        log::debug!("response in: {:#?}", now.elapsed());

        self.handle_response(response).await
    }

    fn table(table: &str) -> String {
        format!("{REST_PATH}/{table}")
    }
}

/// Unwraps the single row PostgREST returns with `return=representation`.
fn first_row(rows: Option<Value>) -> Result<Value> {
    match rows {
        Some(Value::Array(rows)) => rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No row was returned")),
        Some(row @ Value::Object(_)) => Ok(row),
        _ => Err(anyhow!("No row was returned")),
    }
}

#[async_trait]
impl Remote for HttpClient {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>> {
        Ok(self
            .request::<Vec<Value>>("GET", &Self::table(table), &query.to_query(), None, None)
            .await?
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let rows = self
            .request::<Value>(
                "POST",
                &Self::table(table),
                &[],
                Some(row),
                Some("return=representation"),
            )
            .await?;

        first_row(rows)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Value> {
        let rows = self
            .request::<Value>(
                "POST",
                &Self::table(table),
                &[("on_conflict".to_string(), on_conflict.to_string())],
                Some(row),
                Some("resolution=merge-duplicates,return=representation"),
            )
            .await?;

        first_row(rows)
    }

    async fn update(&self, table: &str, query: &Select, changes: Value) -> Result<Vec<Value>> {
        // only the filters apply to a PATCH
        let filters = query
            .to_query()
            .into_iter()
            .filter(|(key, _)| !matches!(key.as_str(), "select" | "order" | "limit"))
            .collect::<Vec<_>>();

        Ok(self
            .request::<Vec<Value>>(
                "PATCH",
                &Self::table(table),
                &filters,
                Some(changes),
                Some("return=representation"),
            )
            .await?
            .unwrap_or_default())
    }

    async fn delete(&self, table: &str, query: &Select) -> Result<()> {
        let filters = query
            .to_query()
            .into_iter()
            .filter(|(key, _)| key != "select")
            .collect::<Vec<_>>();

        self.request::<Value>("DELETE", &Self::table(table), &filters, None, None)
            .await?;

        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        self.request::<Value>(
            "POST",
            &format!("{REST_PATH}/rpc/{function}"),
            &[],
            Some(args),
            None,
        )
        .await?
        .ok_or_else(|| anyhow!("Function `{function}` returned nothing"))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> HttpClient {
        HttpClient::new(
            Some(server.uri()),
            Some("anon".to_string()),
            Some("token".to_string()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_select_sends_filters_and_keys() {
        let server = MockServer::start().await;
        let body = json!([{ "id": 1 }]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .and(query_param("user_id", "eq.u1"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let query = Select::new().eq("user_id", "u1").order("created_at", false);
        let rows = client(&server).select("projects", &query).await.unwrap();

        assert_eq!(rows, vec![json!({ "id": 1 })]);
    }

    #[tokio::test]
    async fn test_backend_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/projects"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint",
            })))
            .mount(&server)
            .await;

        let error = client(&server)
            .insert("projects", json!({ "name": "x" }))
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "duplicate key value violates unique constraint"
        );
    }

    #[tokio::test]
    async fn test_rpc_and_delete() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_user_stats"))
            .and(body_json(json!({ "p_user_id": "u1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "total_downloads": 10,
                "deployed_count": 1,
                "in_progress_count": 2,
            }])))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/projects"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let http = client(&server);

        let stats = http
            .rpc("get_user_stats", json!({ "p_user_id": "u1" }))
            .await
            .unwrap();
        assert_eq!(stats[0]["total_downloads"], 10);

        http.delete("projects", &Select::new().eq("id", 7))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let http = HttpClient::new(None, None, None).unwrap();

        assert!(!http.is_configured());
        assert!(http.select("projects", &Select::new()).await.is_err());
    }
}
