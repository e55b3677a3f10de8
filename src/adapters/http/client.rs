use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Book, BookRecord, CustomerId, books_from_records};
use crate::ports::{
    ApiError, BookstoreApi, Credentials, Customer, OrderConfirmation, OrderRequest, OrderView,
    Result,
};

use super::types::{ErrorBody, SessionResponse};

/// ベースURLのデフォルト（開発環境の外部APIサーバー）
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// ベースURLを上書きする環境変数
pub const BASE_URL_ENV: &str = "BOOKSTORE_API_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTPアダプタの設定
///
/// エンドポイントは単一の設定可能なベースURLに集約する。
/// 相対パスと絶対URLの混在はここで排除される。
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// 環境変数から設定を組み立てる（未設定ならデフォルト）
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// BookstoreApiのHTTP実装
///
/// セッション認証はクッキーベースのため、クッキーストアを有効にした
/// 単一のクライアントを使い回す。
pub struct HttpBookstoreApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookstoreApi {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// 非成功レスポンスをApiErrorに変換する
///
/// ボディの`error`フィールドがあればそれを、なければ汎用文言を使う。
async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody { error: Some(msg) }) => msg,
        _ => format!("request failed with status {}", status),
    };
    ApiError::Api { status, message }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn decode(e: reqwest::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

#[async_trait]
impl BookstoreApi for HttpBookstoreApi {
    async fn current_session(&self) -> Result<Option<Customer>> {
        let response = self
            .client
            .get(self.url("/api/auth/session"))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let session: SessionResponse = response.json().await.map_err(decode)?;
        Ok(session.user)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Customer> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // ログインのレスポンスは成否のみ。顧客情報はセッションから引く。
        match self.current_session().await? {
            Some(customer) => {
                tracing::info!(customer_id = customer.customer_id.value(), "logged in");
                Ok(customer)
            }
            None => Err(ApiError::Decode(
                "login succeeded but session holds no user".to_string(),
            )),
        }
    }

    async fn logout(&self) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/auth/logout"))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        let response = self
            .client
            .get(self.url("/api/books"))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let records: Vec<BookRecord> = response.json().await.map_err(decode)?;
        let fetched = records.len();
        let books = books_from_records(records);
        if books.len() < fetched {
            tracing::warn!(
                dropped = fetched - books.len(),
                "dropped catalog records with missing required fields"
            );
        }
        tracing::debug!(count = books.len(), "fetched catalog");
        Ok(books)
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        let response = self
            .client
            .post(self.url("/api/orders/create"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let confirmation: OrderConfirmation = response.json().await.map_err(decode)?;
        tracing::info!(order_id = confirmation.order_id.value(), "order created");
        Ok(confirmation)
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<OrderView>> {
        let response = self
            .client
            .get(self.url(&format!("/api/orders/customer/{}", customer_id.value())))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response.json().await.map_err(decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let api = HttpBookstoreApi::new(HttpConfig::new("http://localhost:5000/")).unwrap();
        assert_eq!(api.url("/api/books"), "http://localhost:5000/api/books");
    }

    #[test]
    fn test_config_default_base_url() {
        let config = HttpConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
