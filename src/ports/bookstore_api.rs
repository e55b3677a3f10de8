use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Book, BookId, CustomerId, OrderId};

pub type Result<T> = std::result::Result<T, ApiError>;

/// 外部APIとの境界で起きるエラー
///
/// 仕様上、次の3種を呼び出し側で区別できる必要がある：
/// - トランスポート障害（到達不能・タイムアウト）
/// - 非成功HTTPステータス（サーバーのエラーメッセージ付き）
/// - 解釈できないレスポンスボディ
///
/// 自動リトライはしない。再試行はユーザーの明示的な操作に委ねる。
#[derive(Debug, Error)]
pub enum ApiError {
    /// ネットワーク到達不能・タイムアウトなどのトランスポート障害
    #[error("network error: {0}")]
    Transport(String),

    /// 非成功ステータス。messageはレスポンスボディの`error`、
    /// なければアダプタが補った汎用文言
    #[error("{message}")]
    Api { status: u16, message: String },

    /// レスポンスボディが期待した形でない
    #[error("malformed response: {0}")]
    Decode(String),
}

/// 認証済み顧客（セッションサービスが返すアイデンティティ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "CustomerID")]
    pub customer_id: CustomerId,
    #[serde(rename = "CustomerName")]
    pub name: String,
    #[serde(rename = "CustomerEmail")]
    pub email: String,
}

/// ログイン資格情報
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// 注文作成リクエストの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "bookID")]
    pub book_id: BookId,
    pub quantity: u32,
}

/// 注文作成リクエスト（顧客ID + 書籍と数量の一覧）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(rename = "customerID")]
    pub customer_id: CustomerId,
    pub books: Vec<OrderLine>,
}

/// 注文作成成功時の確認情報
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderConfirmation {
    #[serde(rename = "orderID")]
    pub order_id: OrderId,
    #[serde(rename = "totalPrice")]
    pub total_price: f64,
}

/// 注文履歴の1注文に含まれる書籍（数量付き）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedBook {
    #[serde(rename = "BookID")]
    pub book_id: BookId,
    #[serde(rename = "BookTitle")]
    pub title: String,
    #[serde(rename = "AuthorName")]
    pub author: String,
    #[serde(rename = "BookPrice")]
    pub price: f64,
    #[serde(rename = "BookPublisher")]
    pub publisher: String,
    #[serde(rename = "BookPublicationDate")]
    pub publication_date: String,
    pub quantity: u32,
}

/// 注文履歴ビュー
///
/// 履歴表示に最適化された非正規化ビュー。サーバーが書籍詳細を
/// 展開済みの形で返す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(rename = "OrderID")]
    pub order_id: OrderId,
    #[serde(rename = "CustomerID")]
    pub customer_id: CustomerId,
    #[serde(rename = "OrderPrice")]
    pub total_price: f64,
    #[serde(rename = "OrderDate")]
    pub order_date: String,
    pub books: Vec<OrderedBook>,
}

/// 書店APIポート
///
/// プレゼンテーション層と外部の注文APIの境界を維持する。
/// リクエストの構築とレスポンスの成功/失敗の解釈のみが
/// このクライアントの責務であり、サーバー側の振る舞いは関知しない。
#[async_trait]
pub trait BookstoreApi: Send + Sync {
    /// 現在のセッションの認証済み顧客を取得する（未認証ならNone）
    async fn current_session(&self) -> Result<Option<Customer>>;

    /// 資格情報を交換してセッションを確立する
    async fn login(&self, credentials: &Credentials) -> Result<Customer>;

    /// セッションを無効化する
    async fn logout(&self) -> Result<()>;

    /// 現在の在庫数付きで全カタログを取得する
    ///
    /// 必須フィールドが欠けた不正なレコードは除外済みで返す。
    async fn list_books(&self) -> Result<Vec<Book>>;

    /// 注文を作成する
    ///
    /// 成功時は新しい注文IDを返す。在庫不足などはApiError::Apiとして
    /// サーバーのエラーメッセージ付きで返る。
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation>;

    /// 顧客の注文履歴を取得する
    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<OrderView>>;
}
