use std::sync::Arc;

use crate::ports::{ApiError, BookstoreApi, Credentials, Customer, OrderConfirmation};

use super::cart::CartViewModel;
use super::catalog::CatalogViewModel;
use super::errors::PurchaseError;
use super::orders::OrderHistoryViewModel;

/// セッション確認の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Authenticated,
    /// 未認証、またはセッション確認中のトランスポート障害。
    /// どちらもUIはログイン画面へ誘導する。
    Unauthenticated,
}

/// セッションストア - アプリケーション状態の唯一の所有者
///
/// 現在のユーザーと各ビューモデルを明示的に所有する。
/// グローバル可変状態は持たず、ビューは引数経由でここから状態を受け取る。
/// これによりビューモデルを描画から切り離して単体テストできる。
pub struct SessionStore {
    api: Arc<dyn BookstoreApi>,
    current_user: Option<Customer>,
    pub catalog: CatalogViewModel,
    pub cart: CartViewModel,
    pub orders: OrderHistoryViewModel,
}

impl SessionStore {
    pub fn new(api: Arc<dyn BookstoreApi>) -> Self {
        Self {
            catalog: CatalogViewModel::new(Arc::clone(&api)),
            cart: CartViewModel::new(Arc::clone(&api)),
            orders: OrderHistoryViewModel::new(Arc::clone(&api)),
            api,
            current_user: None,
        }
    }

    pub fn current_user(&self) -> Option<&Customer> {
        self.current_user.as_ref()
    }

    /// セッションを確認して現在のユーザーを更新する
    ///
    /// `{user: null}`もトランスポート障害も未認証として扱う
    /// （どちらのケースも元のUIはログイン画面に遷移する）。
    pub async fn check_session(&mut self) -> SessionStatus {
        match self.api.current_session().await {
            Ok(Some(customer)) => {
                tracing::debug!(customer_id = customer.customer_id.value(), "session active");
                self.current_user = Some(customer);
                SessionStatus::Authenticated
            }
            Ok(None) => {
                self.current_user = None;
                SessionStatus::Unauthenticated
            }
            Err(err) => {
                tracing::warn!(error = %err, "session check failed");
                self.current_user = None;
                SessionStatus::Unauthenticated
            }
        }
    }

    /// 資格情報を交換してログインする
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Customer, ApiError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let customer = self.api.login(&credentials).await?;
        self.current_user = Some(customer.clone());
        Ok(customer)
    }

    /// セッションを無効化する
    ///
    /// ローカルのユーザーとカートはAPI呼び出しの成否に関わらずクリアする。
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let result = self.api.logout().await;
        self.current_user = None;
        self.cart.clear();
        result
    }

    /// カートの内容で注文を作成する
    ///
    /// 成功時はカタログを再取得して減った在庫を反映する。
    /// 再取得の失敗は注文の成否に影響しない（注文は既に成立している）。
    pub async fn purchase(&mut self) -> Result<OrderConfirmation, PurchaseError> {
        let customer = self
            .current_user
            .clone()
            .ok_or(PurchaseError::NotAuthenticated)?;

        let confirmation = self.cart.purchase(&customer).await?;

        if let Err(err) = self.catalog.refresh().await {
            tracing::warn!(error = %err, "catalog refresh after purchase failed");
        }

        Ok(confirmation)
    }

    /// 現在のユーザーの注文履歴を再取得する
    pub async fn refresh_orders(&mut self) -> Result<usize, PurchaseError> {
        let customer = self
            .current_user
            .as_ref()
            .ok_or(PurchaseError::NotAuthenticated)?;
        let count = self.orders.refresh(customer.customer_id).await?;
        Ok(count)
    }
}
