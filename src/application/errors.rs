use thiserror::Error;

use crate::domain::{AddItemError, UpdateQuantityError};
use crate::ports::ApiError;

/// カート操作のエラー
///
/// ローカル検証の失敗。同期的に即座に返り、ネットワークには届かない。
/// 拒否された操作はデータモデルに対して常に無変更（no-op）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// 数量が1未満
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// 在庫上限を超える（ユーザーへ許容最大数を通知する）
    #[error("cannot add more than {max_allowed} copies")]
    ExceedsStock { max_allowed: u32 },

    /// 最新のカタログに存在しない書籍
    #[error("book is not in the catalog")]
    UnknownBook,
}

impl From<AddItemError> for CartError {
    fn from(err: AddItemError) -> Self {
        match err {
            AddItemError::InvalidQuantity => CartError::InvalidQuantity,
            AddItemError::ExceedsStock { max_allowed } => CartError::ExceedsStock { max_allowed },
        }
    }
}

impl From<UpdateQuantityError> for CartError {
    fn from(err: UpdateQuantityError) -> Self {
        match err {
            UpdateQuantityError::ExceedsStock { max_allowed } => {
                CartError::ExceedsStock { max_allowed }
            }
        }
    }
}

/// 購入処理のエラー
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// カートが空
    #[error("Your cart is empty!")]
    EmptyCart,

    /// 既に送信中（同時に1件しか送信できない）
    #[error("an order submission is already in progress")]
    SubmissionInFlight,

    /// 未ログイン
    #[error("you must be logged in to purchase")]
    NotAuthenticated,

    /// 外部APIのエラー（非成功ステータスまたはトランスポート障害）
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PurchaseError {
    /// UIに表示する文言
    ///
    /// サーバーがエラーメッセージを返していればそれを、
    /// トランスポート障害などは汎用の文言を使う。
    pub fn user_message(&self) -> String {
        match self {
            PurchaseError::Api(ApiError::Api { message, .. }) => message.clone(),
            PurchaseError::Api(_) => "Failed to create order. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}
