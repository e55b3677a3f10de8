use serde::Deserialize;

use crate::ports::Customer;

/// GET /api/auth/session のレスポンス
///
/// 未認証でも200で`{"user": null}`が返る。
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub user: Option<Customer>,
}

/// 非成功レスポンスのボディ
///
/// サーバーはエラー時に`{"error": "..."}`を返す規約だが、
/// 常に守られるとは限らないためOptionで受ける。
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}
