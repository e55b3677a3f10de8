/// カート追加のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddItemError {
    /// 数量が1未満
    InvalidQuantity,
    /// 在庫上限を超える（`max_allowed`はこの書籍の許容最大数量）
    ExceedsStock { max_allowed: u32 },
}

/// カート数量更新のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateQuantityError {
    /// 最新のカタログ在庫を超える（`max_allowed`は現在の在庫上限）
    ExceedsStock { max_allowed: u32 },
}
