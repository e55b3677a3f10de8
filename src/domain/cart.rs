use serde::{Deserialize, Serialize};

use super::{AddItemError, Book, BookId, UpdateQuantityError};

/// カート行 - 1冊の書籍に対する購入希望数量
///
/// 不変条件：
/// - `quantity >= 1`（0以下の行は存在せず、削除で表現する）
/// - `quantity <= 書籍の在庫上限`（行が存在する間は常に成立）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub book: Book,
    pub quantity: u32,
}

impl CartLine {
    /// この行の小計（価格 × 数量）
    pub fn subtotal(&self) -> f64 {
        self.book.price * f64::from(self.quantity)
    }
}

/// カート - 書籍IDをキーとした挿入順のカート行集合
///
/// セッションごとに空で生成され、購入成功または明示的なクリアで空に戻る。
/// 変更操作はすべて純粋関数（下のadd_itemなど）で行い、
/// 拒否された操作は既存の状態を一切変えない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, book_id: BookId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.book.book_id == book_id)
    }

    /// 数量の合計
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// 合計金額（価格 × 数量の総和）。空のカートは0。
    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }
}

/// 純粋関数：カートに書籍を追加する
///
/// ビジネスルール：
/// - 数量0は拒否
/// - 数量が在庫上限を超える追加は拒否
/// - 既にカートにある書籍は既存行への加算を試みる。加算後の合計が
///   在庫上限を超える場合は操作全体を拒否する（部分適用しない）。
///   エラーには許容最大数を含め、ユーザーへ通知できるようにする。
///
/// 副作用なし。新しいCartを返す。
pub fn add_item(cart: &Cart, book: &Book, quantity: u32) -> Result<Cart, AddItemError> {
    if quantity == 0 {
        return Err(AddItemError::InvalidQuantity);
    }
    if quantity > book.available_quantity {
        return Err(AddItemError::ExceedsStock {
            max_allowed: book.available_quantity,
        });
    }

    let mut new_cart = cart.clone();
    match new_cart
        .lines
        .iter_mut()
        .find(|l| l.book.book_id == book.book_id)
    {
        Some(line) => {
            let combined = line.quantity.saturating_add(quantity);
            if combined > book.available_quantity {
                return Err(AddItemError::ExceedsStock {
                    max_allowed: book.available_quantity,
                });
            }
            line.quantity = combined;
            // 再取得後の最新の在庫情報で行の書籍を更新しておく
            line.book = book.clone();
        }
        None => new_cart.lines.push(CartLine {
            book: book.clone(),
            quantity,
        }),
    }

    Ok(new_cart)
}

/// 純粋関数：カート行の数量を置き換える
///
/// ビジネスルール：
/// - 0以下への更新は削除と等価
/// - `stock_ceiling`は最新のカタログ状態から引いた在庫上限
///   （カート行の古いコピーではない）。超える更新は拒否する。
/// - 更新は絶対値での置換（加算ではない）
/// - 対象の書籍がカートにない場合は何もしない
///
/// 副作用なし。新しいCartを返す。
pub fn update_quantity(
    cart: &Cart,
    book_id: BookId,
    new_quantity: u32,
    stock_ceiling: u32,
) -> Result<Cart, UpdateQuantityError> {
    if new_quantity == 0 {
        return Ok(remove_item(cart, book_id));
    }
    if new_quantity > stock_ceiling {
        return Err(UpdateQuantityError::ExceedsStock {
            max_allowed: stock_ceiling,
        });
    }

    let mut new_cart = cart.clone();
    if let Some(line) = new_cart
        .lines
        .iter_mut()
        .find(|l| l.book.book_id == book_id)
    {
        line.quantity = new_quantity;
    }
    Ok(new_cart)
}

/// 純粋関数：カートから行を削除する
///
/// 行が存在しなければ何もしない。
pub fn remove_item(cart: &Cart, book_id: BookId) -> Cart {
    let mut new_cart = cart.clone();
    new_cart.lines.retain(|l| l.book.book_id != book_id);
    new_cart
}
