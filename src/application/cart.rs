use std::sync::Arc;

use crate::domain::{self, Book, BookId, Cart, CatalogView};
use crate::ports::{BookstoreApi, Customer, OrderConfirmation, OrderLine, OrderRequest};

use super::errors::{CartError, PurchaseError};

/// 注文送信の状態機械
///
/// `Idle → Submitting → Idle`（成功でも失敗でもIdleに戻る）。
/// 同時に送信できるのは1件のみで、Submitting中の購入操作は拒否される。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

/// カートビューモデル
///
/// カート状態と送信状態機械を持ち、変更はすべてドメインの純粋関数に
/// 委譲する。拒否された操作はカートを変更しない。
pub struct CartViewModel {
    api: Arc<dyn BookstoreApi>,
    cart: Cart,
    submission: SubmissionState,
}

impl CartViewModel {
    pub fn new(api: Arc<dyn BookstoreApi>) -> Self {
        Self {
            api,
            cart: Cart::new(),
            submission: SubmissionState::Idle,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn total_price(&self) -> f64 {
        self.cart.total_price()
    }

    pub fn total_items(&self) -> u32 {
        self.cart.total_items()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == SubmissionState::Submitting
    }

    /// 書籍をカートに追加する
    ///
    /// 在庫0の書籍は常に拒否される。既存行への加算が在庫上限を超える
    /// 場合も操作全体が拒否され、エラーに許容最大数が入る。
    pub fn add_item(&mut self, book: &Book, quantity: u32) -> Result<(), CartError> {
        self.cart = domain::cart::add_item(&self.cart, book, quantity)?;
        Ok(())
    }

    /// カート行の数量を絶対値で置き換える
    ///
    /// 在庫上限は渡されたカート行ではなく最新のカタログ状態から引く。
    /// 0への更新は削除と等価で、書籍がカタログから消えていても成立する。
    pub fn update_quantity(
        &mut self,
        catalog: &CatalogView,
        book_id: BookId,
        new_quantity: u32,
    ) -> Result<(), CartError> {
        if new_quantity == 0 {
            self.remove_item(book_id);
            return Ok(());
        }
        let ceiling = catalog
            .stock_ceiling(book_id)
            .ok_or(CartError::UnknownBook)?;
        self.cart = domain::cart::update_quantity(&self.cart, book_id, new_quantity, ceiling)?;
        Ok(())
    }

    pub fn remove_item(&mut self, book_id: BookId) {
        self.cart = domain::cart::remove_item(&self.cart, book_id);
    }

    /// カートを明示的に空にする
    pub fn clear(&mut self) {
        self.cart = Cart::new();
    }

    /// 注文を送信する
    ///
    /// - 空のカート、送信中の再送信はローカルで即座に拒否
    /// - 成功：カートを空にし、確認情報（注文ID + 合計）を返す
    /// - 失敗：カートは無傷のまま、エラーを返す。自動リトライはしない
    pub async fn purchase(
        &mut self,
        customer: &Customer,
    ) -> Result<OrderConfirmation, PurchaseError> {
        if self.is_submitting() {
            return Err(PurchaseError::SubmissionInFlight);
        }
        if self.cart.is_empty() {
            return Err(PurchaseError::EmptyCart);
        }

        let request = OrderRequest {
            customer_id: customer.customer_id,
            books: self
                .cart
                .lines()
                .iter()
                .map(|line| OrderLine {
                    book_id: line.book.book_id,
                    quantity: line.quantity,
                })
                .collect(),
        };

        self.submission = SubmissionState::Submitting;
        let result = self.api.create_order(&request).await;
        self.submission = SubmissionState::Idle;

        match result {
            Ok(confirmation) => {
                tracing::info!(
                    order_id = confirmation.order_id.value(),
                    total = confirmation.total_price,
                    "purchase confirmed"
                );
                self.cart = Cart::new();
                Ok(confirmation)
            }
            Err(err) => {
                tracing::warn!(error = %err, "purchase failed, cart left unchanged");
                Err(PurchaseError::from(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::BookstoreApi as MockBookstoreApi;
    use crate::domain::CustomerId;

    fn book(id: u32, price: f64, qty: u32) -> Book {
        Book {
            book_id: BookId::new(id),
            title: format!("Book {}", id),
            author: "Author".to_string(),
            price,
            publisher: "Press".to_string(),
            publication_date: "2020-01-01".to_string(),
            available_quantity: qty,
        }
    }

    fn customer() -> Customer {
        Customer {
            customer_id: CustomerId::new(1),
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submission_returns_to_idle_after_success() {
        let api = Arc::new(MockBookstoreApi::new());
        let b = book(1, 10.0, 5);
        api.set_books(vec![b.clone()]);
        api.force_session(customer());

        let mut vm = CartViewModel::new(Arc::clone(&api) as Arc<dyn BookstoreApi>);
        vm.add_item(&b, 2).unwrap();

        let confirmation = vm.purchase(&customer()).await.unwrap();
        assert_eq!(confirmation.total_price, 20.0);
        assert!(!vm.is_submitting());
        assert!(vm.cart().is_empty());
    }

    #[tokio::test]
    async fn test_submission_returns_to_idle_after_failure() {
        let api = Arc::new(MockBookstoreApi::new());
        let b = book(1, 10.0, 5);
        api.set_books(vec![b.clone()]);
        api.force_session(customer());
        api.fail_next_order(500, "internal error");

        let mut vm = CartViewModel::new(Arc::clone(&api) as Arc<dyn BookstoreApi>);
        vm.add_item(&b, 2).unwrap();

        let err = vm.purchase(&customer()).await.unwrap_err();
        assert_eq!(err.user_message(), "internal error");
        assert!(!vm.is_submitting());
        // 失敗した注文はカートを変えない
        assert_eq!(vm.total_items(), 2);
    }
}
