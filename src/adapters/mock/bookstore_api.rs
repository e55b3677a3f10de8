use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Book, CustomerId};
use crate::ports::{
    ApiError, BookstoreApi as BookstoreApiTrait, Credentials, Customer, OrderConfirmation,
    OrderRequest, OrderView, OrderedBook, Result,
};

struct MockState {
    books: Vec<Book>,
    customers: Vec<(Credentials, Customer)>,
    session: Option<Customer>,
    orders: Vec<OrderView>,
    next_order_id: u32,
    fail_next_order: Option<(u16, String)>,
}

/// BookstoreApiのモック実装
///
/// カタログ・顧客・注文ログをインメモリで保持し、状態を持ったテストを
/// サポートする。注文成功時はサーバーと同じように在庫を減らす。
/// 購入失敗の注入（ステータス + メッセージ）も可能。
pub struct BookstoreApi {
    state: Mutex<MockState>,
}

impl BookstoreApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                books: Vec::new(),
                customers: Vec::new(),
                session: None,
                orders: Vec::new(),
                next_order_id: 1,
                fail_next_order: None,
            }),
        }
    }

    /// テスト用にカタログを設定
    pub fn set_books(&self, books: Vec<Book>) {
        self.state.lock().unwrap().books = books;
    }

    /// テスト用に顧客を登録
    pub fn register_customer(&self, credentials: Credentials, customer: Customer) {
        self.state
            .lock()
            .unwrap()
            .customers
            .push((credentials, customer));
    }

    /// テスト用にログイン済みセッションを直接確立
    pub fn force_session(&self, customer: Customer) {
        self.state.lock().unwrap().session = Some(customer);
    }

    /// 次のcreate_order呼び出しを指定のステータスとメッセージで失敗させる
    pub fn fail_next_order(&self, status: u16, message: impl Into<String>) {
        self.state.lock().unwrap().fail_next_order = Some((status, message.into()));
    }

    /// 記録された注文数（検証用）
    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    /// 現在の在庫数（検証用）
    pub fn stock_of(&self, book_id: crate::domain::BookId) -> Option<u32> {
        self.state
            .lock()
            .unwrap()
            .books
            .iter()
            .find(|b| b.book_id == book_id)
            .map(|b| b.available_quantity)
    }
}

impl Default for BookstoreApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookstoreApiTrait for BookstoreApi {
    async fn current_session(&self) -> Result<Option<Customer>> {
        Ok(self.state.lock().unwrap().session.clone())
    }

    /// 登録済み顧客と資格情報を突き合わせる
    async fn login(&self, credentials: &Credentials) -> Result<Customer> {
        let mut state = self.state.lock().unwrap();
        let matched = state
            .customers
            .iter()
            .find(|(c, customer)| {
                (c.username == credentials.username || customer.email == credentials.username)
                    && c.password == credentials.password
            })
            .map(|(_, customer)| customer.clone());

        match matched {
            Some(customer) => {
                state.session = Some(customer.clone());
                Ok(customer)
            }
            None => Err(ApiError::Api {
                status: 401,
                message: "Invalid credentials".to_string(),
            }),
        }
    }

    async fn logout(&self) -> Result<()> {
        self.state.lock().unwrap().session = None;
        Ok(())
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.state.lock().unwrap().books.clone())
    }

    /// サーバーと同じ検証・副作用を再現する
    ///
    /// - セッションがなければ403
    /// - 存在しない書籍は404、在庫不足は400（メッセージ付き）
    /// - 成功時は在庫を減らし、注文ログに追記する
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        let mut state = self.state.lock().unwrap();

        if let Some((status, message)) = state.fail_next_order.take() {
            return Err(ApiError::Api { status, message });
        }

        if state.session.is_none() {
            return Err(ApiError::Api {
                status: 403,
                message: "Unauthorized - no user in session".to_string(),
            });
        }

        let mut total_price = 0.0;
        let mut ordered_books = Vec::new();
        for line in &request.books {
            let book = state
                .books
                .iter()
                .find(|b| b.book_id == line.book_id)
                .cloned()
                .ok_or_else(|| ApiError::Api {
                    status: 404,
                    message: format!("Book with ID {} not found", line.book_id.value()),
                })?;

            if book.available_quantity < line.quantity {
                return Err(ApiError::Api {
                    status: 400,
                    message: format!(
                        "Insufficient stock for \"{}\". Available: {}, Requested: {}",
                        book.title, book.available_quantity, line.quantity
                    ),
                });
            }

            total_price += book.price * f64::from(line.quantity);
            ordered_books.push(OrderedBook {
                book_id: book.book_id,
                title: book.title.clone(),
                author: book.author.clone(),
                price: book.price,
                publisher: book.publisher.clone(),
                publication_date: book.publication_date.clone(),
                quantity: line.quantity,
            });
        }

        // 全行の検証を通ってから在庫を減らす
        for line in &request.books {
            if let Some(book) = state.books.iter_mut().find(|b| b.book_id == line.book_id) {
                book.available_quantity -= line.quantity;
            }
        }

        let order_id = crate::domain::OrderId::new(state.next_order_id);
        state.next_order_id += 1;
        state.orders.push(OrderView {
            order_id,
            customer_id: request.customer_id,
            total_price,
            order_date: Utc::now().to_rfc3339(),
            books: ordered_books,
        });

        Ok(OrderConfirmation {
            order_id,
            total_price,
        })
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<OrderView>> {
        let state = self.state.lock().unwrap();
        let mut orders: Vec<OrderView> = state
            .orders
            .iter()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        // 新しい注文が先頭
        orders.sort_by(|a, b| b.order_id.cmp(&a.order_id));
        Ok(orders)
    }
}
