use std::sync::Arc;

use crate::domain::CustomerId;
use crate::ports::{ApiError, BookstoreApi, OrderView};

/// 注文履歴ビューモデル
///
/// 顧客の全注文を取得して新しい順（注文ID降順）に保持し、
/// クライアント側の検索フィルタを提供する。
pub struct OrderHistoryViewModel {
    api: Arc<dyn BookstoreApi>,
    orders: Vec<OrderView>,
    filtered: Vec<OrderView>,
    search_term: String,
}

impl OrderHistoryViewModel {
    pub fn new(api: Arc<dyn BookstoreApi>) -> Self {
        Self {
            api,
            orders: Vec::new(),
            filtered: Vec::new(),
            search_term: String::new(),
        }
    }

    /// 注文履歴を再取得する
    ///
    /// 取得に失敗した場合は既存の状態を変えない。
    pub async fn refresh(&mut self, customer_id: CustomerId) -> Result<usize, ApiError> {
        let mut orders = self.api.orders_for_customer(customer_id).await?;
        // サーバーの並びに依存せず、クライアント側でも新しい順を保証する
        orders.sort_by(|a, b| b.order_id.cmp(&a.order_id));
        let count = orders.len();
        self.orders = orders;
        self.recompute();
        tracing::debug!(count, "order history refreshed");
        Ok(count)
    }

    /// 検索語を設定する
    ///
    /// 注文ID・書籍タイトル・著者（大文字小文字無視）・注文日の
    /// いずれかに部分一致すれば表示対象。空の検索語は全件。
    pub fn search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.recompute();
    }

    pub fn displayed(&self) -> &[OrderView] {
        &self.filtered
    }

    pub fn total_count(&self) -> usize {
        self.orders.len()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    fn recompute(&mut self) {
        let raw = self.search_term.trim();
        if raw.is_empty() {
            self.filtered = self.orders.clone();
            return;
        }
        let term_lower = raw.to_lowercase();
        self.filtered = self
            .orders
            .iter()
            .filter(|o| matches_order(o, raw, &term_lower))
            .cloned()
            .collect();
    }
}

fn matches_order(order: &OrderView, raw_term: &str, term_lower: &str) -> bool {
    order.order_id.value().to_string().contains(raw_term)
        || order.order_date.contains(raw_term)
        || order.books.iter().any(|b| {
            b.title.to_lowercase().contains(term_lower)
                || b.author.to_lowercase().contains(term_lower)
        })
}
