use std::sync::Arc;

use crate::domain::{Book, BookId, CatalogView, SortDirection, SortKey};
use crate::ports::{ApiError, BookstoreApi};

/// カタログビューモデル
///
/// 純粋なカタログ状態（CatalogView）と外部APIポートを束ねる。
/// 検索・ソート・ページングは同期的な純粋状態遷移、取得のみが非同期。
pub struct CatalogViewModel {
    api: Arc<dyn BookstoreApi>,
    view: CatalogView,
}

impl CatalogViewModel {
    pub fn new(api: Arc<dyn BookstoreApi>) -> Self {
        Self {
            api,
            view: CatalogView::new(),
        }
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    /// カタログを再取得して書籍集合を丸ごと置き換える
    ///
    /// 取得に失敗した場合は既存の状態を一切変えずエラーを返す。
    /// 再試行は呼び出し側（ユーザー操作）に委ねる。
    pub async fn refresh(&mut self) -> Result<usize, ApiError> {
        let books = self.api.list_books().await?;
        let count = books.len();
        self.view.set_books(books);
        tracing::debug!(count, "catalog refreshed");
        Ok(count)
    }

    pub fn search(&mut self, term: &str) {
        self.view.search(term);
    }

    pub fn sort(&mut self, key: SortKey, direction: SortDirection) {
        self.view.sort(key, direction);
    }

    pub fn load_more(&mut self) {
        self.view.load_more();
    }

    pub fn has_more(&self) -> bool {
        self.view.has_more()
    }

    pub fn displayed(&self) -> &[Book] {
        self.view.displayed()
    }

    pub fn book(&self, book_id: BookId) -> Option<&Book> {
        self.view.book(book_id)
    }
}
