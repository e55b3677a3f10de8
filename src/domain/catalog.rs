use std::cmp::Ordering;

use chrono::NaiveDate;

use super::{Book, BookId};

/// 一度に表示する書籍数のデフォルト
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// ソートキー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Author,
    Price,
    Date,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::Price => "price",
            SortKey::Date => "date",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortKey::Title),
            "author" => Ok(SortKey::Author),
            "price" => Ok(SortKey::Price),
            "date" => Ok(SortKey::Date),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

/// ソート方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// カタログビュー - 取得済み書籍集合と表示用の派生状態
///
/// 状態の構成：
/// - `books`: 取得した全書籍（在庫上限の唯一の情報源。再取得時に丸ごと置換）
/// - `filtered`: 検索・ソート適用後の派生列
/// - `displayed_count`: `filtered`のうち表示中の接頭辞の長さ（ページ単位で伸びる）
///
/// すべての操作は同期的な純粋状態遷移。ネットワークは関与しない。
#[derive(Debug, Clone)]
pub struct CatalogView {
    books: Vec<Book>,
    filtered: Vec<Book>,
    displayed_count: usize,
    search_term: String,
    sort_key: SortKey,
    sort_direction: SortDirection,
    page_size: usize,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            books: Vec::new(),
            filtered: Vec::new(),
            displayed_count: 0,
            search_term: String::new(),
            sort_key: SortKey::Title,
            sort_direction: SortDirection::Asc,
            page_size,
        }
    }

    /// 書籍集合を丸ごと置き換える
    ///
    /// カタログ再取得（購入成功後など）で呼ばれる。現在の検索語と
    /// ソート条件で派生状態を再計算し、1ページ目に戻る。
    pub fn set_books(&mut self, books: Vec<Book>) {
        self.books = books;
        self.recompute();
    }

    /// 検索語を設定する
    ///
    /// タイトル・著者・出版社のいずれかに部分一致（大文字小文字無視）
    /// すれば表示対象。空白のみの検索語は全件一致。1ページ目に戻る。
    pub fn search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.recompute();
    }

    /// ソートキーと方向を設定する
    ///
    /// 1ページ目に戻る。
    pub fn sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.sort_direction = direction;
        self.recompute();
    }

    /// 次の1ページ分を表示に追加する
    ///
    /// 残りページがなければ何もしない。
    pub fn load_more(&mut self) {
        self.displayed_count = (self.displayed_count + self.page_size).min(self.filtered.len());
    }

    /// まだ表示されていない書籍が残っているか
    pub fn has_more(&self) -> bool {
        self.displayed_count < self.filtered.len()
    }

    /// 現在表示中の書籍列（フィルタ・ソート済み列の接頭辞）
    pub fn displayed(&self) -> &[Book] {
        &self.filtered[..self.displayed_count]
    }

    /// フィルタ適用後の件数
    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    /// 取得済みの全書籍数
    pub fn total_count(&self) -> usize {
        self.books.len()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// 最新のカタログ状態から書籍を引く
    ///
    /// カート側の在庫上限チェックはカート行の古いコピーではなく
    /// 必ずこちらを参照する。
    pub fn book(&self, book_id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.book_id == book_id)
    }

    /// 書籍の在庫上限（カートに入れられる最大数量）
    pub fn stock_ceiling(&self, book_id: BookId) -> Option<u32> {
        self.book(book_id).map(|b| b.available_quantity)
    }

    /// フィルタ・ソートを再計算して1ページ目に戻す
    fn recompute(&mut self) {
        let term = self.search_term.trim().to_lowercase();

        self.filtered = if term.is_empty() {
            self.books.clone()
        } else {
            self.books
                .iter()
                .filter(|b| matches_term(b, &term))
                .cloned()
                .collect()
        };

        let key = self.sort_key;
        let direction = self.sort_direction;
        // Vec::sort_byは安定ソート。同値の並びは入力順を保つ。
        self.filtered.sort_by(|a, b| {
            let ordering = compare_by_key(a, b, key);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        self.displayed_count = self.page_size.min(self.filtered.len());
    }
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}

/// 検索語（小文字化済み）との部分一致判定
fn matches_term(book: &Book, term_lower: &str) -> bool {
    book.title.to_lowercase().contains(term_lower)
        || book.author.to_lowercase().contains(term_lower)
        || book.publisher.to_lowercase().contains(term_lower)
}

/// ソートキーごとの比較
///
/// - テキストキー：小文字化した値の比較
/// - 価格：数値比較（total_cmpでNaNも全順序に収める）
/// - 出版日：解釈した日付の比較。欠損・解釈不能は最古の日付として扱う
fn compare_by_key(a: &Book, b: &Book, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Date => {
            parse_publication_date(&a.publication_date)
                .cmp(&parse_publication_date(&b.publication_date))
        }
    }
}

/// 出版日文字列の解釈
///
/// `YYYY-MM-DD`形式、またはISO-8601タイムスタンプの日付部分を受け付ける。
/// それ以外（"Unknown Date"など）は1900-01-01にフォールバックする。
fn parse_publication_date(raw: &str) -> NaiveDate {
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date;
    }
    // ISO-8601タイムスタンプは日付部分のみ読む
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return date;
        }
    }
    earliest
}
