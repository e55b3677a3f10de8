use serde::{Deserialize, Serialize};

use super::BookId;

/// 省略された出版社のデフォルト値（外部APIの慣習に合わせる）
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";

/// 省略された出版日のデフォルト値（外部APIの慣習に合わせる）
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// 書籍 - カタログAPIから取得する読み取り専用データ
///
/// `available_quantity`がカート数量の上限（在庫上限）となる。
/// 出版日は外部データが不揃いなため文字列のまま保持し、
/// ソート時にのみ解釈する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "BookID")]
    pub book_id: BookId,
    #[serde(rename = "BookTitle")]
    pub title: String,
    #[serde(rename = "AuthorName")]
    pub author: String,
    #[serde(rename = "BookPrice")]
    pub price: f64,
    #[serde(rename = "BookPublisher")]
    pub publisher: String,
    #[serde(rename = "BookPublicationDate")]
    pub publication_date: String,
    #[serde(rename = "BookQuantity")]
    pub available_quantity: u32,
}

/// カタログAPIの生レコード
///
/// 外部データは必須フィールドが欠けていることがあるため、
/// すべてOptionで受けてから`Book::from_record`で検証する。
#[derive(Debug, Clone, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "BookID")]
    pub book_id: Option<u32>,
    #[serde(rename = "BookTitle")]
    pub title: Option<String>,
    #[serde(rename = "AuthorName")]
    pub author: Option<String>,
    #[serde(rename = "BookPrice")]
    pub price: Option<f64>,
    #[serde(rename = "BookPublisher")]
    pub publisher: Option<String>,
    #[serde(rename = "BookPublicationDate")]
    pub publication_date: Option<String>,
    #[serde(rename = "BookQuantity")]
    pub available_quantity: Option<u32>,
}

impl Book {
    /// 生レコードを検証して書籍に変換する
    ///
    /// ビジネスルール：
    /// - ID・タイトル・著者・価格・在庫数のいずれかが欠けたレコードは
    ///   クラッシュさせず除外する（Noneを返す）
    /// - タイトル・著者は空文字列も欠損とみなす
    /// - 出版社・出版日は任意項目であり、欠損時はデフォルト値を補う
    pub fn from_record(record: BookRecord) -> Option<Self> {
        let book_id = record.book_id?;
        let title = record.title.filter(|t| !t.is_empty())?;
        let author = record.author.filter(|a| !a.is_empty())?;
        let price = record.price?;
        let available_quantity = record.available_quantity?;

        Some(Self {
            book_id: BookId::new(book_id),
            title,
            author,
            price,
            publisher: record
                .publisher
                .unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string()),
            publication_date: record
                .publication_date
                .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            available_quantity,
        })
    }
}

/// 生レコード列から不正なものを除外して書籍列を構築する純粋関数
pub fn books_from_records(records: Vec<BookRecord>) -> Vec<Book> {
    records.into_iter().filter_map(Book::from_record).collect()
}
