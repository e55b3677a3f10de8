use std::sync::Arc;

use rusty_bookstore_client::adapters::mock::BookstoreApi as MockBookstoreApi;
use rusty_bookstore_client::application::{PurchaseError, SessionStatus, SessionStore};
use rusty_bookstore_client::domain::{Book, BookId, CustomerId};
use rusty_bookstore_client::ports::{ApiError, BookstoreApi, Credentials, Customer};

// ============================================================================
// テスト用ヘルパー
// ============================================================================

fn book(id: u32, title: &str, price: f64, qty: u32) -> Book {
    Book {
        book_id: BookId::new(id),
        title: title.to_string(),
        author: "Author".to_string(),
        price,
        publisher: "Press".to_string(),
        publication_date: "2020-01-01".to_string(),
        available_quantity: qty,
    }
}

fn customer() -> Customer {
    Customer {
        customer_id: CustomerId::new(7),
        name: "alice".to_string(),
        email: "alice@example.com".to_string(),
    }
}

fn credentials() -> Credentials {
    Credentials {
        username: "alice".to_string(),
        password: "secret".to_string(),
    }
}

/// ログイン済みのセッションストアとモックAPIを組み立てる
fn logged_in_store(books: Vec<Book>) -> (SessionStore, Arc<MockBookstoreApi>) {
    let api = Arc::new(MockBookstoreApi::new());
    api.set_books(books);
    api.register_customer(credentials(), customer());
    api.force_session(customer());
    (
        SessionStore::new(Arc::clone(&api) as Arc<dyn BookstoreApi>),
        api,
    )
}

// ============================================================================
// セッション管理のテスト
// ============================================================================

#[tokio::test]
async fn test_check_session_unauthenticated_without_login() {
    let api = Arc::new(MockBookstoreApi::new());
    let mut store = SessionStore::new(api);

    assert_eq!(store.check_session().await, SessionStatus::Unauthenticated);
    assert!(store.current_user().is_none());
}

#[tokio::test]
async fn test_login_establishes_session() {
    let api = Arc::new(MockBookstoreApi::new());
    api.register_customer(credentials(), customer());
    let mut store = SessionStore::new(Arc::clone(&api) as Arc<dyn BookstoreApi>);

    let logged_in = store.login("alice", "secret").await.unwrap();
    assert_eq!(logged_in.customer_id, CustomerId::new(7));
    assert_eq!(store.check_session().await, SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_login_by_email_works() {
    let api = Arc::new(MockBookstoreApi::new());
    api.register_customer(credentials(), customer());
    let mut store = SessionStore::new(api);

    assert!(store.login("alice@example.com", "secret").await.is_ok());
}

#[tokio::test]
async fn test_login_with_wrong_credentials_is_rejected() {
    let api = Arc::new(MockBookstoreApi::new());
    api.register_customer(credentials(), customer());
    let mut store = SessionStore::new(api);

    let err = store.login("alice", "wrong").await.unwrap_err();
    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("Expected ApiError::Api, got {:?}", other),
    }
    assert!(store.current_user().is_none());
}

#[tokio::test]
async fn test_logout_clears_user_and_cart() {
    let (mut store, _api) = logged_in_store(vec![book(1, "Dune", 10.0, 5)]);
    store.check_session().await;
    store.catalog.refresh().await.unwrap();

    let b = store.catalog.book(BookId::new(1)).unwrap().clone();
    store.cart.add_item(&b, 2).unwrap();
    assert_eq!(store.cart.total_items(), 2);

    store.logout().await.unwrap();
    assert!(store.current_user().is_none());
    assert!(store.cart.cart().is_empty());
    assert_eq!(store.check_session().await, SessionStatus::Unauthenticated);
}

// ============================================================================
// カタログ取得・検索・ページングのテスト
// ============================================================================

#[tokio::test]
async fn test_catalog_refresh_then_search_and_paginate() {
    let books: Vec<Book> = (1..=45)
        .map(|i| book(i, &format!("Rust Book {:02}", i), 5.0, 3))
        .collect();
    let (mut store, _api) = logged_in_store(books);

    let count = store.catalog.refresh().await.unwrap();
    assert_eq!(count, 45);

    // 45件一致、ページサイズ20：20 → 40 → 45
    store.catalog.search("rust");
    assert_eq!(store.catalog.displayed().len(), 20);
    assert!(store.catalog.has_more());

    store.catalog.load_more();
    assert_eq!(store.catalog.displayed().len(), 40);
    assert!(store.catalog.has_more());

    store.catalog.load_more();
    assert_eq!(store.catalog.displayed().len(), 45);
    assert!(!store.catalog.has_more());
}

// ============================================================================
// 購入フローのテスト
// ============================================================================

#[tokio::test]
async fn test_purchase_success_clears_cart_and_refreshes_stock() {
    let (mut store, api) = logged_in_store(vec![book(1, "Dune", 10.0, 5)]);
    store.check_session().await;
    store.catalog.refresh().await.unwrap();

    let b = store.catalog.book(BookId::new(1)).unwrap().clone();
    store.cart.add_item(&b, 2).unwrap();
    assert_eq!(store.cart.total_price(), 20.0);

    let confirmation = store.purchase().await.unwrap();
    assert_eq!(confirmation.order_id.value(), 1);
    assert_eq!(confirmation.total_price, 20.0);

    // カートは空に戻り、再取得で減った在庫が反映される
    assert!(store.cart.cart().is_empty());
    assert_eq!(store.catalog.view().stock_ceiling(BookId::new(1)), Some(3));
    assert_eq!(api.stock_of(BookId::new(1)), Some(3));
    assert_eq!(api.order_count(), 1);
}

#[tokio::test]
async fn test_purchase_failure_leaves_cart_unchanged() {
    let (mut store, api) = logged_in_store(vec![book(1, "Dune", 10.0, 2)]);
    store.check_session().await;
    store.catalog.refresh().await.unwrap();

    let b = store.catalog.book(BookId::new(1)).unwrap().clone();
    store.cart.add_item(&b, 2).unwrap();

    // サーバーが400と{error: "out of stock"}で失敗するケース
    api.fail_next_order(400, "out of stock");
    let err = store.purchase().await.unwrap_err();

    assert_eq!(err.user_message(), "out of stock");
    assert_eq!(store.cart.total_items(), 2);
    assert_eq!(api.order_count(), 0);
}

#[tokio::test]
async fn test_purchase_with_empty_cart_is_rejected_locally() {
    let (mut store, api) = logged_in_store(vec![book(1, "Dune", 10.0, 2)]);
    store.check_session().await;

    let err = store.purchase().await.unwrap_err();
    assert!(matches!(err, PurchaseError::EmptyCart));
    assert_eq!(err.user_message(), "Your cart is empty!");
    // ローカル検証の失敗はネットワークに届かない
    assert_eq!(api.order_count(), 0);
}

#[tokio::test]
async fn test_purchase_rejected_when_not_authenticated() {
    let api = Arc::new(MockBookstoreApi::new());
    api.set_books(vec![book(1, "Dune", 10.0, 2)]);
    let mut store = SessionStore::new(Arc::clone(&api) as Arc<dyn BookstoreApi>);
    store.catalog.refresh().await.unwrap();

    let b = store.catalog.book(BookId::new(1)).unwrap().clone();
    store.cart.add_item(&b, 1).unwrap();

    let err = store.purchase().await.unwrap_err();
    assert!(matches!(err, PurchaseError::NotAuthenticated));
    assert_eq!(store.cart.total_items(), 1);
}

#[tokio::test]
async fn test_server_side_insufficient_stock_keeps_cart() {
    let (mut store, api) = logged_in_store(vec![book(1, "Dune", 10.0, 3)]);
    store.check_session().await;
    store.catalog.refresh().await.unwrap();

    let b = store.catalog.book(BookId::new(1)).unwrap().clone();
    store.cart.add_item(&b, 3).unwrap();

    // クライアントの取得後に他の顧客が買って在庫が減ったケース
    api.set_books(vec![book(1, "Dune", 10.0, 1)]);

    let err = store.purchase().await.unwrap_err();
    assert!(err.user_message().contains("Insufficient stock"));
    assert_eq!(store.cart.total_items(), 3);
}

// ============================================================================
// カート更新とカタログ在庫の整合のテスト
// ============================================================================

#[tokio::test]
async fn test_update_quantity_checks_latest_catalog_stock() {
    let (mut store, api) = logged_in_store(vec![book(1, "Dune", 10.0, 5)]);
    store.catalog.refresh().await.unwrap();

    let b = store.catalog.book(BookId::new(1)).unwrap().clone();
    store.cart.add_item(&b, 2).unwrap();

    // 再取得で在庫が1に減る
    api.set_books(vec![book(1, "Dune", 10.0, 1)]);
    store.catalog.refresh().await.unwrap();

    let err = store
        .cart
        .update_quantity(store.catalog.view(), BookId::new(1), 4)
        .unwrap_err();
    assert_eq!(
        err,
        rusty_bookstore_client::application::CartError::ExceedsStock { max_allowed: 1 }
    );
    // 拒否された操作はカートを変えない
    assert_eq!(store.cart.total_items(), 2);

    // 0への更新は削除と等価
    store
        .cart
        .update_quantity(store.catalog.view(), BookId::new(1), 0)
        .unwrap();
    assert!(store.cart.cart().is_empty());
}

// ============================================================================
// 注文履歴のテスト
// ============================================================================

#[tokio::test]
async fn test_order_history_is_newest_first_and_searchable() {
    let (mut store, _api) = logged_in_store(vec![
        book(1, "Dune", 10.0, 5),
        book(2, "Foundation", 8.0, 5),
    ]);
    store.check_session().await;
    store.catalog.refresh().await.unwrap();

    let dune = store.catalog.book(BookId::new(1)).unwrap().clone();
    let foundation = store.catalog.book(BookId::new(2)).unwrap().clone();

    store.cart.add_item(&dune, 1).unwrap();
    store.purchase().await.unwrap();
    store.cart.add_item(&foundation, 2).unwrap();
    store.purchase().await.unwrap();

    let count = store.refresh_orders().await.unwrap();
    assert_eq!(count, 2);

    // 新しい注文が先頭
    let ids: Vec<u32> = store
        .orders
        .displayed()
        .iter()
        .map(|o| o.order_id.value())
        .collect();
    assert_eq!(ids, vec![2, 1]);

    // タイトルで絞り込み
    store.orders.search("dune");
    assert_eq!(store.orders.displayed().len(), 1);
    assert_eq!(store.orders.displayed()[0].order_id.value(), 1);

    // 空の検索語で全件に戻る
    store.orders.search("");
    assert_eq!(store.orders.displayed().len(), 2);
}

#[tokio::test]
async fn test_order_history_requires_authentication() {
    let api = Arc::new(MockBookstoreApi::new());
    let mut store = SessionStore::new(api);

    let err = store.refresh_orders().await.unwrap_err();
    assert!(matches!(err, PurchaseError::NotAuthenticated));
}
