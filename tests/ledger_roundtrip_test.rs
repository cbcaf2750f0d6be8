use patrimoine_core::accounts::{AccountRepository, NewAccount};
use patrimoine_core::orders::{NewOrder, OrderRepository};
use rust_decimal_macros::dec;

mod common;

#[test]
fn account_envelopes_and_orders_round_trip() {
    let (pool, _dir) = common::setup_pool();
    let account_repository = AccountRepository::new(pool.clone());
    let order_repository = OrderRepository::new(pool.clone());

    // Create an account holding a PEA and a CTO envelope
    let created = account_repository
        .create(NewAccount {
            name: "Boursorama".to_string(),
            account_type_ids: vec!["pea".to_string(), "cto".to_string()],
        })
        .unwrap();
    assert_eq!(created.types.len(), 2);

    // Fund the PEA envelope
    account_repository
        .update_envelope_cash(&created.account.id, "pea", dec!(500))
        .unwrap();

    // Record two buys and a sell
    let buy = |symbol: &str, quantity, price| NewOrder {
        account_id: created.account.id.clone(),
        account_type_id: "pea".to_string(),
        symbol: symbol.to_string(),
        side: "buy".to_string(),
        quantity,
        price,
        currency: None,
        order_date: None,
    };
    order_repository.create(buy(" air.pa ", dec!(10), dec!(100))).unwrap();
    order_repository.create(buy("AIR.PA", dec!(5), dec!(120))).unwrap();
    order_repository
        .create(NewOrder {
            side: "sell".to_string(),
            ..buy("AIR.PA", dec!(3), dec!(130))
        })
        .unwrap();

    // Read back the shape the valuation engine consumes
    let holdings = account_repository
        .get_accounts_with_holdings(Some(&created.account.id))
        .unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].envelopes.len(), 2);

    let pea = holdings[0]
        .envelopes
        .iter()
        .find(|e| e.envelope.account_type_id == "pea")
        .unwrap();
    assert_eq!(pea.envelope.cash, dec!(500));
    assert_eq!(pea.orders.len(), 3);
    // symbols are stored normalized
    assert!(pea.orders.iter().all(|o| o.symbol == "AIR.PA"));

    let cto = holdings[0]
        .envelopes
        .iter()
        .find(|e| e.envelope.account_type_id == "cto")
        .unwrap();
    assert!(cto.orders.is_empty());

    // Deleting the account cascades envelopes and orders
    account_repository.delete(&created.account.id).unwrap();
    let holdings = account_repository.get_accounts_with_holdings(None).unwrap();
    assert!(holdings.is_empty());
}

#[test]
fn unknown_account_type_rejects_account_creation() {
    let (pool, _dir) = common::setup_pool();
    let account_repository = AccountRepository::new(pool);

    let result = account_repository.create(NewAccount {
        name: "Broken".to_string(),
        account_type_ids: vec!["does-not-exist".to_string()],
    });

    assert!(result.is_err());
}

#[test]
fn bulk_insert_is_all_or_nothing() {
    let (pool, _dir) = common::setup_pool();
    let account_repository = AccountRepository::new(pool.clone());
    let order_repository = OrderRepository::new(pool.clone());

    let created = account_repository
        .create(NewAccount {
            name: "Degiro".to_string(),
            account_type_ids: vec!["cto".to_string()],
        })
        .unwrap();

    let valid = NewOrder {
        account_id: created.account.id.clone(),
        account_type_id: "cto".to_string(),
        symbol: "MSFT".to_string(),
        side: "buy".to_string(),
        quantity: dec!(1),
        price: dec!(300),
        currency: Some("USD".to_string()),
        order_date: None,
    };
    let invalid = NewOrder {
        quantity: dec!(-1),
        ..valid.clone()
    };

    // One bad row fails the whole batch before anything is written
    assert!(order_repository
        .bulk_insert(vec![valid.clone(), invalid])
        .is_err());
    let holdings = account_repository
        .get_accounts_with_holdings(Some(&created.account.id))
        .unwrap();
    assert!(holdings[0].envelopes[0].orders.is_empty());

    let inserted = order_repository.bulk_insert(vec![valid]).unwrap();
    assert_eq!(inserted.len(), 1);
}
