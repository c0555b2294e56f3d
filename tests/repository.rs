//! Integration tests for the repository facade over a scripted executor.

use rowmap::{
    Column, ColumnDescriptor, Declaration, DuplicateColumns, Error, MapperConfig, Mapped, Params,
    QueryExecutor, Repository, Result, RowSet, SqlType, SqlValue,
};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Executor that replays one prepared result per query.
#[derive(Default)]
struct Scripted {
    results: RefCell<VecDeque<Result<RowSet>>>,
    statements: RefCell<Vec<String>>,
}

impl Scripted {
    fn then(self, result: Result<RowSet>) -> Self {
        self.results.borrow_mut().push_back(result);
        self
    }
}

impl QueryExecutor for Scripted {
    type Cursor = RowSet;

    fn query(&self, sql: &str, _params: &Params) -> Result<RowSet> {
        self.statements.borrow_mut().push(sql.to_string());
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(Error::driver("no scripted result")))
    }
}

#[derive(Debug, Default)]
struct Account {
    id: i32,
    owner: String,
    balance: f64,
}

impl Mapped for Account {
    fn declare(decl: &mut Declaration<Self>) {
        decl.entity()
            .constructor(|| Account {
                owner: "unknown".to_string(),
                ..Default::default()
            })
            .field("id", Column::named("account_id").not_null(), |a| &mut a.id)
            .field("owner", Column::named("owner"), |a| &mut a.owner)
            .field("balance", Column::named("balance"), |a| &mut a.balance);
    }
}

fn accounts() -> RowSet {
    RowSet::new(vec![
        ColumnDescriptor::of("account_id", SqlType::Integer),
        ColumnDescriptor::of("balance", SqlType::Decimal),
        ColumnDescriptor::of("account_id", SqlType::Integer),
    ])
    .with_row(vec![
        SqlValue::Int(10),
        SqlValue::Text("12.50".to_string()),
        SqlValue::Int(11),
    ])
    .unwrap()
}

#[test]
fn test_constructor_defaults_survive_missing_columns() {
    let repo = Repository::new(Scripted::default().then(Ok(accounts())));
    let account: Account = repo
        .load_object("SELECT * FROM account", &Params::none())
        .unwrap();
    assert_eq!(account.id, 10);
    assert_eq!(account.owner, "unknown");
    assert_eq!(account.balance, 12.5);
}

#[test]
fn test_duplicate_policy_applies_to_objects_and_maps() {
    let config = MapperConfig::default().with_duplicate_columns(DuplicateColumns::LastWins);
    let repo = Repository::new(
        Scripted::default()
            .then(Ok(accounts()))
            .then(Ok(accounts())),
    )
    .with_config(config);

    let account: Account = repo
        .load_object("SELECT * FROM account", &Params::none())
        .unwrap();
    assert_eq!(account.id, 11);

    let map = repo.load_map("SELECT * FROM account", &Params::none()).unwrap();
    assert_eq!(map["account_id"], SqlValue::Int(11));
}

#[test]
fn test_driver_error_propagates() {
    let repo = Repository::new(Scripted::default());
    let err = repo
        .load_list::<Account>("SELECT * FROM account", &Params::positional([1i32]))
        .unwrap_err();
    assert!(matches!(err, Error::Driver { .. }));
    assert_eq!(repo.executor().statements.borrow().len(), 1);
}

#[test]
fn test_row_error_carries_type_and_row() {
    let rows = RowSet::new(vec![ColumnDescriptor::of("account_id", SqlType::Integer)])
        .with_row(vec![SqlValue::Int(1)])
        .unwrap()
        .with_row(vec![SqlValue::Null])
        .unwrap();
    let repo = Repository::new(Scripted::default().then(Ok(rows)));

    let err = repo
        .load_list::<Account>("SELECT account_id FROM account", &Params::none())
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Account"), "{}", message);
    assert!(matches!(err, Error::RowMapping { row: Some(2), .. }));
}
