use flex_config::{ConfigStore, FlexError, Record, Scalar, TabularDocument};
use proptest::prelude::*;

fn row(fields: &[(&str, Scalar)]) -> Record {
    fields.iter().cloned().collect()
}

fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Missing),
        any::<bool>().prop_map(Scalar::Bool),
        any::<i64>().prop_map(Scalar::Int),
        (-1.0e6..1.0e6f64).prop_map(Scalar::Float),
        "[a-z]{0,8}".prop_map(Scalar::Str),
    ]
}

fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::btree_map("(lr|epochs|batch_size|optimizer|acc|seed)", scalar_strategy(), 0..5)
        .prop_map(|fields| fields.into_iter().collect())
}

proptest! {
    #[test]
    fn log_tracks_every_config_in_order(records in prop::collection::vec(record_strategy(), 1..8)) {
        let mut store = ConfigStore::new();
        for record in &records {
            store.set_config(TabularDocument::from_record(record.clone())).unwrap();
            prop_assert_eq!(&store.current_config().unwrap(), record);
            prop_assert_eq!(&store.logs().last_row().unwrap(), record);
        }
        prop_assert_eq!(store.logs().len(), records.len());
        for (idx, record) in records.iter().enumerate() {
            prop_assert_eq!(&store.logs().row(idx).unwrap(), record);
        }
        prop_assert!(store.is_consistent());
    }

    #[test]
    fn edits_only_touch_the_last_row(
        records in prop::collection::vec(record_strategy(), 1..6),
        fields in record_strategy(),
    ) {
        let mut store = ConfigStore::new();
        for record in &records {
            store.set_config(TabularDocument::from_record(record.clone())).unwrap();
        }
        let before = store.logs().clone();
        let prior = store.current_config().unwrap();

        store.edit_config(&fields).unwrap();

        let current = store.current_config().unwrap();
        for (key, value) in fields.iter() {
            prop_assert_eq!(current.field(key), value);
        }
        for (key, value) in prior.iter() {
            if !fields.contains_key(key) {
                prop_assert_eq!(current.field(key), value);
            }
        }
        prop_assert_eq!(&store.logs().last_row().unwrap(), &current);
        prop_assert_eq!(store.logs().len(), before.len());
        for idx in 0..before.len() - 1 {
            prop_assert_eq!(store.logs().row(idx), before.row(idx));
        }
    }
}

#[test]
fn new_column_is_backfilled_as_missing() {
    let mut store = ConfigStore::new();
    store
        .set_config(TabularDocument::from_record(row(&[
            ("lr", 0.1.into()),
            ("batch_size", 128.into()),
        ])))
        .expect("first");
    store
        .set_config(TabularDocument::from_record(row(&[
            ("lr", 0.01.into()),
            ("batch_size", 128.into()),
            ("epochs", 5.into()),
        ])))
        .expect("second");

    let logs = store.logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs.row(0).expect("row 0").get("epochs"), Some(&Scalar::Missing));
    assert_eq!(logs.row(1).expect("row 1").get("epochs"), Some(&Scalar::Int(5)));
    assert_eq!(
        store.current_config().expect("current"),
        row(&[
            ("lr", 0.01.into()),
            ("batch_size", 128.into()),
            ("epochs", 5.into()),
        ])
    );
}

#[test]
fn set_logs_reappends_current() {
    let mut store = ConfigStore::new();
    store
        .set_config(TabularDocument::from_record(row(&[("acc", 0.9.into())])))
        .expect("config");
    let history = TabularDocument::from_rows([
        row(&[("acc", 0.5.into())]),
        row(&[("acc", 0.7.into())]),
        row(&[("acc", 0.9.into())]),
    ]);

    store.set_logs(history);

    assert_eq!(store.logs().len(), 4);
    assert_eq!(store.logs().last_row().expect("last"), row(&[("acc", 0.9.into())]));
    // an equal trailing row is kept, not deduplicated
    assert_eq!(store.logs().row(2), store.logs().row(3));
}

#[test]
fn append_keeps_current_row_last() {
    let mut store = ConfigStore::new();
    store
        .set_config(TabularDocument::from_record(row(&[("lr", 0.1.into())])))
        .expect("config");
    store.append(&TabularDocument::from_rows([
        row(&[("lr", 0.3.into()), ("seed", 1.into())]),
        row(&[("lr", 0.2.into())]),
    ]));

    let logs = store.logs();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs.row(0), Some(row(&[("lr", 0.3.into()), ("seed", 1.into())])));
    assert_eq!(logs.last_row().expect("last"), row(&[("lr", 0.1.into())]));
    assert_eq!(store.current_config().expect("current"), row(&[("lr", 0.1.into())]));
    assert!(store.is_consistent());
}

#[test]
fn append_without_config_just_extends() {
    let mut store = ConfigStore::new();
    store.append(&TabularDocument::from_record(row(&[("lr", 0.3.into())])));
    assert_eq!(store.logs().len(), 1);
    assert!(!store.has_config());
}

#[test]
fn multi_row_config_is_a_shape_error() {
    let mut store = ConfigStore::new();
    let doc = TabularDocument::from_rows([row(&[("a", 1.into())]), row(&[("a", 2.into())])]);
    assert!(matches!(store.set_config(doc), Err(FlexError::Shape(_))));
    assert!(matches!(
        store.set_config(TabularDocument::empty()),
        Err(FlexError::Shape(_))
    ));
    assert!(store.logs().is_empty());
}

#[test]
fn reading_or_editing_unset_config_fails() {
    let mut store = ConfigStore::new();
    assert!(matches!(store.current_config(), Err(FlexError::EmptyDocument(_))));
    assert!(matches!(
        store.edit_config(&row(&[("lr", 0.1.into())])),
        Err(FlexError::EmptyDocument(_))
    ));
    assert!(store.current_document().is_err());
}

#[test]
fn with_state_places_config_after_history() {
    let history = TabularDocument::from_rows([row(&[("lr", 0.5.into())])]);
    let store = ConfigStore::with_state(
        history,
        TabularDocument::from_record(row(&[("lr", 0.1.into())])),
    )
    .expect("store");
    assert_eq!(store.logs().len(), 2);
    assert_eq!(store.logs().last_row().expect("last"), row(&[("lr", 0.1.into())]));

    let store = ConfigStore::with_state(TabularDocument::empty(), TabularDocument::empty())
        .expect("empty store");
    assert!(store.logs().is_empty());
    assert!(!store.has_config());
}

#[test]
fn nan_cells_keep_the_log_in_sync() {
    let mut store = ConfigStore::new();
    let config = row(&[("lr", 0.1.into()), ("loss", f64::NAN.into())]);
    store
        .set_config(TabularDocument::from_record(config.clone()))
        .expect("config");
    assert!(store.is_consistent());
    assert_eq!(store.logs().last_row().expect("last"), config);
    assert_eq!(store.current_config().expect("current"), config);

    store.set_logs(TabularDocument::from_record(config.clone()));
    store.append(&TabularDocument::from_record(row(&[("loss", f64::NAN.into())])));
    store
        .edit_config(&row(&[("acc", f64::NAN.into())]))
        .expect("edit");
    assert!(store.is_consistent());
    assert_eq!(store.logs().len(), 3);
}
