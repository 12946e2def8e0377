use parcel_core::db::open_db;
use parcel_core::{
    Parcel, ParcelNumber, ParcelRepository, RepoError, SqliteParcelStore, STATUS_SENT,
};
use std::thread;

const PARCELS: usize = 50;

#[test]
fn concurrent_send_and_delete_never_removes_a_sent_parcel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let seed_conn = open_db(&path).unwrap();
    let numbers: Vec<ParcelNumber> = {
        let store = SqliteParcelStore::try_new(&seed_conn).unwrap();
        (0..PARCELS)
            .map(|i| {
                store
                    .add(&Parcel::registered(
                        77,
                        format!("house {i}"),
                        "2024-01-01T00:00:00Z",
                    ))
                    .unwrap()
            })
            .collect()
    };

    let sender_conn = open_db(&path).unwrap();
    let sender_numbers = numbers.clone();
    let sender = thread::spawn(move || {
        let store = SqliteParcelStore::try_new(&sender_conn).unwrap();
        for number in sender_numbers {
            store.set_status(number, STATUS_SENT).unwrap();
        }
    });

    let canceller_conn = open_db(&path).unwrap();
    let canceller_numbers = numbers.clone();
    let canceller = thread::spawn(move || {
        let store = SqliteParcelStore::try_new(&canceller_conn).unwrap();
        for number in canceller_numbers.into_iter().rev() {
            store.set_address(number, "rerouted").unwrap();
            store.delete(number).unwrap();
        }
    });

    sender.join().unwrap();
    canceller.join().unwrap();

    let store = SqliteParcelStore::try_new(&seed_conn).unwrap();
    let mut survivors = 0;
    for number in &numbers {
        match store.get(*number) {
            Ok(parcel) => {
                survivors += 1;
                // Everything still present was sent before the canceller got to it.
                assert_eq!(parcel.status, STATUS_SENT);
            }
            Err(RepoError::NotFound(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(store.get_by_client(77).unwrap().len(), survivors);

    for number in &numbers {
        store.set_address(*number, "after the fact").unwrap();
        store.delete(*number).unwrap();
    }
    assert_eq!(store.get_by_client(77).unwrap().len(), survivors);
    for parcel in store.get_by_client(77).unwrap() {
        assert_ne!(parcel.address, "after the fact");
    }
}
