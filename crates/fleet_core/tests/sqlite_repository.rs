use fleet_core::db::open_db_in_memory;
use fleet_core::{
    Backend, ConnectionRegistry, DbHandle, Driver, DriverCard, Entity, RepoError, Repository,
    Route, Shipment,
};

fn memory_backend() -> Backend {
    Backend::sqlite(DbHandle::in_memory().unwrap())
}

fn driver(last_name: &str, experience: i64) -> Driver {
    Driver::new(last_name, "Petr", "Petrovich", experience).unwrap()
}

#[test]
fn in_memory_connection_opens() {
    let conn = open_db_in_memory().unwrap();
    let value: i64 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
    assert_eq!(value, 1);
}

#[test]
fn crud_round_trip_through_table() {
    let mut repo = Repository::<Driver>::open(memory_backend()).unwrap();

    let first = repo.add(driver("Petrov", 3)).unwrap();
    let second = repo.add(driver("Sidorov", 8)).unwrap();
    assert_eq!((first, second), (1, 2));

    repo.replace_by_id(second, driver("Sidorov", 9)).unwrap();
    assert_eq!(repo.get_by_id(second).unwrap().unwrap().experience(), 9);

    repo.delete_by_id(first).unwrap();
    assert_eq!(repo.get_by_id(first).unwrap(), None);
    assert_eq!(repo.count().unwrap(), 1);

    let err = repo.replace_by_id(first, driver("Petrov", 3)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 1, .. }));
}

#[test]
fn autoincrement_never_reuses_deleted_ids() {
    let mut repo = Repository::<Driver>::open(memory_backend()).unwrap();
    repo.add(driver("A", 1)).unwrap();
    let last = repo.add(driver("B", 1)).unwrap();
    repo.delete_by_id(last).unwrap();

    assert_eq!(repo.add(driver("C", 1)).unwrap(), last + 1);
}

#[test]
fn tables_share_one_registry_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.sqlite3");
    let identifier = path.to_string_lossy().into_owned();
    let card = DriverCard::new(
        "15.03.1985",
        "+7(912)345-67-89",
        "12 34 567890",
        "98 76 543210",
        "123 456789012345",
        "А123ВС77",
    )
    .unwrap();
    let with_card = driver("Petrov", 3).with_card(card);
    let route = Route::new("Север", "Москва", "Тверь", 180, 4500).unwrap();

    {
        let mut registry = ConnectionRegistry::new();
        let mut drivers =
            Repository::<Driver>::open(Backend::sqlite(registry.connect(&identifier).unwrap()))
                .unwrap();
        let mut routes =
            Repository::<Route>::open(Backend::sqlite(registry.connect(&identifier).unwrap()))
                .unwrap();
        let mut shipments =
            Repository::<Shipment>::open(Backend::sqlite(registry.connect(&identifier).unwrap()))
                .unwrap();
        assert_eq!(registry.len(), 1);

        let driver_id = drivers.add(with_card.clone()).unwrap();
        let route_id = routes.add(route.clone()).unwrap();
        let shipment =
            Shipment::new(route_id, driver_id, "01.02.2024", "03.02.2024", 1500.5).unwrap();
        shipments.add(shipment).unwrap();
    }

    let mut registry = ConnectionRegistry::new();
    let handle = registry.connect(&format!("  {identifier}  ")).unwrap();
    let drivers = Repository::<Driver>::open(Backend::sqlite(handle.clone())).unwrap();
    let shipments = Repository::<Shipment>::open(Backend::sqlite(handle)).unwrap();

    assert_eq!(drivers.entities(), &[with_card.with_id(1).unwrap()]);
    let stored = &shipments.entities()[0];
    assert_eq!(stored.bonus(), 1500.5);
    assert_eq!(stored.duration_days(), 2);
    assert_eq!(stored.route_id(), 1);
}

#[test]
fn sort_and_pages_work_on_loaded_rows() {
    let handle = DbHandle::in_memory().unwrap();
    let mut repo = Repository::<Driver>::open(Backend::sqlite(handle.clone())).unwrap();
    for (name, experience) in [("A", 4), ("B", 2), ("C", 4)] {
        repo.add(driver(name, experience)).unwrap();
    }

    repo.sort_by("experience").unwrap();
    let first_page: Vec<i64> = repo.get_page(2, 1).iter().filter_map(|d| d.id()).collect();
    assert_eq!(first_page, vec![2, 1]);
    let ordered: Vec<i64> = repo.entities().iter().filter_map(|d| d.id()).collect();
    assert_eq!(ordered, vec![2, 1, 3]);

    let reopened = Repository::<Driver>::open(Backend::sqlite(handle)).unwrap();
    let ordered: Vec<i64> = reopened.entities().iter().filter_map(|d| d.id()).collect();
    assert_eq!(ordered, vec![1, 2, 3]);
}

#[test]
fn invalid_rows_are_rejected_on_load() {
    let handle = DbHandle::in_memory().unwrap();
    Repository::<Driver>::open(Backend::sqlite(handle.clone())).unwrap();
    handle
        .execute(
            "INSERT INTO drivers (LastName, FirstName, Patronymic, Experience) VALUES ('A', 'B', 'C', -1)",
            [],
        )
        .unwrap();

    let err = Repository::<Driver>::open(Backend::sqlite(handle)).err().unwrap();
    assert!(matches!(err, RepoError::InvalidData { entity: "driver", .. }));
}
