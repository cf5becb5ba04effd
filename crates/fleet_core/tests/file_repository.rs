use fleet_core::{Backend, Driver, Entity, RepoError, Repository, Route};
use std::fs;
use std::path::Path;

fn driver(last_name: &str, experience: i64) -> Driver {
    Driver::new(last_name, "Ivan", "Ivanovich", experience).unwrap()
}

fn json_repo(path: &Path) -> Repository<Driver> {
    Repository::open(Backend::json(path)).unwrap()
}

fn ids(entities: &[Driver]) -> Vec<i64> {
    entities.iter().filter_map(|d| d.id()).collect()
}

#[test]
fn json_round_trip_assigns_first_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.json");
    let ivanov = driver("Ivanov", 5);

    let id = json_repo(&path).add(ivanov.clone()).unwrap();
    assert_eq!(id, 1);

    let reopened = json_repo(&path);
    assert_eq!(reopened.entities(), &[ivanov.with_id(1).unwrap()]);

    let wire: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(wire[0]["driver_id"], 1);
    assert_eq!(wire[0]["last_name"], "Ivanov");
    assert!(wire[0].get("birthday").is_none());
}

#[test]
fn yaml_round_trip_keeps_route_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.yaml");
    let route = Route::new("Северный", "Москва", "Тверь", 180, 4500).unwrap();

    let mut repo = Repository::<Route>::open(Backend::yaml(&path)).unwrap();
    let id = repo.add(route.clone()).unwrap();

    let reopened = Repository::<Route>::open(Backend::yaml(&path)).unwrap();
    assert_eq!(reopened.get_by_id(id).unwrap(), Some(route.with_id(id).unwrap()));

    let wire: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(wire[0]["route_name"].as_str(), Some("Северный"));
    assert_eq!(wire[0]["distance"].as_i64(), Some(180));
}

#[test]
fn ids_continue_from_max_and_are_not_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.json");
    fs::write(
        &path,
        r#"[{"driver_id": 7, "last_name": "Petrov", "first_name": "Petr", "patronymic": "Petrovich", "experience": 2}]"#,
    )
    .unwrap();

    let mut repo = json_repo(&path);
    assert_eq!(repo.add(driver("Sidorov", 1)).unwrap(), 8);

    repo.delete_by_id(8).unwrap();
    assert_eq!(repo.add(driver("Smirnov", 4)).unwrap(), 9);
    assert_eq!(ids(repo.entities()), vec![7, 9]);
}

#[test]
fn first_page_of_five_holds_first_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.json");
    let mut repo = json_repo(&path);
    for experience in 0..5 {
        repo.add(driver("Ivanov", experience)).unwrap();
    }
    let repo = json_repo(&path);

    assert_eq!(ids(&repo.get_page(2, 1)), vec![1, 2]);
    assert_eq!(ids(&repo.get_page(2, 3)), vec![5]);
    assert!(repo.get_page(2, 4).is_empty());
    assert!(repo.get_page(0, 1).is_empty());
    assert!(repo.get_page(2, 0).is_empty());
}

#[test]
fn sort_is_stable_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.yaml");
    let mut repo = Repository::<Driver>::open(Backend::yaml(&path)).unwrap();
    for (name, experience) in [("A", 5), ("B", 3), ("C", 5), ("D", 1), ("E", 3)] {
        repo.add(driver(name, experience)).unwrap();
    }

    repo.sort_by("experience").unwrap();

    let names: Vec<&str> = repo.entities().iter().map(Driver::last_name).collect();
    assert_eq!(names, vec!["D", "B", "E", "A", "C"]);

    let reopened = Repository::<Driver>::open(Backend::yaml(&path)).unwrap();
    assert_eq!(ids(reopened.entities()), vec![4, 2, 5, 1, 3]);
}

#[test]
fn sort_by_unknown_field_leaves_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = json_repo(&dir.path().join("drivers.json"));
    repo.add(driver("B", 1)).unwrap();
    repo.add(driver("A", 2)).unwrap();

    let err = repo.sort_by("nonexistent").unwrap_err();

    assert!(matches!(err, RepoError::UnknownField { ref field, .. } if field == "nonexistent"));
    assert_eq!(ids(repo.entities()), vec![1, 2]);
}

#[test]
fn delete_removes_entity_and_decrements_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.json");
    let mut repo = json_repo(&path);
    repo.add(driver("A", 1)).unwrap();
    repo.add(driver("B", 2)).unwrap();
    let before = repo.count().unwrap();

    repo.delete_by_id(1).unwrap();

    assert_eq!(repo.get_by_id(1).unwrap(), None);
    assert_eq!(repo.count().unwrap(), before - 1);
    assert_eq!(json_repo(&path).count().unwrap(), 1);

    repo.delete_by_id(42).unwrap();
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn replace_keeps_id_and_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = json_repo(&dir.path().join("drivers.json"));
    repo.add(driver("A", 1)).unwrap();
    repo.add(driver("B", 2)).unwrap();

    repo.replace_by_id(1, driver("Z", 9)).unwrap();

    assert_eq!(repo.entities()[0].last_name(), "Z");
    assert_eq!(repo.entities()[0].id(), Some(1));

    let err = repo.replace_by_id(5, driver("Q", 1)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 5, .. }));
}

#[test]
fn invalid_input_is_never_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.json");
    let mut repo = json_repo(&path);

    assert!(Driver::new("", "Ivan", "Ivanovich", 5).is_err());
    assert!(Driver::new("Ivanov", "Ivan", "Ivanovich", -1).is_err());

    assert_eq!(repo.count().unwrap(), 0);
    assert!(!path.exists());
    repo.add(driver("Ivanov", 5)).unwrap();
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.json");
    fs::write(&path, "{ not json").unwrap();

    let err = Repository::<Driver>::open(Backend::json(&path)).err().unwrap();
    assert!(matches!(err, RepoError::Json(_)));
    assert!(err.is_backend());
}
