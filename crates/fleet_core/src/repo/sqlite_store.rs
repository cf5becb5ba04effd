//! Per-row SQLite storage and table mappings.
//!
//! # Responsibility
//! - Map each entity onto its table and back.
//! - Keep SQL details inside the repository boundary.
//!
//! # Invariants
//! - Rows are rebuilt through the validated entity constructor; a row that
//!   fails validation surfaces as `RepoError::InvalidData`.
//! - Ids come from `AUTOINCREMENT` and are never reused by SQLite.

use crate::db::DbHandle;
use crate::model::{
    Driver, DriverRecord, Entity, EntityId, Route, RouteRecord, Shipment, ShipmentRecord,
    ValidationError,
};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};

/// Entity that also knows its relational table.
pub trait TableEntity: Entity {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Non-id columns in bind order of `to_row`.
    const COLUMNS: &'static [&'static str];
    const CREATE_TABLE_SQL: &'static str;

    /// Values for `COLUMNS`, in order.
    fn to_row(&self) -> Vec<Value>;

    /// Rebuilds a record from a row selected as `ID_COLUMN, COLUMNS...`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

fn invalid_row<E: Entity>(reason: ValidationError) -> RepoError {
    RepoError::InvalidData {
        entity: E::KIND,
        reason,
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

impl TableEntity for Driver {
    const TABLE: &'static str = "drivers";
    const ID_COLUMN: &'static str = "DriverId";
    const COLUMNS: &'static [&'static str] = &[
        "LastName",
        "FirstName",
        "Patronymic",
        "Experience",
        "Birthday",
        "PhoneNumber",
        "DriverLicense",
        "VehicleTitle",
        "InsurancePolicy",
        "LicensePlate",
    ];
    const CREATE_TABLE_SQL: &'static str = "CREATE TABLE IF NOT EXISTS drivers (
        DriverId INTEGER PRIMARY KEY AUTOINCREMENT,
        LastName TEXT NOT NULL,
        FirstName TEXT NOT NULL,
        Patronymic TEXT NOT NULL,
        Experience INTEGER NOT NULL,
        Birthday TEXT,
        PhoneNumber TEXT,
        DriverLicense TEXT,
        VehicleTitle TEXT,
        InsurancePolicy TEXT,
        LicensePlate TEXT
    );";

    fn to_row(&self) -> Vec<Value> {
        let record = DriverRecord::from(self.clone());
        vec![
            optional_text(record.last_name.as_deref()),
            optional_text(record.first_name.as_deref()),
            optional_text(record.patronymic.as_deref()),
            Value::Integer(self.experience()),
            optional_text(record.birthday.as_deref()),
            optional_text(record.phone_number.as_deref()),
            optional_text(record.driver_license.as_deref()),
            optional_text(record.vehicle_title.as_deref()),
            optional_text(record.insurance_policy.as_deref()),
            optional_text(record.license_plate.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let record = DriverRecord {
            driver_id: row.get("DriverId")?,
            last_name: row.get("LastName")?,
            first_name: row.get("FirstName")?,
            patronymic: row.get("Patronymic")?,
            experience: row.get("Experience")?,
            birthday: row.get("Birthday")?,
            phone_number: row.get("PhoneNumber")?,
            driver_license: row.get("DriverLicense")?,
            vehicle_title: row.get("VehicleTitle")?,
            insurance_policy: row.get("InsurancePolicy")?,
            license_plate: row.get("LicensePlate")?,
        };
        Driver::try_from(record).map_err(invalid_row::<Driver>)
    }
}

impl TableEntity for Route {
    const TABLE: &'static str = "routes";
    const ID_COLUMN: &'static str = "RouteId";
    const COLUMNS: &'static [&'static str] = &[
        "RouteName",
        "StartRoute",
        "EndRoute",
        "Distance",
        "DriverPayment",
    ];
    const CREATE_TABLE_SQL: &'static str = "CREATE TABLE IF NOT EXISTS routes (
        RouteId INTEGER PRIMARY KEY AUTOINCREMENT,
        RouteName TEXT NOT NULL,
        StartRoute TEXT NOT NULL,
        EndRoute TEXT NOT NULL,
        Distance INTEGER NOT NULL,
        DriverPayment INTEGER NOT NULL
    );";

    fn to_row(&self) -> Vec<Value> {
        vec![
            text(self.route_name()),
            text(self.start_route()),
            text(self.end_route()),
            Value::Integer(self.distance()),
            Value::Integer(self.driver_payment()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let record = RouteRecord {
            route_id: row.get("RouteId")?,
            route_name: row.get("RouteName")?,
            start_route: row.get("StartRoute")?,
            end_route: row.get("EndRoute")?,
            distance: row.get("Distance")?,
            driver_payment: row.get("DriverPayment")?,
        };
        Route::try_from(record).map_err(invalid_row::<Route>)
    }
}

impl TableEntity for Shipment {
    const TABLE: &'static str = "shipments";
    const ID_COLUMN: &'static str = "ShipmentId";
    const COLUMNS: &'static [&'static str] = &[
        "RouteId",
        "DriverId",
        "DepartureDate",
        "ArrivalDate",
        "Bonus",
    ];
    const CREATE_TABLE_SQL: &'static str = "CREATE TABLE IF NOT EXISTS shipments (
        ShipmentId INTEGER PRIMARY KEY AUTOINCREMENT,
        RouteId INTEGER NOT NULL,
        DriverId INTEGER NOT NULL,
        DepartureDate TEXT NOT NULL,
        ArrivalDate TEXT NOT NULL,
        Bonus REAL NOT NULL,
        FOREIGN KEY (RouteId) REFERENCES routes(RouteId),
        FOREIGN KEY (DriverId) REFERENCES drivers(DriverId)
    );";

    fn to_row(&self) -> Vec<Value> {
        let record = ShipmentRecord::from(self.clone());
        vec![
            Value::Integer(self.route_id()),
            Value::Integer(self.driver_id()),
            optional_text(record.departure_date.as_deref()),
            optional_text(record.arrival_date.as_deref()),
            Value::Real(self.bonus()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let record = ShipmentRecord {
            shipment_id: row.get("ShipmentId")?,
            route_id: row.get("RouteId")?,
            driver_id: row.get("DriverId")?,
            departure_date: row.get("DepartureDate")?,
            arrival_date: row.get("ArrivalDate")?,
            bonus: row.get("Bonus")?,
        };
        Shipment::try_from(record).map_err(invalid_row::<Shipment>)
    }
}

/// SQLite table access over a shared registry handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: DbHandle,
}

impl SqliteStore {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }

    pub fn handle(&self) -> &DbHandle {
        &self.db
    }

    /// Creates the entity table when missing.
    pub fn ensure_table<E: TableEntity>(&self) -> RepoResult<()> {
        self.db.execute_batch(E::CREATE_TABLE_SQL)?;
        Ok(())
    }

    /// Every row in id order.
    pub fn select_all<E: TableEntity>(&self) -> RepoResult<Vec<E>> {
        let sql = format!("{} ORDER BY {} ASC;", select_sql::<E>(), E::ID_COLUMN);
        let mut stmt = self.db.connection().prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut entities = Vec::new();

        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }

        Ok(entities)
    }

    pub fn select_by_id<E: TableEntity>(&self, id: EntityId) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE {} = ?1;", select_sql::<E>(), E::ID_COLUMN);
        let mut stmt = self.db.connection().prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(E::from_row(row)?));
        }

        Ok(None)
    }

    /// Inserts one row and returns the database-assigned id.
    pub fn insert<E: TableEntity>(&self, entity: &E) -> RepoResult<EntityId> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders
        );
        self.db.execute(&sql, params_from_iter(entity.to_row()))?;
        Ok(self.db.last_insert_rowid())
    }

    /// Rewrites every column of row `id`; returns whether a row matched.
    pub fn update<E: TableEntity>(&self, id: EntityId, entity: &E) -> RepoResult<bool> {
        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{};",
            E::TABLE,
            assignments,
            E::ID_COLUMN,
            E::COLUMNS.len() + 1
        );
        let mut values = entity.to_row();
        values.push(Value::Integer(id));
        let changed = self.db.execute(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    /// Deletes row `id`; returns the number of removed rows.
    pub fn delete<E: TableEntity>(&self, id: EntityId) -> RepoResult<usize> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1;", E::TABLE, E::ID_COLUMN);
        Ok(self.db.execute(&sql, [id])?)
    }

    pub fn count<E: TableEntity>(&self) -> RepoResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {};", E::TABLE);
        let count = self
            .db
            .query_row(&sql, [], |row| row.get::<_, i64>(0))?
            .unwrap_or(0);
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn select_sql<E: TableEntity>() -> String {
    format!(
        "SELECT {}, {} FROM {}",
        E::ID_COLUMN,
        E::COLUMNS.join(", "),
        E::TABLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let store = SqliteStore::new(DbHandle::in_memory().unwrap());
        store.ensure_table::<Driver>().unwrap();
        store
    }

    #[test]
    fn ensure_table_is_idempotent() {
        let store = store();
        store.ensure_table::<Driver>().unwrap();
        assert_eq!(store.count::<Driver>().unwrap(), 0);
    }

    #[test]
    fn insert_select_update_delete() {
        let store = store();
        let driver = Driver::new("Ivanov", "Ivan", "Ivanovich", 5).unwrap();

        let id = store.insert(&driver).unwrap();
        assert_eq!(id, 1);

        let loaded: Driver = store.select_by_id(id).unwrap().unwrap();
        assert_eq!(loaded, driver.clone().with_id(id).unwrap());

        let changed = Driver::new("Ivanov", "Ivan", "Ivanovich", 6).unwrap();
        assert!(store.update(id, &changed).unwrap());
        assert!(!store.update(99, &changed).unwrap());
        let loaded: Driver = store.select_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.experience(), 6);

        assert_eq!(store.delete::<Driver>(id).unwrap(), 1);
        assert!(store.select_by_id::<Driver>(id).unwrap().is_none());
    }

    #[test]
    fn invalid_row_is_reported_not_returned() {
        let store = store();
        store
            .handle()
            .execute(
                "INSERT INTO drivers (LastName, FirstName, Patronymic, Experience)
                 VALUES ('Ivanov', 'Ivan', 'Ivanovich', -3);",
                [],
            )
            .unwrap();

        let err = store.select_all::<Driver>().unwrap_err();
        assert!(matches!(
            err,
            RepoError::InvalidData {
                entity: "driver",
                ..
            }
        ));
    }

    #[test]
    fn shipment_table_declares_foreign_keys_without_enforcing_them() {
        let store = SqliteStore::new(DbHandle::in_memory().unwrap());
        store.ensure_table::<Shipment>().unwrap();

        let shipment = Shipment::new(42, 17, "01.06.2024", "03.06.2024", 250.0).unwrap();
        let id = store.insert(&shipment).unwrap();

        let loaded: Shipment = store.select_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.route_id(), 42);
        assert_eq!(loaded.duration_days(), 2);
    }
}
