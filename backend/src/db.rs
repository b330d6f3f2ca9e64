use crate::schema::device_data;
use common::req::{Device, NewDevice};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use log::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS device_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        device_id TEXT NOT NULL,
        coordinate_x REAL NOT NULL,
        coordinate_y REAL NOT NULL,
        signal_quality INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_device_id ON device_data (device_id);
";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to open database at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: diesel::result::ConnectionError,
    },

    #[error("{0}")]
    Query(#[from] diesel::result::Error),

    #[error("database lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Insertable)]
#[diesel(table_name=device_data)]
struct NewDeviceRow<'a> {
    device_id: &'a str,
    coordinate_x: f64,
    coordinate_y: f64,
    signal_quality: i32,
}

#[derive(Debug, Queryable)]
struct DeviceRow {
    id: i32,
    device_id: String,
    coordinate_x: f64,
    coordinate_y: f64,
    signal_quality: i32,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Self {
            id: row.id,
            device_id: row.device_id,
            coordinate_x: row.coordinate_x,
            coordinate_y: row.coordinate_y,
            signal_quality: row.signal_quality,
        }
    }
}

/// Append-only device store on a single sqlite connection.
pub struct Db {
    conn: SqliteConnection,
}

impl Db {
    /// Opens `database_url` (a file path or `:memory:`) and makes sure the
    /// schema exists.
    pub fn connect(database_url: &str) -> Result<Self> {
        let conn =
            SqliteConnection::establish(database_url).map_err(|source| StorageError::Connect {
                url: database_url.to_owned(),
                source,
            })?;

        let mut db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.conn.batch_execute(SCHEMA)?;
        Ok(())
    }

    pub fn devices(&mut self) -> Result<Vec<Device>> {
        use crate::schema::device_data::dsl::*;

        let rows = device_data
            .order(id.asc())
            .load::<DeviceRow>(&mut self.conn)?;

        Ok(rows.into_iter().map(Device::from).collect())
    }

    pub fn devices_by_label(&mut self, label: &str) -> Result<Vec<Device>> {
        use crate::schema::device_data::dsl::*;

        let rows = device_data
            .filter(device_id.eq(label))
            .order(id.asc())
            .load::<DeviceRow>(&mut self.conn)?;

        Ok(rows.into_iter().map(Device::from).collect())
    }

    pub fn device(&mut self, device_pk: i32) -> Result<Option<Device>> {
        let row = device_data::table
            .find(device_pk)
            .first::<DeviceRow>(&mut self.conn)
            .optional()?;

        Ok(row.map(Device::from))
    }

    /// Appends `dev` and returns it as stored, id included.
    pub fn insert_device(&mut self, dev: &NewDevice) -> Result<Device> {
        debug!("Insert device {:?} into db", dev.device_id);

        diesel::insert_into(device_data::table)
            .values(&NewDeviceRow {
                device_id: &dev.device_id,
                coordinate_x: dev.coordinate_x,
                coordinate_y: dev.coordinate_y,
                signal_quality: dev.signal_quality,
            })
            .execute(&mut self.conn)?;

        let rowid = diesel::select(diesel::dsl::sql::<BigInt>("last_insert_rowid()"))
            .get_result::<i64>(&mut self.conn)?;

        let row = device_data::table
            .find(rowid as i32)
            .first::<DeviceRow>(&mut self.conn)?;

        Ok(row.into())
    }

    /// Makes every later query fail.
    #[cfg(test)]
    pub fn break_storage(&mut self) {
        self.conn.batch_execute("DROP TABLE device_data").unwrap();
    }
}
