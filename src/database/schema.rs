// AUTOINCREMENT keeps deleted ids from ever being handed out again,
// even after the row with the highest id is removed.
pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS location_notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        location_name TEXT NOT NULL,
        description TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        time TEXT NOT NULL,
        date TEXT NOT NULL,
        images TEXT
    );
";
