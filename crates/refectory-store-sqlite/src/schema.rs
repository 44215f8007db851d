//! SQL schema for the Refectory SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name TEXT NOT NULL,
    external_id  TEXT UNIQUE,         -- identity-provider id; NULL for admin-only accounts
    is_admin     INTEGER NOT NULL DEFAULT 0,
    avatar       TEXT
);

CREATE TABLE IF NOT EXISTS admins (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL UNIQUE REFERENCES users(id),
    access_name   TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,      -- argon2 PHC string
    privileges    TEXT NOT NULL DEFAULT 'all'
);

CREATE TABLE IF NOT EXISTS canteens (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT NOT NULL DEFAULT '',
    campus       TEXT NOT NULL,
    image        TEXT,
    icon         TEXT,
    floors_count INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS dishes (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    canteen INTEGER NOT NULL REFERENCES canteens(id) ON DELETE CASCADE,
    floor   INTEGER NOT NULL,
    window  INTEGER NOT NULL,
    name    TEXT NOT NULL,
    price   REAL,
    measure TEXT NOT NULL DEFAULT 'serving',
    image   TEXT,
    -- Derived state; written only alongside comment/mark mutations.
    average_vote      REAL    NOT NULL DEFAULT 2.5,
    count_of_votes    INTEGER NOT NULL DEFAULT 0,
    count_of_comments INTEGER NOT NULL DEFAULT 0,
    count_of_mark     INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS comments (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    dish_id INTEGER NOT NULL REFERENCES dishes(id) ON DELETE CASCADE,
    content TEXT,                     -- may carry only a vote
    vote    REAL NOT NULL,
    content_visible INTEGER NOT NULL DEFAULT 1,
    time     TEXT NOT NULL,           -- ISO 8601 UTC; server-assigned
    reply_to INTEGER REFERENCES comments(id),
    UNIQUE (user_id, dish_id)
);

CREATE TABLE IF NOT EXISTS marks (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    dish_id INTEGER NOT NULL REFERENCES dishes(id) ON DELETE CASCADE,
    time    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS carousels (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    canteen INTEGER REFERENCES canteens(id) ON DELETE CASCADE,
    image   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS new_dishes (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    dish_id INTEGER NOT NULL REFERENCES dishes(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS feedbacks (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    content    TEXT NOT NULL,
    time       TEXT NOT NULL,
    towards    INTEGER NOT NULL,
    reply      TEXT,
    reply_time TEXT,
    reply_uid  INTEGER REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS users_external_idx    ON users(external_id);
CREATE INDEX IF NOT EXISTS admins_access_idx     ON admins(access_name);
CREATE INDEX IF NOT EXISTS canteens_campus_idx   ON canteens(campus);
CREATE INDEX IF NOT EXISTS dishes_place_idx      ON dishes(canteen, floor, window);
CREATE INDEX IF NOT EXISTS dishes_name_idx       ON dishes(name);
CREATE INDEX IF NOT EXISTS comments_dish_idx     ON comments(dish_id);
CREATE INDEX IF NOT EXISTS comments_user_idx     ON comments(user_id);
CREATE INDEX IF NOT EXISTS marks_user_idx        ON marks(user_id);
CREATE INDEX IF NOT EXISTS marks_dish_idx        ON marks(dish_id);
CREATE INDEX IF NOT EXISTS feedbacks_user_idx    ON feedbacks(user_id);
CREATE INDEX IF NOT EXISTS feedbacks_target_idx  ON feedbacks(towards);
CREATE INDEX IF NOT EXISTS new_dishes_dish_idx   ON new_dishes(dish_id);

PRAGMA user_version = 1;
";
