//! SQL schema for the Stemma SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id       TEXT PRIMARY KEY,
    created_at      TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    name            TEXT NOT NULL,
    nickname        TEXT,
    gender          TEXT NOT NULL,   -- 'male' | 'female'
    birth_order     INTEGER NOT NULL DEFAULT 0,
    address         TEXT,
    city            TEXT,
    phone           TEXT,
    born_on         TEXT,            -- YYYY-MM-DD
    birth_year      INTEGER,
    died_on         TEXT,            -- YYYY-MM-DD
    death_year      INTEGER,
    father_id       TEXT REFERENCES persons(person_id),
    mother_id       TEXT REFERENCES persons(person_id),
    parent_union_id TEXT REFERENCES unions(union_id),
    manager_id      TEXT
);

-- One union per unordered spouse pair. The engine rejects the
-- role-swapped duplicate before insert; this constraint closes the
-- same-order check-then-insert race.
CREATE TABLE IF NOT EXISTS unions (
    union_id    TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,
    husband_id  TEXT NOT NULL REFERENCES persons(person_id),
    wife_id     TEXT NOT NULL REFERENCES persons(person_id),
    married_on  TEXT,                -- YYYY-MM-DD
    manager_id  TEXT,
    UNIQUE (husband_id, wife_id),
    CHECK  (husband_id != wife_id)
);

CREATE INDEX IF NOT EXISTS persons_father_idx       ON persons(father_id);
CREATE INDEX IF NOT EXISTS persons_mother_idx       ON persons(mother_id);
CREATE INDEX IF NOT EXISTS persons_parent_union_idx ON persons(parent_union_id);
CREATE INDEX IF NOT EXISTS unions_husband_idx       ON unions(husband_id);
CREATE INDEX IF NOT EXISTS unions_wife_idx          ON unions(wife_id);

PRAGMA user_version = 1;
";
