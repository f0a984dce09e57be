//! [`SqliteStore`] — the SQLite implementation of [`FamilyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use stemma_core::{
  person::{NewPerson, ParentRole, Person},
  store::FamilyStore,
  union::{NewUnion, Union},
};

use crate::{
  Error, Result,
  encode::{
    RawPerson, RawUnion, encode_date_opt, encode_dt, encode_gender,
    encode_uuid, encode_uuid_opt,
  },
  schema::SCHEMA,
};

const PERSON_COLUMNS: &str = "person_id, created_at, name, nickname, gender, \
   birth_order, address, city, phone, born_on, birth_year, died_on, \
   death_year, father_id, mother_id, parent_union_id, manager_id";

const UNION_COLUMNS: &str =
  "union_id, created_at, husband_id, wife_id, married_on, manager_id";

fn raw_person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:       row.get(0)?,
    created_at:      row.get(1)?,
    name:            row.get(2)?,
    nickname:        row.get(3)?,
    gender:          row.get(4)?,
    birth_order:     row.get(5)?,
    address:         row.get(6)?,
    city:            row.get(7)?,
    phone:           row.get(8)?,
    born_on:         row.get(9)?,
    birth_year:      row.get(10)?,
    died_on:         row.get(11)?,
    death_year:      row.get(12)?,
    father_id:       row.get(13)?,
    mother_id:       row.get(14)?,
    parent_union_id: row.get(15)?,
    manager_id:      row.get(16)?,
  })
}

fn raw_union_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUnion> {
  Ok(RawUnion {
    union_id:   row.get(0)?,
    created_at: row.get(1)?,
    husband_id: row.get(2)?,
    wife_id:    row.get(3)?,
    married_on: row.get(4)?,
    manager_id: row.get(5)?,
  })
}

/// True when `e` is the given SQLite extended constraint code (e.g.
/// `SQLITE_CONSTRAINT_UNIQUE`).
fn constraint_violation(e: &tokio_rusqlite::Error, extended_code: i32) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == extended_code
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stemma family store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Person`] row.
  async fn insert_person(&self, person: &Person) -> Result<(), tokio_rusqlite::Error> {
    let person_id       = encode_uuid(person.person_id);
    let created_at      = encode_dt(person.created_at);
    let name            = person.name.clone();
    let nickname        = person.nickname.clone();
    let gender          = encode_gender(person.gender).to_owned();
    let birth_order     = person.birth_order;
    let address         = person.address.clone();
    let city            = person.city.clone();
    let phone           = person.phone.clone();
    let born_on         = encode_date_opt(person.born_on);
    let birth_year      = person.birth_year;
    let died_on         = encode_date_opt(person.died_on);
    let death_year      = person.death_year;
    let father_id       = encode_uuid_opt(person.father_id);
    let mother_id       = encode_uuid_opt(person.mother_id);
    let parent_union_id = encode_uuid_opt(person.parent_union_id);
    let manager_id      = encode_uuid_opt(person.manager_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             person_id, created_at, name, nickname, gender, birth_order,
             address, city, phone, born_on, birth_year, died_on, death_year,
             father_id, mother_id, parent_union_id, manager_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17)",
          rusqlite::params![
            person_id,
            created_at,
            name,
            nickname,
            gender,
            birth_order,
            address,
            city,
            phone,
            born_on,
            birth_year,
            died_on,
            death_year,
            father_id,
            mother_id,
            parent_union_id,
            manager_id,
          ],
        )?;
        Ok(())
      })
      .await
  }

  async fn create_person(&self, id: Uuid, input: NewPerson) -> Result<Person> {
    let person = Person {
      person_id:       id,
      created_at:      Utc::now(),
      name:            input.name,
      nickname:        input.nickname,
      gender:          input.gender,
      birth_order:     input.birth_order,
      address:         input.address,
      city:            input.city,
      phone:           input.phone,
      born_on:         input.born_on,
      birth_year:      input.birth_year,
      died_on:         input.died_on,
      death_year:      input.death_year,
      father_id:       input.father_id,
      mother_id:       input.mother_id,
      parent_union_id: input.parent_union_id,
      manager_id:      input.manager_id,
    };

    if let Err(e) = self.insert_person(&person).await {
      if constraint_violation(&e, rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
      {
        return Err(Error::PersonExists(id));
      }
      return Err(e.into());
    }
    Ok(person)
  }

  /// Run a person-returning query with positional string parameters.
  async fn select_persons(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter()),
            raw_person_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  /// Run a union-returning query with positional string parameters.
  async fn select_unions(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Union>> {
    let raws: Vec<RawUnion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter()),
            raw_union_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUnion::into_union).collect()
  }
}

// ─── FamilyStore impl ────────────────────────────────────────────────────────

impl FamilyStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    self.create_person(Uuid::new_v4(), input).await
  }

  async fn add_person_with_id(
    &self,
    id: Uuid,
    input: NewPerson,
  ) -> Result<Person> {
    self.create_person(id, input).await
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"
              ),
              rusqlite::params![id_str],
              raw_person_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_persons(&self, manager: Option<Uuid>) -> Result<Vec<Person>> {
    match manager {
      Some(manager_id) => {
        self
          .select_persons(
            format!(
              "SELECT {PERSON_COLUMNS} FROM persons WHERE manager_id = ?1"
            ),
            vec![encode_uuid(manager_id)],
          )
          .await
      }
      None => {
        self
          .select_persons(
            format!("SELECT {PERSON_COLUMNS} FROM persons"),
            Vec::new(),
          )
          .await
      }
    }
  }

  async fn update_person(&self, person: &Person) -> Result<()> {
    let person_id       = encode_uuid(person.person_id);
    let name            = person.name.clone();
    let nickname        = person.nickname.clone();
    let gender          = encode_gender(person.gender).to_owned();
    let birth_order     = person.birth_order;
    let address         = person.address.clone();
    let city            = person.city.clone();
    let phone           = person.phone.clone();
    let born_on         = encode_date_opt(person.born_on);
    let birth_year      = person.birth_year;
    let died_on         = encode_date_opt(person.died_on);
    let death_year      = person.death_year;
    let father_id       = encode_uuid_opt(person.father_id);
    let mother_id       = encode_uuid_opt(person.mother_id);
    let parent_union_id = encode_uuid_opt(person.parent_union_id);
    let manager_id      = encode_uuid_opt(person.manager_id);

    let rows = self
      .conn
      .call(move |conn| {
        let rows = conn.execute(
          "UPDATE persons SET
             name = ?2, nickname = ?3, gender = ?4, birth_order = ?5,
             address = ?6, city = ?7, phone = ?8, born_on = ?9,
             birth_year = ?10, died_on = ?11, death_year = ?12,
             father_id = ?13, mother_id = ?14, parent_union_id = ?15,
             manager_id = ?16
           WHERE person_id = ?1",
          rusqlite::params![
            person_id,
            name,
            nickname,
            gender,
            birth_order,
            address,
            city,
            phone,
            born_on,
            birth_year,
            died_on,
            death_year,
            father_id,
            mother_id,
            parent_union_id,
            manager_id,
          ],
        )?;
        Ok(rows)
      })
      .await?;

    if rows == 0 {
      return Err(Error::PersonNotFound(person.person_id));
    }
    Ok(())
  }

  // ── Lineage queries ───────────────────────────────────────────────────────

  async fn children_of(
    &self,
    parent_id: Uuid,
    role: ParentRole,
  ) -> Result<Vec<Person>> {
    let column = match role {
      ParentRole::Father => "father_id",
      ParentRole::Mother => "mother_id",
    };
    self
      .select_persons(
        format!(
          "SELECT {PERSON_COLUMNS} FROM persons WHERE {column} = ?1
           ORDER BY birth_order ASC"
        ),
        vec![encode_uuid(parent_id)],
      )
      .await
  }

  async fn children_of_union(&self, union_id: Uuid) -> Result<Vec<Person>> {
    self
      .select_persons(
        format!(
          "SELECT {PERSON_COLUMNS} FROM persons WHERE parent_union_id = ?1
           ORDER BY birth_order ASC"
        ),
        vec![encode_uuid(union_id)],
      )
      .await
  }

  // ── Unions ────────────────────────────────────────────────────────────────

  async fn add_union(&self, input: NewUnion) -> Result<Union> {
    let union = Union {
      union_id:   Uuid::new_v4(),
      created_at: Utc::now(),
      husband_id: input.husband_id,
      wife_id:    input.wife_id,
      married_on: input.married_on,
      manager_id: input.manager_id,
    };

    let union_id   = encode_uuid(union.union_id);
    let created_at = encode_dt(union.created_at);
    let husband_id = encode_uuid(union.husband_id);
    let wife_id    = encode_uuid(union.wife_id);
    let married_on = encode_date_opt(union.married_on);
    let manager_id = encode_uuid_opt(union.manager_id);

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO unions (
             union_id, created_at, husband_id, wife_id, married_on, manager_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            union_id,
            created_at,
            husband_id,
            wife_id,
            married_on,
            manager_id,
          ],
        )?;
        Ok(())
      })
      .await;

    if let Err(e) = inserted {
      if constraint_violation(&e, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
        return Err(Error::UnionExists {
          husband_id: union.husband_id,
          wife_id:    union.wife_id,
        });
      }
      return Err(e.into());
    }
    Ok(union)
  }

  async fn get_union(&self, id: Uuid) -> Result<Option<Union>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUnion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {UNION_COLUMNS} FROM unions WHERE union_id = ?1"
              ),
              rusqlite::params![id_str],
              raw_union_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUnion::into_union).transpose()
  }

  async fn list_unions(&self, manager: Option<Uuid>) -> Result<Vec<Union>> {
    match manager {
      Some(manager_id) => {
        self
          .select_unions(
            format!(
              "SELECT {UNION_COLUMNS} FROM unions WHERE manager_id = ?1"
            ),
            vec![encode_uuid(manager_id)],
          )
          .await
      }
      None => {
        self
          .select_unions(
            format!("SELECT {UNION_COLUMNS} FROM unions"),
            Vec::new(),
          )
          .await
      }
    }
  }

  async fn unions_for(
    &self,
    person_id: Uuid,
    role: ParentRole,
  ) -> Result<Vec<Union>> {
    let column = match role {
      ParentRole::Father => "husband_id",
      ParentRole::Mother => "wife_id",
    };
    self
      .select_unions(
        format!(
          "SELECT {UNION_COLUMNS} FROM unions WHERE {column} = ?1
           ORDER BY married_on IS NULL, married_on ASC, created_at ASC"
        ),
        vec![encode_uuid(person_id)],
      )
      .await
  }

  async fn union_between(&self, a: Uuid, b: Uuid) -> Result<Option<Union>> {
    let a_str = encode_uuid(a);
    let b_str = encode_uuid(b);

    let raw: Option<RawUnion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {UNION_COLUMNS} FROM unions
                 WHERE (husband_id = ?1 AND wife_id = ?2)
                    OR (husband_id = ?2 AND wife_id = ?1)"
              ),
              rusqlite::params![a_str, b_str],
              raw_union_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUnion::into_union).transpose()
  }
}
