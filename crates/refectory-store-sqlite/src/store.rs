//! [`SqliteStore`] — the SQLite implementation of [`DiningStore`].

use std::path::Path;

use chrono::Utc;
use refectory_core::{
  Error as CoreError,
  canteen::{Canteen, CanteenUpdate, NewCanteen},
  comment::{Comment, CommentUpdate, NewComment, has_text},
  dish::{Dish, DishQuery, DishUpdate, NewDish, Pricing},
  feedback::{Feedback, FeedbackReply, NewFeedback},
  mark::{Mark, NewMark},
  promo::{Carousel, NewCarousel, NewDishFlag},
  rating::RatingState,
  store::DiningStore,
  user::{Admin, PrivilegeSet, User, UserUpdate},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{
    ADMIN_COLUMNS, COMMENT_COLUMNS, FEEDBACK_COLUMNS, RawAdmin, RawComment,
    RawFeedback, RawMark, encode_dt,
  },
  schema::SCHEMA,
};

/// Domain outcome computed inside a connection closure; backend faults take
/// the outer [`tokio_rusqlite::Error`] lane.
type Domain<T> = std::result::Result<T, CoreError>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Refectory dining store backed by a single SQLite file.
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
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

const USER_COLUMNS: &str = "id, display_name, external_id, is_admin, avatar";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:           row.get(0)?,
    display_name: row.get(1)?,
    external_id:  row.get(2)?,
    is_admin:     row.get(3)?,
    avatar:       row.get(4)?,
  })
}

const CANTEEN_COLUMNS: &str =
  "id, name, description, campus, image, icon, floors_count";

fn canteen_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Canteen> {
  Ok(Canteen {
    id:           row.get(0)?,
    name:         row.get(1)?,
    description:  row.get(2)?,
    campus:       row.get(3)?,
    image:        row.get(4)?,
    icon:         row.get(5)?,
    floors_count: row.get(6)?,
  })
}

const DISH_COLUMNS: &str = "id, canteen, floor, window, name, price, measure, \
   image, average_vote, count_of_votes, count_of_comments, count_of_mark";

fn dish_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Dish> {
  Ok(Dish {
    id:      row.get(0)?,
    canteen: row.get(1)?,
    floor:   row.get(2)?,
    window:  row.get(3)?,
    name:    row.get(4)?,
    price:   row.get(5)?,
    measure: row.get(6)?,
    image:   row.get(7)?,
    average_vote:      row.get(8)?,
    count_of_votes:    row.get(9)?,
    count_of_comments: row.get(10)?,
    count_of_mark:     row.get(11)?,
  })
}

/// Read a dish's rating aggregates inside the current transaction.
/// `None` means the dish row is missing.
fn read_rating(
  conn: &rusqlite::Connection,
  dish_id: i64,
) -> rusqlite::Result<Option<RatingState>> {
  conn
    .query_row(
      "SELECT average_vote, count_of_votes, count_of_comments
       FROM dishes WHERE id = ?1",
      rusqlite::params![dish_id],
      |row| {
        Ok(RatingState {
          average_vote:      row.get(0)?,
          count_of_votes:    row.get(1)?,
          count_of_comments: row.get(2)?,
        })
      },
    )
    .optional()
}

/// Write a dish's rating aggregates inside the current transaction.
fn write_rating(
  conn: &rusqlite::Connection,
  dish_id: i64,
  state: &RatingState,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE dishes
     SET average_vote = ?1, count_of_votes = ?2, count_of_comments = ?3
     WHERE id = ?4",
    rusqlite::params![
      state.average_vote,
      state.count_of_votes,
      state.count_of_comments,
      dish_id,
    ],
  )?;
  Ok(())
}

// ─── DiningStore impl ────────────────────────────────────────────────────────

impl DiningStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(
    &self,
    display_name: &str,
    external_id: Option<&str>,
    is_admin: bool,
  ) -> Result<User> {
    let display_name = display_name.to_owned();
    let external_id  = external_id.map(str::to_owned);

    let user = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (display_name, external_id, is_admin)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![display_name, external_id, is_admin],
        )?;
        Ok(User {
          id: conn.last_insert_rowid(),
          display_name,
          external_id,
          is_admin,
          avatar: None,
        })
      })
      .await?;

    Ok(user)
  }

  async fn user(&self, id: i64) -> Result<Option<User>> {
    let user = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
              rusqlite::params![id],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(user)
  }

  async fn user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
    let external_id = external_id.to_owned();
    let user = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS} FROM users WHERE external_id = ?1"
              ),
              rusqlite::params![external_id],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(user)
  }

  async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User> {
    let out: Domain<User> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users
           SET display_name = COALESCE(?1, display_name),
               avatar       = COALESCE(?2, avatar)
           WHERE id = ?3",
          rusqlite::params![update.display_name, update.avatar, id],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::UserNotFound(id)));
        }
        let user = conn.query_row(
          &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
          rusqlite::params![id],
          user_from_row,
        )?;
        Ok(Ok(user))
      })
      .await?;
    Ok(out?)
  }

  // ── Admins ────────────────────────────────────────────────────────────────

  async fn register_admin(
    &self,
    access_name: &str,
    password_hash: &str,
    privileges: &PrivilegeSet,
  ) -> Result<(User, Admin)> {
    let access_name    = access_name.to_owned();
    let password_hash  = password_hash.to_owned();
    let privileges     = privileges.clone();
    let privileges_str = privileges.encode();

    let out: Domain<(User, Admin)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken: bool = tx
          .query_row(
            "SELECT 1 FROM admins WHERE access_name = ?1",
            rusqlite::params![access_name],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(Err(CoreError::AccessNameTaken(access_name)));
        }

        tx.execute(
          "INSERT INTO users (display_name, external_id, is_admin)
           VALUES (?1, NULL, 1)",
          rusqlite::params![access_name],
        )?;
        let user_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO admins (user_id, access_name, password_hash, privileges)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id, access_name, password_hash, privileges_str],
        )?;
        let admin_id = tx.last_insert_rowid();

        tx.commit()?;

        let user = User {
          id:           user_id,
          display_name: access_name.clone(),
          external_id:  None,
          is_admin:     true,
          avatar:       None,
        };
        let admin = Admin {
          id:          admin_id,
          user_id,
          access_name,
          password_hash,
          privileges,
        };
        Ok(Ok((user, admin)))
      })
      .await?;
    Ok(out?)
  }

  async fn admin_by_access_name(&self, access_name: &str) -> Result<Option<Admin>> {
    let access_name = access_name.to_owned();
    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ADMIN_COLUMNS} FROM admins WHERE access_name = ?1"
              ),
              rusqlite::params![access_name],
              RawAdmin::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawAdmin::into_admin).transpose()
  }

  async fn admin_by_user_id(&self, user_id: i64) -> Result<Option<Admin>> {
    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE user_id = ?1"),
              rusqlite::params![user_id],
              RawAdmin::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawAdmin::into_admin).transpose()
  }

  async fn admin_count(&self) -> Result<i64> {
    let count = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?)
      })
      .await?;
    Ok(count)
  }

  // ── Canteens ──────────────────────────────────────────────────────────────

  async fn add_canteen(&self, canteen: NewCanteen) -> Result<Canteen> {
    let added = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO canteens (name, description, campus, image, icon, floors_count)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            canteen.name,
            canteen.description,
            canteen.campus,
            canteen.image,
            canteen.icon,
            canteen.floors_count,
          ],
        )?;
        Ok(Canteen {
          id:           conn.last_insert_rowid(),
          name:         canteen.name,
          description:  canteen.description,
          campus:       canteen.campus,
          image:        canteen.image,
          icon:         canteen.icon,
          floors_count: canteen.floors_count,
        })
      })
      .await?;
    Ok(added)
  }

  async fn canteen(&self, id: i64) -> Result<Option<Canteen>> {
    let canteen = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CANTEEN_COLUMNS} FROM canteens WHERE id = ?1"),
              rusqlite::params![id],
              canteen_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(canteen)
  }

  async fn list_canteens(&self) -> Result<Vec<Canteen>> {
    let canteens = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {CANTEEN_COLUMNS} FROM canteens ORDER BY id"))?;
        let rows = stmt
          .query_map([], canteen_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(canteens)
  }

  async fn canteens_by_campus(&self, campus: &str) -> Result<Vec<Canteen>> {
    let campus = campus.to_owned();
    let canteens = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CANTEEN_COLUMNS} FROM canteens WHERE campus = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![campus], canteen_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(canteens)
  }

  async fn update_canteen(&self, id: i64, update: CanteenUpdate) -> Result<Canteen> {
    let out: Domain<Canteen> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE canteens
           SET name        = COALESCE(?1, name),
               description = COALESCE(?2, description),
               image       = COALESCE(?3, image)
           WHERE id = ?4",
          rusqlite::params![update.name, update.description, update.image, id],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::CanteenNotFound(id)));
        }
        let canteen = conn.query_row(
          &format!("SELECT {CANTEEN_COLUMNS} FROM canteens WHERE id = ?1"),
          rusqlite::params![id],
          canteen_from_row,
        )?;
        Ok(Ok(canteen))
      })
      .await?;
    Ok(out?)
  }

  async fn delete_canteen(&self, id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let changed =
          conn.execute("DELETE FROM canteens WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
          return Ok(Err(CoreError::CanteenNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  // ── Dishes ────────────────────────────────────────────────────────────────

  async fn add_dish(&self, dish: NewDish) -> Result<Dish> {
    let added = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO dishes (canteen, floor, window, name, price, measure, image)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            dish.canteen,
            dish.floor,
            dish.window,
            dish.name,
            dish.price,
            dish.measure,
            dish.image,
          ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Dish {
          id,
          canteen: dish.canteen,
          floor:   dish.floor,
          window:  dish.window,
          name:    dish.name,
          price:   dish.price,
          measure: dish.measure,
          image:   dish.image,
          average_vote:      refectory_core::rating::VOTE_SCALE_MIDPOINT,
          count_of_votes:    0,
          count_of_comments: 0,
          count_of_mark:     0,
        })
      })
      .await?;
    Ok(added)
  }

  async fn dish(&self, id: i64) -> Result<Option<Dish>> {
    let dish = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = ?1"),
              rusqlite::params![id],
              dish_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(dish)
  }

  async fn dishes(&self, query: &DishQuery) -> Result<Vec<Dish>> {
    let query = query.clone();
    let dishes = self
      .conn
      .call(move |conn| {
        // Build the WHERE clause from whichever location parts were given.
        let mut sql =
          format!("SELECT {DISH_COLUMNS} FROM dishes WHERE canteen = ?");
        let mut params: Vec<rusqlite::types::Value> =
          vec![query.canteen.into()];

        if let Some(floor) = query.floor {
          sql.push_str(" AND floor = ?");
          params.push(floor.into());
        }
        if let Some(window) = query.window {
          sql.push_str(" AND window = ?");
          params.push(window.into());
        }
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        params.push((query.limit as i64).into());
        params.push((query.skip as i64).into());

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), dish_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(dishes)
  }

  async fn search_dishes(
    &self,
    name: &str,
    skip: usize,
    limit: usize,
  ) -> Result<Vec<Dish>> {
    let pattern = format!("%{name}%");
    let dishes = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DISH_COLUMNS} FROM dishes WHERE name LIKE ?1
           ORDER BY id LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![pattern, limit as i64, skip as i64],
            dish_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(dishes)
  }

  async fn update_dish(&self, id: i64, update: DishUpdate) -> Result<Dish> {
    let out: Domain<Dish> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE dishes
           SET name    = COALESCE(?1, name),
               price   = COALESCE(?2, price),
               measure = COALESCE(?3, measure),
               image   = COALESCE(?4, image)
           WHERE id = ?5",
          rusqlite::params![
            update.name,
            update.price,
            update.measure,
            update.image,
            id,
          ],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::DishNotFound(id)));
        }
        let dish = conn.query_row(
          &format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = ?1"),
          rusqlite::params![id],
          dish_from_row,
        )?;
        Ok(Ok(dish))
      })
      .await?;
    Ok(out?)
  }

  async fn update_dish_pricing(&self, id: i64, pricing: Pricing) -> Result<Dish> {
    let out: Domain<Dish> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE dishes SET price = ?1, measure = ?2 WHERE id = ?3",
          rusqlite::params![pricing.price, pricing.measure, id],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::DishNotFound(id)));
        }
        let dish = conn.query_row(
          &format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = ?1"),
          rusqlite::params![id],
          dish_from_row,
        )?;
        Ok(Ok(dish))
      })
      .await?;
    Ok(out?)
  }

  async fn delete_dish(&self, id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let changed =
          conn.execute("DELETE FROM dishes WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
          return Ok(Err(CoreError::DishNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  // ── Comments + rating aggregates ──────────────────────────────────────────

  async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
    let now      = Utc::now();
    let time_str = encode_dt(now);

    let out: Domain<Comment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(mut state) = read_rating(&tx, comment.dish_id)? else {
          return Ok(Err(CoreError::DishNotFound(comment.dish_id)));
        };

        let duplicate: bool = tx
          .query_row(
            "SELECT 1 FROM comments WHERE user_id = ?1 AND dish_id = ?2",
            rusqlite::params![comment.user_id, comment.dish_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if duplicate {
          return Ok(Err(CoreError::DuplicateRating {
            user_id: comment.user_id,
            dish_id: comment.dish_id,
          }));
        }

        tx.execute(
          "INSERT INTO comments (user_id, dish_id, content, vote, time, reply_to)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            comment.user_id,
            comment.dish_id,
            comment.content,
            comment.vote,
            time_str,
            comment.reply_to,
          ],
        )?;
        let id = tx.last_insert_rowid();

        state.record(comment.vote, has_text(comment.content.as_deref()));
        write_rating(&tx, comment.dish_id, &state)?;

        tx.commit()?;

        Ok(Ok(Comment {
          id,
          user_id: comment.user_id,
          dish_id: comment.dish_id,
          content: comment.content,
          vote:    comment.vote,
          content_visible: true,
          time:    now,
          reply_to: comment.reply_to,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn comment(&self, id: i64) -> Result<Option<Comment>> {
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
              rusqlite::params![id],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawComment::into_comment).transpose()
  }

  async fn comments_by_dish(
    &self,
    dish_id: i64,
    skip: usize,
    limit: usize,
  ) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments WHERE dish_id = ?1
           ORDER BY time DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![dish_id, limit as i64, skip as i64],
            RawComment::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn update_comment(&self, id: i64, update: CommentUpdate) -> Result<Comment> {
    let out: Domain<RawComment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(existing) = tx
          .query_row(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
            rusqlite::params![id],
            RawComment::from_row,
          )
          .optional()?
        else {
          return Ok(Err(CoreError::CommentNotFound(id)));
        };

        // The dish row is read and written in the same transaction as the
        // comment row; missing here would mean a broken foreign key.
        let Some(mut state) = read_rating(&tx, existing.dish_id)? else {
          return Ok(Err(CoreError::DishNotFound(existing.dish_id)));
        };

        state.revise(
          existing.vote,
          update.vote,
          has_text(existing.content.as_deref()),
          has_text(update.content.as_deref()),
        );

        tx.execute(
          "UPDATE comments SET content = ?1, vote = ?2 WHERE id = ?3",
          rusqlite::params![update.content, update.vote, id],
        )?;
        write_rating(&tx, existing.dish_id, &state)?;

        tx.commit()?;

        Ok(Ok(RawComment {
          content: update.content,
          vote: update.vote,
          ..existing
        }))
      })
      .await?;
    out?.into_comment()
  }

  async fn delete_comment(&self, id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(existing) = tx
          .query_row(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
            rusqlite::params![id],
            RawComment::from_row,
          )
          .optional()?
        else {
          return Ok(Err(CoreError::CommentNotFound(id)));
        };

        let Some(mut state) = read_rating(&tx, existing.dish_id)? else {
          return Ok(Err(CoreError::DishNotFound(existing.dish_id)));
        };

        state.erase(existing.vote, has_text(existing.content.as_deref()));

        // A reply chain may point at this row; detach children first.
        tx.execute(
          "UPDATE comments SET reply_to = NULL WHERE reply_to = ?1",
          rusqlite::params![id],
        )?;
        tx.execute("DELETE FROM comments WHERE id = ?1", rusqlite::params![id])?;
        write_rating(&tx, existing.dish_id, &state)?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  // ── Marks ─────────────────────────────────────────────────────────────────

  async fn add_mark(&self, mark: NewMark) -> Result<Mark> {
    let now      = Utc::now();
    let time_str = encode_dt(now);

    let out: Domain<Mark> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM dishes WHERE id = ?1",
            rusqlite::params![mark.dish_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(Err(CoreError::DishNotFound(mark.dish_id)));
        }

        tx.execute(
          "INSERT INTO marks (user_id, dish_id, time) VALUES (?1, ?2, ?3)",
          rusqlite::params![mark.user_id, mark.dish_id, time_str],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
          "UPDATE dishes SET count_of_mark = count_of_mark + 1 WHERE id = ?1",
          rusqlite::params![mark.dish_id],
        )?;

        tx.commit()?;

        Ok(Ok(Mark {
          id,
          user_id: mark.user_id,
          dish_id: mark.dish_id,
          time:    now,
        }))
      })
      .await?;
    Ok(out?)
  }

  async fn mark(&self, id: i64) -> Result<Option<Mark>> {
    let raw: Option<RawMark> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, user_id, dish_id, time FROM marks WHERE id = ?1",
              rusqlite::params![id],
              RawMark::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawMark::into_mark).transpose()
  }

  async fn marks_by_user(
    &self,
    user_id: i64,
    skip: usize,
    limit: usize,
  ) -> Result<Vec<Mark>> {
    let raws: Vec<RawMark> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, dish_id, time FROM marks WHERE user_id = ?1
           ORDER BY time DESC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id, limit as i64, skip as i64],
            RawMark::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawMark::into_mark).collect()
  }

  async fn mark_count_for_dish(&self, dish_id: i64) -> Result<i64> {
    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM marks WHERE dish_id = ?1",
          rusqlite::params![dish_id],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count)
  }

  async fn delete_mark(&self, id: i64, requester_id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some((owner_id, dish_id)) = tx
          .query_row(
            "SELECT user_id, dish_id FROM marks WHERE id = ?1",
            rusqlite::params![id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
          )
          .optional()?
        else {
          return Ok(Err(CoreError::MarkNotFound(id)));
        };
        if owner_id != requester_id {
          return Ok(Err(CoreError::NotMarkOwner(id)));
        }

        tx.execute("DELETE FROM marks WHERE id = ?1", rusqlite::params![id])?;
        tx.execute(
          "UPDATE dishes SET count_of_mark = MAX(count_of_mark - 1, 0)
           WHERE id = ?1",
          rusqlite::params![dish_id],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn create_feedback(&self, feedback: NewFeedback) -> Result<Feedback> {
    let now      = Utc::now();
    let time_str = encode_dt(now);

    let added = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feedbacks (user_id, content, time, towards)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![feedback.user_id, feedback.content, time_str, feedback.towards],
        )?;
        Ok(Feedback {
          id:         conn.last_insert_rowid(),
          user_id:    feedback.user_id,
          content:    feedback.content,
          time:       now,
          towards:    feedback.towards,
          reply:      None,
          reply_time: None,
          reply_uid:  None,
        })
      })
      .await?;
    Ok(added)
  }

  async fn feedback(&self, id: i64) -> Result<Option<Feedback>> {
    let raw: Option<RawFeedback> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE id = ?1"),
              rusqlite::params![id],
              RawFeedback::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawFeedback::into_feedback).transpose()
  }

  async fn feedback_by_user(
    &self,
    user_id: i64,
    skip: usize,
    limit: usize,
  ) -> Result<Vec<Feedback>> {
    let raws: Vec<RawFeedback> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE user_id = ?1
           ORDER BY time DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id, limit as i64, skip as i64],
            RawFeedback::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawFeedback::into_feedback).collect()
  }

  async fn feedback_by_target(
    &self,
    towards: i64,
    replied: Option<bool>,
  ) -> Result<Vec<Feedback>> {
    let raws: Vec<RawFeedback> = self
      .conn
      .call(move |conn| {
        let mut sql = format!(
          "SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE towards = ?1"
        );
        match replied {
          Some(true) => sql.push_str(" AND reply IS NOT NULL"),
          Some(false) => sql.push_str(" AND reply IS NULL"),
          None => {}
        }
        sql.push_str(" ORDER BY time DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![towards], RawFeedback::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawFeedback::into_feedback).collect()
  }

  async fn update_feedback(
    &self,
    id: i64,
    user_id: i64,
    content: &str,
  ) -> Result<Feedback> {
    let content  = content.to_owned();
    let time_str = encode_dt(Utc::now());

    let out: Domain<RawFeedback> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(existing) = tx
          .query_row(
            &format!("SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE id = ?1"),
            rusqlite::params![id],
            RawFeedback::from_row,
          )
          .optional()?
        else {
          return Ok(Err(CoreError::FeedbackNotFound(id)));
        };
        if existing.user_id != user_id {
          return Ok(Err(CoreError::NotFeedbackOwner(id)));
        }

        tx.execute(
          "UPDATE feedbacks SET content = ?1, time = ?2 WHERE id = ?3",
          rusqlite::params![content, time_str, id],
        )?;
        tx.commit()?;

        Ok(Ok(RawFeedback { content, time: time_str, ..existing }))
      })
      .await?;
    out?.into_feedback()
  }

  async fn reply_feedback(&self, reply: FeedbackReply) -> Result<Feedback> {
    let time_str = encode_dt(Utc::now());

    let out: Domain<RawFeedback> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(existing) = tx
          .query_row(
            &format!("SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE id = ?1"),
            rusqlite::params![reply.feedback_id],
            RawFeedback::from_row,
          )
          .optional()?
        else {
          return Ok(Err(CoreError::FeedbackNotFound(reply.feedback_id)));
        };

        tx.execute(
          "UPDATE feedbacks SET reply = ?1, reply_time = ?2, reply_uid = ?3
           WHERE id = ?4",
          rusqlite::params![reply.content, time_str, reply.user_id, reply.feedback_id],
        )?;
        tx.commit()?;

        Ok(Ok(RawFeedback {
          reply:      Some(reply.content),
          reply_time: Some(time_str),
          reply_uid:  Some(reply.user_id),
          ..existing
        }))
      })
      .await?;
    out?.into_feedback()
  }

  // ── Promotions ────────────────────────────────────────────────────────────

  async fn add_carousel(&self, carousel: NewCarousel) -> Result<Carousel> {
    let added = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO carousels (canteen, image) VALUES (?1, ?2)",
          rusqlite::params![carousel.canteen, carousel.image],
        )?;
        Ok(Carousel {
          id:      conn.last_insert_rowid(),
          canteen: carousel.canteen,
          image:   carousel.image,
        })
      })
      .await?;
    Ok(added)
  }

  async fn carousels_by_canteen(&self, canteen: i64) -> Result<Vec<Carousel>> {
    let carousels = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, canteen, image FROM carousels
           WHERE canteen = ?1 OR canteen IS NULL ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![canteen], |row| {
            Ok(Carousel {
              id:      row.get(0)?,
              canteen: row.get(1)?,
              image:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(carousels)
  }

  async fn delete_carousel(&self, id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let changed = conn
          .execute("DELETE FROM carousels WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
          return Ok(Err(CoreError::CarouselNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }

  async fn flag_new_dish(&self, dish_id: i64) -> Result<NewDishFlag> {
    let out: Domain<NewDishFlag> = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM dishes WHERE id = ?1",
            rusqlite::params![dish_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(Err(CoreError::DishNotFound(dish_id)));
        }

        conn.execute(
          "INSERT INTO new_dishes (dish_id) VALUES (?1)",
          rusqlite::params![dish_id],
        )?;
        Ok(Ok(NewDishFlag { id: conn.last_insert_rowid(), dish_id }))
      })
      .await?;
    Ok(out?)
  }

  async fn new_dishes_by_canteen(&self, canteen: i64) -> Result<Vec<Dish>> {
    let dishes = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT d.id, d.canteen, d.floor, d.window, d.name, d.price,
                  d.measure, d.image, d.average_vote, d.count_of_votes,
                  d.count_of_comments, d.count_of_mark
           FROM new_dishes n JOIN dishes d ON d.id = n.dish_id
           WHERE d.canteen = ?1 ORDER BY n.id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![canteen], dish_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(dishes)
  }

  async fn unflag_new_dish(&self, id: i64) -> Result<()> {
    let out: Domain<()> = self
      .conn
      .call(move |conn| {
        let changed = conn
          .execute("DELETE FROM new_dishes WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
          return Ok(Err(CoreError::NewDishFlagNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out?)
  }
}
