//! Integration tests for `SqliteStore` against an in-memory database.

use refectory_core::{
  Error as CoreError,
  canteen::NewCanteen,
  comment::{CommentUpdate, NewComment},
  dish::{DishQuery, NewDish, Pricing},
  feedback::{FeedbackReply, NewFeedback},
  mark::NewMark,
  promo::NewCarousel,
  rating::VOTE_SCALE_MIDPOINT,
  store::DiningStore,
  user::PrivilegeSet,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seed_dish(s: &SqliteStore) -> i64 {
  let canteen = s
    .add_canteen(NewCanteen {
      name:         "North".into(),
      description:  "north campus canteen".into(),
      campus:       "north".into(),
      image:        None,
      icon:         None,
      floors_count: 2,
    })
    .await
    .unwrap();

  s.add_dish(NewDish {
    canteen: canteen.id,
    floor:   1,
    window:  3,
    name:    "mapo tofu".into(),
    price:   Some(8.5),
    measure: "serving".into(),
    image:   None,
  })
  .await
  .unwrap()
  .id
}

async fn seed_user(s: &SqliteStore, external_id: &str) -> i64 {
  s.create_user("Alice", Some(external_id), false)
    .await
    .unwrap()
    .id
}

fn rate(user_id: i64, dish_id: i64, vote: f64, content: Option<&str>) -> NewComment {
  NewComment {
    user_id,
    dish_id,
    content: content.map(str::to_owned),
    vote,
    reply_to: None,
  }
}

fn assert_close(a: f64, b: f64) {
  assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

// ─── Users and admins ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;
  let user = s.create_user("Alice", Some("202400001"), false).await.unwrap();

  let fetched = s.user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.display_name, "Alice");
  assert_eq!(fetched.external_id.as_deref(), Some("202400001"));
  assert!(!fetched.is_admin);

  let by_ext = s.user_by_external_id("202400001").await.unwrap().unwrap();
  assert_eq!(by_ext.id, user.id);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.user(42).await.unwrap().is_none());
  assert!(s.user_by_external_id("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn update_user_profile() {
  let s = store().await;
  let id = seed_user(&s, "202400001").await;

  let updated = s
    .update_user(id, refectory_core::user::UserUpdate {
      display_name: Some("Alice L".into()),
      avatar:       Some("avatars/1".into()),
    })
    .await
    .unwrap();
  assert_eq!(updated.display_name, "Alice L");
  assert_eq!(updated.avatar.as_deref(), Some("avatars/1"));

  // Partial update leaves the other field alone.
  let updated = s
    .update_user(id, refectory_core::user::UserUpdate {
      display_name: None,
      avatar:       Some("avatars/2".into()),
    })
    .await
    .unwrap();
  assert_eq!(updated.display_name, "Alice L");
  assert_eq!(updated.avatar.as_deref(), Some("avatars/2"));
}

#[tokio::test]
async fn register_admin_creates_user_and_admin() {
  let s = store().await;
  assert_eq!(s.admin_count().await.unwrap(), 0);

  let (user, admin) = s
    .register_admin("chef", "$argon2id$stub", &PrivilegeSet::all())
    .await
    .unwrap();
  assert!(user.is_admin);
  assert_eq!(admin.user_id, user.id);
  assert_eq!(s.admin_count().await.unwrap(), 1);

  let fetched = s.admin_by_access_name("chef").await.unwrap().unwrap();
  assert_eq!(fetched.id, admin.id);
  assert_eq!(fetched.privileges, PrivilegeSet::all());

  let by_user = s.admin_by_user_id(user.id).await.unwrap().unwrap();
  assert_eq!(by_user.id, admin.id);
}

#[tokio::test]
async fn register_admin_rejects_taken_name() {
  let s = store().await;
  s.register_admin("chef", "$argon2id$stub", &PrivilegeSet::all())
    .await
    .unwrap();

  let err = s
    .register_admin("chef", "$argon2id$other", &PrivilegeSet::all())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AccessNameTaken(_))));
  assert_eq!(s.admin_count().await.unwrap(), 1);
}

// ─── Dishes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_dish_starts_at_scale_midpoint() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;

  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, VOTE_SCALE_MIDPOINT);
  assert_eq!(dish.count_of_votes, 0);
  assert_eq!(dish.count_of_comments, 0);
  assert_eq!(dish.count_of_mark, 0);
}

#[tokio::test]
async fn dishes_filtered_by_location() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let canteen = s.dish(dish_id).await.unwrap().unwrap().canteen;

  s.add_dish(NewDish {
    canteen,
    floor:   2,
    window:  1,
    name:    "noodles".into(),
    price:   None,
    measure: "bowl".into(),
    image:   None,
  })
  .await
  .unwrap();

  let all = s.dishes(&DishQuery::canteen(canteen)).await.unwrap();
  assert_eq!(all.len(), 2);

  let floor_one = s
    .dishes(&DishQuery { floor: Some(1), ..DishQuery::canteen(canteen) })
    .await
    .unwrap();
  assert_eq!(floor_one.len(), 1);
  assert_eq!(floor_one[0].name, "mapo tofu");

  let window = s
    .dishes(&DishQuery {
      floor:  Some(1),
      window: Some(99),
      ..DishQuery::canteen(canteen)
    })
    .await
    .unwrap();
  assert!(window.is_empty());
}

#[tokio::test]
async fn search_dishes_by_substring() {
  let s = store().await;
  seed_dish(&s).await;

  let hits = s.search_dishes("tofu", 0, 10).await.unwrap();
  assert_eq!(hits.len(), 1);

  let none = s.search_dishes("pizza", 0, 10).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn update_pricing() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;

  let dish = s
    .update_dish_pricing(dish_id, Pricing { price: 9.0, measure: "bowl".into() })
    .await
    .unwrap();
  assert_eq!(dish.price, Some(9.0));
  assert_eq!(dish.measure, "bowl");

  let err = s
    .update_dish_pricing(999, Pricing { price: 9.0, measure: "bowl".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DishNotFound(999))));
}

// ─── Rating aggregates ───────────────────────────────────────────────────────

#[tokio::test]
async fn comment_lifecycle_keeps_aggregates_consistent() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let alice = seed_user(&s, "202400001").await;
  let bob = s.create_user("Bob", Some("202400002"), false).await.unwrap().id;

  let first = s
    .create_comment(rate(alice, dish_id, 5.0, None))
    .await
    .unwrap();
  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, 5.0);
  assert_eq!(dish.count_of_votes, 1);
  assert_eq!(dish.count_of_comments, 0);

  let second = s
    .create_comment(rate(bob, dish_id, 3.0, Some("too salty")))
    .await
    .unwrap();
  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, 4.0);
  assert_eq!(dish.count_of_votes, 2);
  assert_eq!(dish.count_of_comments, 1);

  // Revise the first vote 5 → 1: (4.0*2 - 5 + 1) / 2 = 2.0, the mean of
  // the remaining votes {1, 3}.
  s.update_comment(first.id, CommentUpdate { content: None, vote: 1.0 })
    .await
    .unwrap();
  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, 2.0);
  assert_eq!(dish.count_of_votes, 2);

  // Remove the second: (2.0*2 - 3) / 1 leaves the first comment's vote.
  s.delete_comment(second.id).await.unwrap();
  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, 1.0);
  assert_eq!(dish.count_of_votes, 1);
  assert_eq!(dish.count_of_comments, 0);

  // Remove the last: back to the midpoint, never a division by zero.
  s.delete_comment(first.id).await.unwrap();
  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, VOTE_SCALE_MIDPOINT);
  assert_eq!(dish.count_of_votes, 0);
}

#[tokio::test]
async fn replayed_votes_match_arithmetic_mean() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;

  let votes = [1.0, 2.5, 4.0, 5.0, 3.5];
  for (i, vote) in votes.iter().enumerate() {
    let uid = s
      .create_user("User", Some(&format!("20240000{i}")), false)
      .await
      .unwrap()
      .id;
    s.create_comment(rate(uid, dish_id, *vote, Some("text")))
      .await
      .unwrap();
  }

  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, votes.iter().sum::<f64>() / votes.len() as f64);
  assert_eq!(dish.count_of_votes, votes.len() as i64);
  assert_eq!(dish.count_of_comments, votes.len() as i64);
}

#[tokio::test]
async fn duplicate_rating_is_rejected() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let alice = seed_user(&s, "202400001").await;

  s.create_comment(rate(alice, dish_id, 4.0, None)).await.unwrap();
  let err = s
    .create_comment(rate(alice, dish_id, 2.0, None))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateRating { .. })
  ));

  // The rejected attempt must not have touched the aggregates.
  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_close(dish.average_vote, 4.0);
  assert_eq!(dish.count_of_votes, 1);
}

#[tokio::test]
async fn comment_on_missing_dish_fails() {
  let s = store().await;
  let alice = seed_user(&s, "202400001").await;

  let err = s.create_comment(rate(alice, 999, 4.0, None)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DishNotFound(999))));
}

#[tokio::test]
async fn blank_content_does_not_count_as_comment() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let alice = seed_user(&s, "202400001").await;

  s.create_comment(rate(alice, dish_id, 4.0, Some("   ")))
    .await
    .unwrap();
  let dish = s.dish(dish_id).await.unwrap().unwrap();
  assert_eq!(dish.count_of_votes, 1);
  assert_eq!(dish.count_of_comments, 0);
}

#[tokio::test]
async fn edit_toggling_content_moves_comment_count() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let alice = seed_user(&s, "202400001").await;

  let comment = s.create_comment(rate(alice, dish_id, 4.0, None)).await.unwrap();
  assert_eq!(s.dish(dish_id).await.unwrap().unwrap().count_of_comments, 0);

  s.update_comment(comment.id, CommentUpdate {
    content: Some("actually pretty good".into()),
    vote:    4.0,
  })
  .await
  .unwrap();
  assert_eq!(s.dish(dish_id).await.unwrap().unwrap().count_of_comments, 1);

  s.update_comment(comment.id, CommentUpdate { content: None, vote: 4.0 })
    .await
    .unwrap();
  assert_eq!(s.dish(dish_id).await.unwrap().unwrap().count_of_comments, 0);
}

#[tokio::test]
async fn delete_missing_comment_fails() {
  let s = store().await;
  let err = s.delete_comment(123).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CommentNotFound(123))));
}

#[tokio::test]
async fn comments_listed_by_dish() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let alice = seed_user(&s, "202400001").await;
  let bob = s.create_user("Bob", Some("202400002"), false).await.unwrap().id;

  s.create_comment(rate(alice, dish_id, 4.0, Some("good"))).await.unwrap();
  s.create_comment(rate(bob, dish_id, 2.0, None)).await.unwrap();

  let comments = s.comments_by_dish(dish_id, 0, 100).await.unwrap();
  assert_eq!(comments.len(), 2);
}

// ─── Marks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_add_and_delete_move_counter() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let alice = seed_user(&s, "202400001").await;

  let mark = s.add_mark(NewMark { user_id: alice, dish_id }).await.unwrap();
  assert_eq!(s.dish(dish_id).await.unwrap().unwrap().count_of_mark, 1);
  assert_eq!(s.mark_count_for_dish(dish_id).await.unwrap(), 1);

  s.delete_mark(mark.id, alice).await.unwrap();
  assert_eq!(s.dish(dish_id).await.unwrap().unwrap().count_of_mark, 0);
  assert_eq!(s.mark_count_for_dish(dish_id).await.unwrap(), 0);
}

#[tokio::test]
async fn mark_delete_is_owner_only() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let alice = seed_user(&s, "202400001").await;
  let bob = s.create_user("Bob", Some("202400002"), false).await.unwrap().id;

  let mark = s.add_mark(NewMark { user_id: alice, dish_id }).await.unwrap();

  let err = s.delete_mark(mark.id, bob).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotMarkOwner(_))));

  // Counter untouched by the refused delete.
  assert_eq!(s.dish(dish_id).await.unwrap().unwrap().count_of_mark, 1);
}

#[tokio::test]
async fn mark_delete_missing_fails() {
  let s = store().await;
  let err = s.delete_mark(55, 1).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::MarkNotFound(55))));
}

#[tokio::test]
async fn mark_on_missing_dish_fails() {
  let s = store().await;
  let alice = seed_user(&s, "202400001").await;
  let err = s
    .add_mark(NewMark { user_id: alice, dish_id: 999 })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DishNotFound(999))));
}

// ─── Feedback ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feedback_lifecycle() {
  let s = store().await;
  let alice = seed_user(&s, "202400001").await;
  let admin_uid = s.create_user("staff", None, true).await.unwrap().id;

  let fb = s
    .create_feedback(NewFeedback {
      user_id: alice,
      content: "queue too long".into(),
      towards: 1,
    })
    .await
    .unwrap();
  assert!(fb.reply.is_none());

  // Only the author may rewrite it.
  let err = s.update_feedback(fb.id, admin_uid, "hijacked").await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFeedbackOwner(_))));

  let fb = s
    .update_feedback(fb.id, alice, "queue is unbearable")
    .await
    .unwrap();
  assert_eq!(fb.content, "queue is unbearable");

  let fb = s
    .reply_feedback(FeedbackReply {
      feedback_id: fb.id,
      user_id:     admin_uid,
      content:     "we opened a second window".into(),
    })
    .await
    .unwrap();
  assert_eq!(fb.reply_uid, Some(admin_uid));
  assert!(fb.reply_time.is_some());
}

#[tokio::test]
async fn feedback_by_target_filters_on_replied() {
  let s = store().await;
  let alice = seed_user(&s, "202400001").await;
  let admin_uid = s.create_user("staff", None, true).await.unwrap().id;

  let open = s
    .create_feedback(NewFeedback { user_id: alice, content: "a".into(), towards: 7 })
    .await
    .unwrap();
  let answered = s
    .create_feedback(NewFeedback { user_id: alice, content: "b".into(), towards: 7 })
    .await
    .unwrap();
  s.reply_feedback(FeedbackReply {
    feedback_id: answered.id,
    user_id:     admin_uid,
    content:     "done".into(),
  })
  .await
  .unwrap();

  let all = s.feedback_by_target(7, None).await.unwrap();
  assert_eq!(all.len(), 2);

  let replied = s.feedback_by_target(7, Some(true)).await.unwrap();
  assert_eq!(replied.len(), 1);
  assert_eq!(replied[0].id, answered.id);

  let pending = s.feedback_by_target(7, Some(false)).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].id, open.id);
}

// ─── Promotions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn carousel_scoping() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let canteen = s.dish(dish_id).await.unwrap().unwrap().canteen;

  s.add_carousel(NewCarousel { canteen: Some(canteen), image: "banners/1".into() })
    .await
    .unwrap();
  let site_wide = s
    .add_carousel(NewCarousel { canteen: None, image: "banners/2".into() })
    .await
    .unwrap();

  // A canteen sees its own banners plus the site-wide ones.
  let banners = s.carousels_by_canteen(canteen).await.unwrap();
  assert_eq!(banners.len(), 2);

  s.delete_carousel(site_wide.id).await.unwrap();
  let banners = s.carousels_by_canteen(canteen).await.unwrap();
  assert_eq!(banners.len(), 1);
}

#[tokio::test]
async fn new_dish_flags() {
  let s = store().await;
  let dish_id = seed_dish(&s).await;
  let canteen = s.dish(dish_id).await.unwrap().unwrap().canteen;

  let flag = s.flag_new_dish(dish_id).await.unwrap();
  let listed = s.new_dishes_by_canteen(canteen).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].id, dish_id);

  s.unflag_new_dish(flag.id).await.unwrap();
  assert!(s.new_dishes_by_canteen(canteen).await.unwrap().is_empty());

  let err = s.flag_new_dish(999).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DishNotFound(999))));
}
