//! Behavioural tests for the user directory backed by the in-memory store.
//!
//! The store implements all three persistence ports, so these tests drive
//! the real service through its public `UserDirectory` surface.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use directory_backend::domain::ports::{
    CreateUserRequest, DeleteUsersRequest, ListUsersRequest, ModifyUserRequest, UserDeletionError,
    UserDirectory,
};
use directory_backend::domain::{
    ErrorCode, ExtraAttributes, Group, GroupId, Password, UserDirectoryService, UserId,
    UserSortColumn, UserStatus,
};
use directory_backend::test_support::{InMemoryDirectoryStore, MutableClock};
use pagination::SortDirection;
use rstest::{fixture, rstest};

type Directory =
    UserDirectoryService<InMemoryDirectoryStore, InMemoryDirectoryStore, InMemoryDirectoryStore>;

struct World {
    store: Arc<InMemoryDirectoryStore>,
    clock: Arc<MutableClock>,
    directory: Directory,
}

impl World {
    async fn create(&self, username: &str, email: &str) -> UserId {
        self.clock.advance_seconds(1);
        self.directory
            .create_user(CreateUserRequest {
                username: username.to_owned(),
                email: email.to_owned(),
                phone_number: String::new(),
                description: String::new(),
                password: Password::new("s3cret"),
                extra: ExtraAttributes::new(),
            })
            .await
            .expect("create succeeds")
            .user_id
    }

    fn group(&self, raw_id: &str, members: &[&UserId]) -> GroupId {
        let group_id = GroupId::new(raw_id);
        self.store.seed_group(Group {
            group_id: group_id.clone(),
            name: format!("Group {raw_id}"),
            description: String::new(),
            status: "active".to_owned(),
        });
        for member in members {
            self.store.bind(member, &group_id);
        }
        group_id
    }

    async fn list_ids(&self, request: ListUsersRequest) -> Vec<UserId> {
        self.directory
            .list_users(request)
            .await
            .expect("list succeeds")
            .items
            .into_iter()
            .map(|user| user.user_id)
            .collect()
    }
}

#[fixture]
fn world() -> World {
    let store = Arc::new(InMemoryDirectoryStore::new());
    let start = Utc
        .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .single()
        .expect("valid instant");
    let clock = Arc::new(MutableClock::new(start));
    let directory = UserDirectoryService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        clock.clone(),
    );
    World {
        store,
        clock,
        directory,
    }
}

fn statuses(raw: &[&str]) -> ListUsersRequest {
    ListUsersRequest {
        statuses: raw.iter().map(|status| (*status).to_owned()).collect(),
        ..ListUsersRequest::default()
    }
}

#[rstest]
#[tokio::test]
async fn create_modify_delete_round_trip(world: World) {
    let alice = world.create("alice", "ALICE@X.com").await;

    let fetched = world.directory.get_user(&alice).await.expect("get alice");
    assert_eq!(fetched.email, "alice@x.com");
    assert_eq!(fetched.status, UserStatus::Active);

    let mut modify = ModifyUserRequest::new(alice.clone());
    modify.description = Some("bio".to_owned());
    world
        .directory
        .modify_user(modify)
        .await
        .expect("modify alice");

    let modified = world.directory.get_user(&alice).await.expect("get alice");
    assert_eq!(modified.description, "bio");
    assert_eq!(modified.email, "alice@x.com");
    assert_eq!(modified.username, "alice");

    world
        .directory
        .delete_users(DeleteUsersRequest {
            user_ids: vec![alice.to_string()],
        })
        .await
        .expect("delete alice");

    assert!(!world.list_ids(statuses(&["active"])).await.contains(&alice));
    assert!(world.list_ids(statuses(&["deleted"])).await.contains(&alice));
}

#[rstest]
#[tokio::test]
async fn delete_removes_bindings_and_marks_users_deleted(world: World) {
    let alice = world.create("alice", "alice@x.com").await;
    let bob = world.create("bob", "bob@x.com").await;
    world.group("grp-ops", &[&alice, &bob]);
    world.clock.advance_seconds(60);

    let response = world
        .directory
        .delete_users(DeleteUsersRequest {
            user_ids: vec![alice.to_string(), bob.to_string()],
        })
        .await
        .expect("delete succeeds");
    assert_eq!(response.user_ids, vec![alice.clone(), bob.clone()]);

    for user_id in [&alice, &bob] {
        assert!(world.store.bindings_for(user_id).is_empty());
        let user = world.directory.get_user(user_id).await.expect("still readable");
        assert_eq!(user.status, UserStatus::Deleted);
        assert_eq!(user.status_changed_at, user.updated_at);
        assert!(user.status_changed_at > user.created_at);
    }
}

#[rstest]
#[tokio::test]
async fn deleting_twice_is_harmless(world: World) {
    let alice = world.create("alice", "alice@x.com").await;
    let request = DeleteUsersRequest {
        user_ids: vec![alice.to_string()],
    };

    world
        .directory
        .delete_users(request.clone())
        .await
        .expect("first delete");
    world
        .directory
        .delete_users(request)
        .await
        .expect("second delete");

    let user = world.directory.get_user(&alice).await.expect("readable");
    assert_eq!(user.status, UserStatus::Deleted);
}

#[rstest]
#[tokio::test]
async fn empty_delete_is_rejected_without_mutation(world: World) {
    let alice = world.create("alice", "alice@x.com").await;
    let group = world.group("grp-ops", &[&alice]);

    let err = world
        .directory
        .delete_users(DeleteUsersRequest::default())
        .await
        .expect_err("empty delete rejected");

    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(world.store.bindings_for(&alice), vec![group]);
    let user = world.directory.get_user(&alice).await.expect("readable");
    assert_eq!(user.status, UserStatus::Active);
}

#[rstest]
#[tokio::test]
async fn failed_delete_leaves_no_partial_effect(world: World) {
    let alice = world.create("alice", "alice@x.com").await;
    let group = world.group("grp-ops", &[&alice]);
    world
        .store
        .fail_deletions(Some(UserDeletionError::transaction("commit failed")));

    let err = world
        .directory
        .delete_users(DeleteUsersRequest {
            user_ids: vec![alice.to_string()],
        })
        .await
        .expect_err("delete fails");

    assert_eq!(err.code(), ErrorCode::StorageError);
    assert_eq!(world.store.bindings_for(&alice), vec![group]);
    let user = world.directory.get_user(&alice).await.expect("readable");
    assert_eq!(user.status, UserStatus::Active);
}

#[rstest]
#[tokio::test]
async fn modify_of_unknown_user_is_not_found(world: World) {
    let mut modify = ModifyUserRequest::new(UserId::new("usr-missing").expect("valid id"));
    modify.username = Some("ghost".to_owned());

    let err = world
        .directory
        .modify_user(modify)
        .await
        .expect_err("not found");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn password_is_stored_but_never_returned(world: World) {
    let alice = world.create("alice", "alice@x.com").await;

    assert_eq!(world.store.stored_password(&alice).as_deref(), Some("s3cret"));
    let user = world.directory.get_user(&alice).await.expect("readable");
    let rendered = serde_json::to_string(&user).expect("serialises");
    assert!(!rendered.contains("s3cret"));
}

#[rstest]
#[case(Some(2), Some(0), 2)]
#[case(Some(2), Some(4), 1)]
#[case(Some(50), None, 5)]
#[case(None, Some(10), 0)]
#[tokio::test]
async fn totals_ignore_the_page_window(
    world: World,
    #[case] limit: Option<i64>,
    #[case] offset: Option<i64>,
    #[case] expected_len: usize,
) {
    for name in ["ann", "ben", "cat", "dan", "eve"] {
        world.create(name, &format!("{name}@x.com")).await;
    }

    let page = world
        .directory
        .list_users(ListUsersRequest {
            limit,
            offset,
            ..ListUsersRequest::default()
        })
        .await
        .expect("list succeeds");

    assert_eq!(page.items.len(), expected_len);
    assert_eq!(page.total, 5);
}

#[rstest]
#[tokio::test]
async fn pages_never_overlap_even_with_equal_timestamps(world: World) {
    world.clock.advance_seconds(1);
    let mut expected = BTreeSet::new();
    for name in ["ann", "ben", "cat", "dan", "eve", "fay", "gus"] {
        let user_id = world
            .directory
            .create_user(CreateUserRequest {
                username: name.to_owned(),
                email: String::new(),
                phone_number: String::new(),
                description: String::new(),
                password: Password::new("pw"),
                extra: ExtraAttributes::new(),
            })
            .await
            .expect("create succeeds")
            .user_id;
        expected.insert(user_id);
    }

    let mut seen = Vec::new();
    for offset in (0..7).step_by(3) {
        seen.extend(
            world
                .list_ids(ListUsersRequest {
                    limit: Some(3),
                    offset: Some(offset),
                    ..ListUsersRequest::default()
                })
                .await,
        );
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(seen.into_iter().collect::<BTreeSet<_>>(), expected);
}

#[rstest]
#[tokio::test]
async fn group_scope_intersects_requested_ids(world: World) {
    let a = world.create("a", "a@x.com").await;
    let b = world.create("b", "b@x.com").await;
    let c = world.create("c", "c@x.com").await;
    world.group("grp-g", &[&a, &b]);

    let ids = world
        .list_ids(ListUsersRequest {
            group_ids: vec!["grp-g".to_owned()],
            user_ids: vec![a.to_string(), b.to_string(), c.to_string()],
            ..ListUsersRequest::default()
        })
        .await;

    assert_eq!(
        ids.into_iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([a, b])
    );
}

#[rstest]
#[tokio::test]
async fn disjoint_group_scope_yields_empty_page(world: World) {
    let a = world.create("a", "a@x.com").await;
    let c = world.create("c", "c@x.com").await;
    world.group("grp-g", &[&a]);

    let page = world
        .directory
        .list_users(ListUsersRequest {
            group_ids: vec!["grp-g".to_owned()],
            user_ids: vec![c.to_string()],
            ..ListUsersRequest::default()
        })
        .await
        .expect("list succeeds");

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[rstest]
#[tokio::test]
async fn search_and_sort_follow_the_request(world: World) {
    world.create("Carol", "carol@example.com").await;
    world.create("alice", "alice@x.com").await;
    world.create("bob", "bob@example.com").await;

    let page = world
        .directory
        .list_users(ListUsersRequest {
            search_word: Some("EXAMPLE".to_owned()),
            sort_key: Some(UserSortColumn::Username),
            sort_direction: Some(SortDirection::Ascending),
            ..ListUsersRequest::default()
        })
        .await
        .expect("list succeeds");

    let names: Vec<&str> = page.items.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, ["Carol", "bob"]);
    assert_eq!(page.total, 2);
}

#[rstest]
#[tokio::test]
async fn newest_users_come_first_by_default(world: World) {
    let first = world.create("first", "").await;
    let second = world.create("second", "").await;

    assert_eq!(
        world.list_ids(ListUsersRequest::default()).await,
        vec![second, first]
    );
}

#[rstest]
#[tokio::test]
async fn enriched_listing_keeps_page_order(world: World) {
    let alice = world.create("alice", "alice@x.com").await;
    let bob = world.create("bob", "bob@x.com").await;
    let ops = world.group("grp-ops", &[&alice, &bob]);
    let dev = world.group("grp-dev", &[&bob]);

    let page = world
        .directory
        .list_users_with_group(ListUsersRequest::default())
        .await
        .expect("list succeeds");

    let order: Vec<&UserId> = page.items.iter().map(|item| &item.user.user_id).collect();
    assert_eq!(order, [&bob, &alice]);

    let bob_groups: Vec<&GroupId> = page.items[0]
        .groups
        .iter()
        .map(|group| &group.group_id)
        .collect();
    assert_eq!(bob_groups, [&dev, &ops]);
    assert_eq!(page.items[1].groups.len(), 1);
    assert_eq!(page.total, 2);
}

#[rstest]
#[tokio::test]
async fn single_user_enrichment_lists_groups(world: World) {
    let alice = world.create("alice", "alice@x.com").await;
    let ops = world.group("grp-ops", &[&alice]);

    let enriched = world
        .directory
        .get_user_with_group(&alice)
        .await
        .expect("lookup succeeds");

    assert_eq!(enriched.user.user_id, alice);
    assert_eq!(enriched.groups.len(), 1);
    assert_eq!(enriched.groups[0].group_id, ops);
}
