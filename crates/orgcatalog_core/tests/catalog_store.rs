use orgcatalog_core::db::open_db_in_memory;
use orgcatalog_core::db::seed::seed_demo_data;
use orgcatalog_core::{
    OrganizationFilter, OrganizationRecord, OrganizationStore, RepoError, SqliteOrganizationStore,
};
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    seed_demo_data(&mut conn).unwrap();
    conn
}

fn ids(records: &[OrganizationRecord]) -> Vec<i64> {
    records.iter().map(|record| record.organization.id).collect()
}

#[test]
fn snapshots_are_ordered_by_id() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let activities = store.fetch_activities().unwrap();
    assert_eq!(
        activities.iter().map(|activity| activity.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(activities[0].parent_id, None);
    assert_eq!(activities[4].parent_id, Some(4));

    let buildings = store.fetch_buildings().unwrap();
    assert_eq!(buildings.len(), 2);
    assert_eq!(buildings[1].address, "г. Москва, ул. Тверская 10");
    assert_eq!(buildings[1].latitude, 55.7658);
}

#[test]
fn organizations_come_with_resolved_associations() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let records = store
        .fetch_organizations(&OrganizationFilter::Building(1))
        .unwrap();
    assert_eq!(ids(&records), vec![1, 2]);

    let first = &records[0];
    assert_eq!(first.organization.name, "ООО Рога и Копыта");
    assert_eq!(first.building.id, 1);
    assert_eq!(
        first
            .phones
            .iter()
            .map(|phone| phone.phone_number.as_str())
            .collect::<Vec<_>>(),
        vec!["2-222-222", "3-333-333"]
    );
    assert_eq!(first.activities.len(), 1);
    assert_eq!(first.activities[0].name, "Мясная продукция");
}

#[test]
fn filters_select_expected_organizations() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let by_buildings = store
        .fetch_organizations(&OrganizationFilter::BuildingIds(vec![2, 1]))
        .unwrap();
    assert_eq!(ids(&by_buildings), vec![1, 2, 3]);

    let by_activities = store
        .fetch_organizations(&OrganizationFilter::ActivityIds(vec![3]))
        .unwrap();
    assert_eq!(ids(&by_activities), vec![1, 3]);

    let by_id = store
        .fetch_organizations(&OrganizationFilter::Id(3))
        .unwrap();
    assert_eq!(ids(&by_id), vec![3]);
    assert_eq!(by_id[0].building.id, 2);
}

#[test]
fn empty_id_lists_select_nothing() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    assert!(store
        .fetch_organizations(&OrganizationFilter::BuildingIds(Vec::new()))
        .unwrap()
        .is_empty());
    assert!(store
        .fetch_organizations(&OrganizationFilter::ActivityIds(Vec::new()))
        .unwrap()
        .is_empty());
}

#[test]
fn organization_tagged_twice_within_filter_appears_once() {
    let conn = setup();
    conn.execute(
        "INSERT INTO organization_activities (organization_id, activity_id) VALUES (1, 1);",
        [],
    )
    .unwrap();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let records = store
        .fetch_organizations(&OrganizationFilter::ActivityIds(vec![1, 3]))
        .unwrap();
    assert_eq!(ids(&records), vec![1, 3]);
    assert_eq!(
        records[0]
            .activities
            .iter()
            .map(|activity| activity.id)
            .collect::<Vec<_>>(),
        vec![3, 1]
    );
}

#[test]
fn name_substring_ignores_unicode_case() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let records = store
        .fetch_organizations(&OrganizationFilter::NameContains("МОЛОКО".to_string()))
        .unwrap();
    assert_eq!(ids(&records), vec![2]);

    let everything = store
        .fetch_organizations(&OrganizationFilter::NameContains(String::new()))
        .unwrap();
    assert_eq!(ids(&everything), vec![1, 2, 3]);

    let nothing = store
        .fetch_organizations(&OrganizationFilter::NameContains("пекарня".to_string()))
        .unwrap();
    assert!(nothing.is_empty());
}

#[test]
fn activity_lookup_by_name_is_case_insensitive_and_exact() {
    let conn = setup();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let food = store.fetch_activity_by_exact_name("еДА").unwrap().unwrap();
    assert_eq!(food.id, 1);
    assert!(food.is_root());

    assert!(store.fetch_activity_by_exact_name("Ед").unwrap().is_none());
    assert!(store
        .fetch_activity_by_exact_name("Мясная")
        .unwrap()
        .is_none());
}

#[test]
fn duplicate_activity_names_resolve_to_lowest_id() {
    let conn = setup();
    conn.execute(
        "INSERT INTO activities (id, name, parent_id) VALUES (10, 'ГРУЗОВЫЕ', 1);",
        [],
    )
    .unwrap();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let activity = store
        .fetch_activity_by_exact_name("грузовые")
        .unwrap()
        .unwrap();
    assert_eq!(activity.id, 5);
}

#[test]
fn non_finite_building_coordinates_are_rejected() {
    let conn = setup();
    conn.execute(
        "INSERT INTO buildings (id, address, latitude, longitude) VALUES (3, 'broken', ?1, 0.0);",
        [f64::INFINITY],
    )
    .unwrap();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let err = store.fetch_buildings().unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn id_lists_beyond_sqlite_variable_limit_are_chunked() {
    let mut conn = setup();
    let tx = conn.transaction().unwrap();
    {
        let mut insert = tx
            .prepare("INSERT INTO organizations (id, name, building_id) VALUES (?1, ?2, 2);")
            .unwrap();
        for id in 100..33_100_i64 {
            insert.execute(rusqlite::params![id, format!("Филиал {id}")]).unwrap();
        }
    }
    tx.execute_batch(
        "INSERT INTO activities (id, name, parent_id) VALUES (900, 'Склады', NULL);
         INSERT INTO organization_activities (organization_id, activity_id) VALUES (1, 900);",
    )
    .unwrap();
    tx.commit().unwrap();
    let store = SqliteOrganizationStore::try_new(&conn).unwrap();

    let everyone = store
        .fetch_organizations(&OrganizationFilter::NameContains(String::new()))
        .unwrap();
    assert_eq!(everyone.len(), 33_003);
    assert!(ids(&everyone).windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(everyone[0].phones.len(), 2);
    assert_eq!(everyone[0].activities.len(), 2);
    assert!(everyone[4_000].phones.is_empty());

    let buildings = store
        .fetch_organizations(&OrganizationFilter::BuildingIds((1..=33_000).collect()))
        .unwrap();
    assert_eq!(buildings.len(), 33_003);

    // Org 1 is tagged with activity 3 and 900, which fall in different chunks.
    let tagged = store
        .fetch_organizations(&OrganizationFilter::ActivityIds((1..=33_000).collect()))
        .unwrap();
    assert_eq!(ids(&tagged), vec![1, 2, 3]);
}

#[test]
fn filter_kinds_are_distinct_labels() {
    let kinds = [
        OrganizationFilter::BuildingIds(vec![1]).kind(),
        OrganizationFilter::Building(1).kind(),
        OrganizationFilter::ActivityIds(vec![1]).kind(),
        OrganizationFilter::NameContains(String::new()).kind(),
        OrganizationFilter::Id(1).kind(),
    ];
    let unique = kinds.iter().collect::<std::collections::HashSet<_>>();
    assert_eq!(unique.len(), kinds.len());
    assert_eq!(OrganizationFilter::Id(7).kind(), "id");
}
