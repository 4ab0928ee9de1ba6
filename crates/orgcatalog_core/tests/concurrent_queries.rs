use orgcatalog_core::db::open_db;
use orgcatalog_core::db::seed::seed_demo_data;
use orgcatalog_core::{
    GeoParams, OrganizationQueryService, OrganizationView, SqliteOrganizationStore,
};
use std::path::Path;
use std::thread;

fn run_queries(path: &Path) -> Vec<Vec<i64>> {
    let conn = open_db(path).unwrap();
    let service = OrganizationQueryService::new(SqliteOrganizationStore::try_new(&conn).unwrap());
    let ids = |views: Vec<OrganizationView>| -> Vec<i64> {
        views.into_iter().map(|view| view.id).collect()
    };

    vec![
        ids(service.organizations_by_activity_tree("Еда").unwrap()),
        ids(service.organizations_in_building(1).unwrap()),
        ids(service
            .organizations_by_geo(&GeoParams {
                lat: Some(55.7558),
                lon: Some(37.6173),
                radius_km: Some(0.5),
                ..GeoParams::default()
            })
            .unwrap()),
        vec![service.organization_by_id(3).unwrap().id],
    ]
}

#[test]
fn parallel_requests_with_own_connections_agree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite3");
    let mut conn = open_db(&path).unwrap();
    seed_demo_data(&mut conn).unwrap();
    drop(conn);

    let expected = run_queries(&path);
    assert_eq!(
        expected,
        vec![vec![1, 2, 3], vec![1, 2], vec![1, 2], vec![3]]
    );

    let results = thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| scope.spawn(|| run_queries(&path)))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    for result in results {
        assert_eq!(result, expected);
    }
}
