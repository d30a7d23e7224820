use cos_agent_provider::relation::discover_databags;
use cos_agent_provider::{
    DatabagRelation, Endpoint, Error, MarkerFlags, MetricsEndpointSpec, ProviderConfig,
    RelationData, RelationEvent, RelationId, UnitData,
};
use tempfile::tempdir;

fn open_endpoint(root: &std::path::Path) -> Endpoint<DatabagRelation, MarkerFlags> {
    let flags = MarkerFlags::open(root.join("flags")).expect("flags");
    let mut endpoint = Endpoint::new(&ProviderConfig::new("myapp"), flags);
    for relation in discover_databags(root, "cos-agent").expect("discover") {
        endpoint.attach(relation);
    }
    endpoint
}

#[test]
fn publish_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    DatabagRelation::open(dir.path(), "cos-agent", "cos-agent:01").expect("databag");
    DatabagRelation::open(dir.path(), "cos-agent", "cos-agent:02").expect("databag");

    let endpoints = [MetricsEndpointSpec::new("/metrics", 9100).with_job_name("node")];
    let mut endpoint = open_endpoint(dir.path());
    let updated = endpoint
        .update_relation_data(Some(&endpoints))
        .expect("publish")
        .into_result()
        .expect("complete");
    assert_eq!(
        updated,
        vec![RelationId::new("cos-agent:01"), RelationId::new("cos-agent:02")]
    );
    drop(endpoint);

    // A later hook sees the same record on disk.
    let endpoint = open_endpoint(dir.path());
    for relation in endpoint.relations() {
        let value = relation
            .get(UnitData::KEY)
            .expect("read")
            .expect("record present");
        let record = UnitData::from_value(value).expect("decode");
        assert_eq!(
            record.metrics_scrape_jobs[0].job_name.as_deref(),
            Some("myapp_0_node")
        );
        assert!(record.dashboards.is_empty());
        assert!(record.metrics_alert_rules.is_empty());
    }
}

#[test]
fn repeated_publish_is_byte_identical() {
    let dir = tempdir().expect("tempdir");
    let relation = DatabagRelation::open(dir.path(), "cos-agent", "cos-agent:01").expect("databag");
    let record_path = relation.dir().join("config.json");

    let mut endpoint = open_endpoint(dir.path());
    endpoint.update_relation_data(None).expect("first publish");
    let first = std::fs::read(&record_path).expect("record");
    endpoint.update_relation_data(None).expect("second publish");
    let second = std::fs::read(&record_path).expect("record");
    assert_eq!(first, second);
}

#[test]
fn broken_clears_markers_and_records() {
    let dir = tempdir().expect("tempdir");
    let relation = DatabagRelation::open(dir.path(), "cos-agent", "cos-agent:01").expect("databag");

    let mut endpoint = open_endpoint(dir.path());
    endpoint.handle(RelationEvent::Joined).expect("joined");
    endpoint.handle(RelationEvent::Changed).expect("changed");
    endpoint.update_relation_data(None).expect("publish");
    assert!(dir.path().join("flags/cos-agent.connected").is_file());
    assert!(dir.path().join("flags/cos-agent.available").is_file());
    assert!(relation.dir().join("config.json").is_file());

    let report = endpoint.handle(RelationEvent::Broken).expect("broken");
    assert!(report.is_complete());
    assert!(!dir.path().join("flags/cos-agent.connected").exists());
    assert!(!dir.path().join("flags/cos-agent.available").exists());
    assert!(!relation.dir().join("config.json").exists());
}

#[test]
fn partial_failure_is_reported() {
    let dir = tempdir().expect("tempdir");
    DatabagRelation::open(dir.path(), "cos-agent", "cos-agent:01").expect("databag");
    let gone = DatabagRelation::open(dir.path(), "cos-agent", "cos-agent:02").expect("databag");

    let mut endpoint = open_endpoint(dir.path());
    std::fs::remove_dir_all(gone.dir()).expect("remove databag");

    let report = endpoint.update_relation_data(None).expect("publish");
    assert_eq!(report.updated, vec![RelationId::new("cos-agent:01")]);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        report.into_result(),
        Err(Error::Transport { relation, .. }) if relation == RelationId::new("cos-agent:02")
    ));
}
