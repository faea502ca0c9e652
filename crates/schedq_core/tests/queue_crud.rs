use schedq_core::db::open_db_in_memory;
use schedq_core::{
    AttributeEntry, AttributeKey, CodecError, Queue, QueueRepository, QueueService, QueueType,
    RepoError, SaveDirective, SqliteQueueRepository,
};

#[test]
fn insert_and_load_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("workq", QueueType::Execution);
    queue.attributes = vec![
        AttributeEntry::set("max_running", "50"),
        AttributeEntry::resource("resources_max", "ncpus", "8"),
    ];
    repo.save(&queue, SaveDirective::New).unwrap();

    let loaded = repo.load("workq").unwrap().unwrap();
    assert_eq!(loaded.name, "workq");
    assert_eq!(loaded.queue_type, QueueType::Execution);
    assert_eq!(loaded.attributes.len(), 2);
    assert_eq!(loaded.attributes[0].name, "max_running");
    assert_eq!(loaded.attributes[0].qualifier, None);
    assert_eq!(loaded.attributes[0].value.as_deref(), Some("50"));
    assert_eq!(loaded.attributes[1].qualifier.as_deref(), Some("ncpus"));
    assert!(loaded.ctime > 0);
    assert!(loaded.mtime >= loaded.ctime);
}

#[test]
fn timestamps_are_store_assigned() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("stamped", QueueType::Execution);
    queue.ctime = 12345;
    queue.mtime = 99999;
    queue.attributes = vec![AttributeEntry::set("enabled", "true")];
    repo.save(&queue, SaveDirective::New).unwrap();

    let loaded = repo.load("stamped").unwrap().unwrap();
    assert_ne!(loaded.ctime, 12345);
    assert_ne!(loaded.mtime, 99999);
}

#[test]
fn insert_existing_name_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("dup", QueueType::Execution);
    queue.attributes = vec![AttributeEntry::set("enabled", "true")];
    repo.save(&queue, SaveDirective::New).unwrap();

    let err = repo.save(&queue, SaveDirective::New).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(name) if name == "dup"));
}

#[test]
fn full_save_replaces_the_whole_attribute_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("fullq", QueueType::Execution);
    queue.attributes = vec![
        AttributeEntry::set("max_running", "50"),
        AttributeEntry::set("enabled", "true"),
    ];
    repo.save(&queue, SaveDirective::New).unwrap();

    queue.queue_type = QueueType::Route;
    queue.attributes = vec![AttributeEntry::set("route_destinations", "fast,slow")];
    repo.save(&queue, SaveDirective::Full).unwrap();

    let loaded = repo.load("fullq").unwrap().unwrap();
    assert_eq!(loaded.queue_type, QueueType::Route);
    assert_eq!(loaded.attributes.len(), 1);
    assert_eq!(loaded.attributes[0].name, "route_destinations");
}

#[test]
fn quick_save_never_touches_stored_attributes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("quickq", QueueType::Execution);
    queue.attributes = vec![AttributeEntry::set("max_running", "50")];
    repo.save(&queue, SaveDirective::New).unwrap();

    queue.queue_type = QueueType::Route;
    queue.attributes = vec![AttributeEntry::set("should_not", "land")];
    repo.save(&queue, SaveDirective::Quick).unwrap();

    let loaded = repo.load("quickq").unwrap().unwrap();
    assert_eq!(loaded.queue_type, QueueType::Route);
    assert_eq!(loaded.attributes.len(), 1);
    assert_eq!(loaded.attributes[0].name, "max_running");
    assert_eq!(loaded.attributes[0].value.as_deref(), Some("50"));
}

#[test]
fn update_of_missing_queue_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("ghost", QueueType::Execution);
    queue.attributes = vec![AttributeEntry::set("enabled", "true")];

    let full = repo.save(&queue, SaveDirective::Full).unwrap_err();
    assert!(matches!(full, RepoError::NotFound(name) if name == "ghost"));

    let quick = repo.save(&queue, SaveDirective::Quick).unwrap_err();
    assert!(matches!(quick, RepoError::NotFound(_)));
}

#[test]
fn update_advances_mtime_but_not_ctime() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("aging", QueueType::Execution);
    queue.attributes = vec![AttributeEntry::set("enabled", "true")];
    repo.save(&queue, SaveDirective::New).unwrap();

    // Age the row so the clock visibly moves on.
    conn.execute(
        "UPDATE queues SET ctime = ctime - 100, mtime = mtime - 100 WHERE name = 'aging';",
        [],
    )
    .unwrap();
    let before = repo.load("aging").unwrap().unwrap();

    repo.save(&queue, SaveDirective::Quick).unwrap();
    let after = repo.load("aging").unwrap().unwrap();

    assert_eq!(after.ctime, before.ctime);
    assert!(after.mtime > before.mtime);
}

#[test]
fn validation_failure_blocks_writes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut invalid = Queue::new("not a name", QueueType::Execution);
    invalid.attributes = vec![AttributeEntry::set("enabled", "true")];

    let err = repo.save(&invalid, SaveDirective::New).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.load("not a name").unwrap().is_none());
}

#[test]
fn empty_attribute_list_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let queue = Queue::new("noattrs", QueueType::Execution);
    let err = repo.save(&queue, SaveDirective::New).unwrap_err();
    assert!(matches!(err, RepoError::Codec(CodecError::EmptyList)));
    assert!(repo.load("noattrs").unwrap().is_none());
}

#[test]
fn null_valued_attribute_survives_the_write_path() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("flags", QueueType::Execution);
    queue.attributes = vec![AttributeEntry {
        name: "started".to_string(),
        qualifier: None,
        value: None,
        op: Default::default(),
    }];
    repo.save(&queue, SaveDirective::New).unwrap();

    let loaded = repo.load("flags").unwrap().unwrap();
    assert_eq!(loaded.attributes.len(), 1);
    assert_eq!(loaded.attributes[0].value, None);
}

#[test]
fn delete_attrs_removes_only_named_keys() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("trimq", QueueType::Execution);
    queue.attributes = vec![
        AttributeEntry::set("max_running", "50"),
        AttributeEntry::resource("resources_max", "ncpus", "8"),
        AttributeEntry::set("enabled", "true"),
    ];
    repo.save(&queue, SaveDirective::New).unwrap();

    repo.delete_attrs(
        "trimq",
        &[
            AttributeKey::new("max_running"),
            AttributeKey::new("never_existed"),
        ],
    )
    .unwrap();

    let loaded = repo.load("trimq").unwrap().unwrap();
    assert_eq!(loaded.attributes.len(), 2);
    assert_eq!(loaded.attributes[0].name, "resources_max");
    assert_eq!(loaded.attributes[1].name, "enabled");
}

#[test]
fn delete_attrs_requires_keys_and_an_existing_queue() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("strict", QueueType::Execution);
    queue.attributes = vec![AttributeEntry::set("enabled", "true")];
    repo.save(&queue, SaveDirective::New).unwrap();

    let empty = repo.delete_attrs("strict", &[]).unwrap_err();
    assert!(matches!(empty, RepoError::Codec(CodecError::EmptyList)));

    let missing = repo
        .delete_attrs("no_such_queue", &[AttributeKey::new("enabled")])
        .unwrap_err();
    assert!(matches!(missing, RepoError::NotFound(_)));
}

#[test]
fn lifecycle_scenario_insert_trim_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();

    let mut queue = Queue::new("batchQ", QueueType::Execution);
    queue.attributes = vec![AttributeEntry::set("max_running", "50")];
    repo.save(&queue, SaveDirective::New).unwrap();

    let loaded = repo.load("batchQ").unwrap().unwrap();
    assert_eq!(loaded.queue_type, QueueType::Execution);
    assert_eq!(loaded.attributes.len(), 1);
    assert_eq!(loaded.attributes[0].name, "max_running");
    assert_eq!(loaded.attributes[0].qualifier, None);

    repo.delete_attrs("batchQ", &[AttributeKey::new("max_running")])
        .unwrap();
    let trimmed = repo.load("batchQ").unwrap().unwrap();
    assert!(trimmed.attributes.is_empty());

    repo.delete("batchQ").unwrap();
    assert!(repo.load("batchQ").unwrap().is_none());

    let err = repo.delete("batchQ").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQueueRepository::try_new(&conn).unwrap();
    let service = QueueService::new(repo);

    service
        .create_queue(
            "svcq",
            QueueType::Execution,
            vec![AttributeEntry::set("max_running", "10")],
        )
        .unwrap();

    let fetched = service.load("svcq").unwrap().unwrap();
    assert_eq!(fetched.attributes[0].value.as_deref(), Some("10"));

    let all = service.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "svcq");

    service.delete("svcq").unwrap();
    assert!(service.load("svcq").unwrap().is_none());
}
