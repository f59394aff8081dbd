//! Batch processor tests (in-memory ports, mockall for failure injection)

use super::*;
use crate::domain::Position;
use crate::port::feature_flags::mocks::ToggleFeatureFlags;
use crate::port::feature_flags::MockFeatureFlags;
use crate::port::StaticFeatureFlags;
use crate::port::id_provider::mocks::SequentialIdProvider;
use crate::port::position_repository::mocks::InMemoryPositionRepository;
use crate::port::time_provider::mocks::SteppingTimeProvider;
use crate::port::volunteer_repository::mocks::InMemoryVolunteerRepository;
use crate::port::volunteer_repository::MockVolunteerRepository;
use async_trait::async_trait;

const CHURCH: &str = "church-1";
const MASS: &str = "mass-0900";

fn event(id: &str) -> Event {
    Event::new(id, CHURCH, MASS)
}

fn group(id: &str) -> SubmittingGroup {
    SubmittingGroup::new(id)
}

fn catalog() -> Vec<Position> {
    vec![
        Position::new("P1", "Main door", 1).in_zone("Entrance"),
        Position::new("P2", "Side door", 2).in_zone("Entrance"),
        Position::new("P3", "Center aisle", 3).in_zone("Nave"),
        Position::new("P4", "Altar", 4).restricted().in_zone("Sanctuary"),
    ]
}

fn general_catalog(n: usize) -> Vec<Position> {
    (1..=n)
        .map(|i| Position::new(format!("P{i}"), format!("Station {i}"), i as i64))
        .collect()
}

struct Fixture {
    positions: Arc<InMemoryPositionRepository>,
    volunteers: Arc<InMemoryVolunteerRepository>,
    flags: Arc<ToggleFeatureFlags>,
    service: AssignmentService,
}

fn fixture(catalog: Vec<Position>, role_mode: bool, existing: Vec<Volunteer>) -> Fixture {
    let positions = Arc::new(InMemoryPositionRepository::new());
    positions.set_catalog(CHURCH, MASS, catalog);
    let volunteers = Arc::new(InMemoryVolunteerRepository::with_volunteers(existing));
    let flags = Arc::new(ToggleFeatureFlags::new(role_mode));

    let service = AssignmentService::new(
        positions.clone(),
        volunteers.clone(),
        flags.clone(),
        Arc::new(SequentialIdProvider::new("vol")),
        Arc::new(SteppingTimeProvider::new(1_000, 1_000)),
        ProcessorConfig::default(),
    );

    Fixture {
        positions,
        volunteers,
        flags,
        service,
    }
}

fn abc_submission(event_id: &str) -> Vec<Volunteer> {
    vec![
        Volunteer::new("a", 1, event_id, "g1", "A").with_restricted_role(),
        Volunteer::new("b", 2, event_id, "g1", "B").with_secondary_role(),
        Volunteer::new("c", 3, event_id, "g1", "C"),
    ]
}

#[tokio::test]
async fn test_role_mode_enabled_scenario() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));

    let summary = f.service.process_queue().await.unwrap();

    assert_eq!(f.volunteers.position_of("A").as_deref(), Some("P4"));
    assert_eq!(f.volunteers.position_of("B").as_deref(), Some("P1"));
    assert_eq!(f.volunteers.position_of("C").as_deref(), Some("P2"));
    assert_eq!(summary.processed_items, 1);
    assert_eq!(summary.remaining, 0);
    assert!(f.service.queued_items().is_empty());
}

#[tokio::test]
async fn test_role_mode_disabled_scenario() {
    let f = fixture(catalog(), false, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));

    f.service.process_queue().await.unwrap();

    assert_eq!(f.volunteers.position_of("A").as_deref(), Some("P1"));
    assert_eq!(f.volunteers.position_of("B").as_deref(), Some("P2"));
    assert_eq!(f.volunteers.position_of("C").as_deref(), Some("P3"));
}

#[tokio::test]
async fn test_second_batch_resumes_rotation() {
    let f = fixture(general_catalog(4), false, vec![]);
    for name in ["X", "Y", "Z"] {
        f.volunteers
            .insert_batch(&[Volunteer::new_test("ev-1", "g1", name)])
            .await
            .unwrap();
    }
    f.service.enqueue(event("ev-1"), group("g1"));
    f.service.process_queue().await.unwrap();

    f.volunteers
        .insert_batch(&[Volunteer::new_test("ev-1", "g2", "W")])
        .await
        .unwrap();
    f.service.enqueue(event("ev-1"), group("g2"));
    f.service.process_queue().await.unwrap();

    assert_eq!(f.volunteers.position_of("X").as_deref(), Some("P1"));
    assert_eq!(f.volunteers.position_of("Z").as_deref(), Some("P3"));
    assert_eq!(f.volunteers.position_of("W").as_deref(), Some("P4"));
}

#[tokio::test]
async fn test_batches_in_one_pass_share_rotation() {
    let f = fixture(general_catalog(3), false, vec![]);
    let req = |group_id: &str, names: &[&str]| SubmitRequest {
        event: event("ev-1"),
        group: group(group_id),
        volunteers: names.iter().map(|n| crate::domain::NewVolunteer::new(*n)).collect(),
    };

    f.service.submit(req("g1", &["A", "B"])).await.unwrap();
    f.service.submit(req("g2", &["C", "D"])).await.unwrap();
    let summary = f.service.process_queue().await.unwrap();

    assert_eq!(summary.processed_items, 2);
    let positions: Vec<_> = ["A", "B", "C", "D"]
        .iter()
        .map(|n| f.volunteers.position_of(n).unwrap())
        .collect();
    assert_eq!(positions, vec!["P1", "P2", "P3", "P1"]);
}

#[tokio::test]
async fn test_empty_catalog_is_configuration_fatal() {
    let f = fixture(vec![], true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));

    let err = f.service.process_queue().await.unwrap_err();

    assert!(err.is_configuration_fatal());
    assert!(!err.is_storage_failure());
    assert_eq!(f.volunteers.persist_count(), 0);
    assert!(f.volunteers.all().iter().all(|v| !v.is_assigned()));
    assert_eq!(f.service.queued_items().len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_keeps_item_queued() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));
    f.volunteers.fail_fetches(true);

    let err = f.service.process_queue().await.unwrap_err();
    assert!(err.is_storage_failure());
    assert_eq!(f.service.queued_items().len(), 1);
    assert_eq!(f.volunteers.persist_count(), 0);

    // Caller-driven retry once storage recovers
    f.volunteers.fail_fetches(false);
    let summary = f.service.process_queue().await.unwrap();
    assert_eq!(summary.processed_items, 1);
    assert_eq!(f.volunteers.position_of("A").as_deref(), Some("P4"));
}

#[tokio::test]
async fn test_catalog_failure_is_storage_error() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));
    f.positions.fail_fetches(true);

    let err = f.service.process_queue().await.unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    assert_eq!(f.service.queued_items().len(), 1);
}

#[tokio::test]
async fn test_persist_failure_commits_nothing() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));
    f.volunteers.fail_persists(true);

    let err = f.service.process_queue().await.unwrap_err();

    assert!(err.is_storage_failure());
    assert!(f.volunteers.all().iter().all(|v| !v.is_assigned()));
    assert_eq!(f.service.queued_items().len(), 1);
    assert!(f.service.last_assigned().is_empty());
}

#[tokio::test]
async fn test_reprocessing_is_idempotent() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));
    f.service.process_queue().await.unwrap();
    let first = f.volunteers.all();

    f.service.enqueue(event("ev-1"), group("g1"));
    let summary = f.service.process_queue().await.unwrap();

    assert_eq!(summary.processed_items, 1);
    assert!(summary.assigned.is_empty());
    assert_eq!(f.volunteers.all(), first);
}

#[tokio::test]
async fn test_failure_stops_loop_in_fifo_order() {
    let f = fixture(general_catalog(3), false, vec![]);
    f.volunteers
        .insert_batch(&[
            Volunteer::new_test("ev-1", "g1", "A"),
            Volunteer::new_test("ev-2", "g1", "B"),
            Volunteer::new_test("ev-3", "g1", "C"),
        ])
        .await
        .unwrap();

    f.service.enqueue(event("ev-1"), group("g1"));
    f.service
        .enqueue(Event::new("ev-2", CHURCH, "mass-unconfigured"), group("g1"));
    f.service.enqueue(event("ev-3"), group("g1"));

    let err = f.service.process_queue().await.unwrap_err();
    assert!(err.is_configuration_fatal());

    assert_eq!(f.volunteers.position_of("A").as_deref(), Some("P1"));
    assert_eq!(f.volunteers.position_of("B"), None);
    assert_eq!(f.volunteers.position_of("C"), None);

    let remaining: Vec<_> = f
        .service
        .queued_items()
        .into_iter()
        .map(|i| i.event.id)
        .collect();
    assert_eq!(remaining, vec!["ev-2", "ev-3"]);
    assert_eq!(f.service.last_assigned().len(), 1);
}

#[tokio::test]
async fn test_partial_assignment_is_recoverable() {
    let general_only = general_catalog(2);
    let f = fixture(general_only, true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));

    let summary = f.service.process_queue().await.unwrap();

    assert_eq!(summary.unassigned.len(), 1);
    assert_eq!(summary.unassigned[0].volunteer_id, "a");
    assert_eq!(f.volunteers.position_of("A"), None);
    assert_eq!(f.volunteers.position_of("B").as_deref(), Some("P1"));
    assert_eq!(summary.remaining, 0);
}

#[tokio::test]
async fn test_receipts_sorted_by_name() {
    let existing = vec![
        Volunteer::new("1", 1, "ev-1", "g1", "Zoe"),
        Volunteer::new("2", 2, "ev-1", "g1", "Adam"),
        Volunteer::new("3", 3, "ev-1", "g1", "Mia"),
    ];
    let f = fixture(general_catalog(3), false, existing);
    f.service.enqueue(event("ev-1"), group("g1"));

    let summary = f.service.process_queue().await.unwrap();

    let names: Vec<_> = summary.assigned.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Adam", "Mia", "Zoe"]);
    assert_eq!(f.service.last_assigned(), summary.assigned);
    // Distribution itself followed submission order
    assert_eq!(summary.assigned[2].position_id, "P1");
}

#[tokio::test]
async fn test_role_mode_read_once_per_pass() {
    let f = fixture(catalog(), true, vec![]);
    for g in ["g1", "g2", "g3"] {
        f.service.enqueue(event("ev-1"), group(g));
    }

    f.service.process_queue().await.unwrap();

    assert_eq!(f.flags.read_count(), 1);
}

#[tokio::test]
async fn test_role_mode_toggle_between_passes() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));
    f.service.process_queue().await.unwrap();
    assert_eq!(f.volunteers.position_of("A").as_deref(), Some("P4"));

    f.flags.set_role_mode(false);
    f.volunteers
        .insert_batch(&[Volunteer::new_test("ev-1", "g2", "D").with_restricted_role()])
        .await
        .unwrap();
    f.service.enqueue(event("ev-1"), group("g2"));
    f.service.process_queue().await.unwrap();

    let d = f.volunteers.position_of("D").unwrap();
    assert_ne!(d, "P4");
    let session = f.service.last_session().unwrap();
    assert!(!session.role_mode);
    assert!(session.pools.restricted.is_empty());
}

#[tokio::test]
async fn test_reset_clears_transient_state_only() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));
    f.service.process_queue().await.unwrap();
    f.service.enqueue(event("ev-1"), group("g2"));

    f.service.reset();

    assert!(f.service.queued_items().is_empty());
    assert!(f.service.last_assigned().is_empty());
    assert!(f.service.last_session().is_none());
    assert_eq!(f.volunteers.position_of("A").as_deref(), Some("P4"));
}

#[tokio::test]
async fn test_equal_timestamps_keep_storage_order() {
    // Same clock reading, ids sorting opposite to submission order
    let existing = vec![
        Volunteer::new("z", 7, "ev-1", "g1", "First"),
        Volunteer::new("m", 7, "ev-1", "g1", "Second"),
        Volunteer::new("a", 7, "ev-1", "g1", "Third"),
    ];
    let f = fixture(general_catalog(3), false, existing);
    f.service.enqueue(event("ev-1"), group("g1"));

    f.service.process_queue().await.unwrap();

    assert_eq!(f.volunteers.position_of("First").as_deref(), Some("P1"));
    assert_eq!(f.volunteers.position_of("Second").as_deref(), Some("P2"));
    assert_eq!(f.volunteers.position_of("Third").as_deref(), Some("P3"));
}

#[tokio::test]
async fn test_restricted_only_catalog_with_role_mode_off() {
    let restricted_only = vec![
        Position::new("R1", "Altar", 1).restricted(),
        Position::new("R2", "Sacristy", 2).restricted(),
    ];
    let f = fixture(restricted_only, false, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));

    let summary = f.service.process_queue().await.unwrap();

    assert_eq!(summary.processed_items, 1);
    assert!(summary.assigned.is_empty());
    assert_eq!(summary.unassigned.len(), 3);
    assert!(f.service.last_session().unwrap().pools.is_empty());
    assert!(f.volunteers.all().iter().all(|v| !v.is_assigned()));
}

#[tokio::test]
async fn test_event_locks_released_after_pass() {
    let f = fixture(catalog(), true, abc_submission("ev-1"));
    f.service.enqueue(event("ev-1"), group("g1"));
    f.service.enqueue(event("ev-2"), group("g1"));
    f.service
        .enqueue(Event::new("ev-3", CHURCH, "mass-unconfigured"), group("g1"));

    assert!(f.service.process_queue().await.is_err());

    assert!(lock(&f.service.event_locks).is_empty());
}

#[tokio::test]
async fn test_empty_queue_is_noop() {
    let f = fixture(catalog(), true, vec![]);

    let summary = f.service.process_queue().await.unwrap();

    assert_eq!(summary, ProcessSummary::default());
    assert_eq!(f.flags.read_count(), 0);
    assert_eq!(f.positions.fetch_count(), 0);
}

// ----------------------------------------------------------------------------
// mockall-based failure injection
// ----------------------------------------------------------------------------

fn mocked_service(
    volunteers: MockVolunteerRepository,
    flags: MockFeatureFlags,
) -> AssignmentService {
    let positions = Arc::new(InMemoryPositionRepository::new());
    positions.set_catalog(CHURCH, MASS, catalog());
    AssignmentService::new(
        positions,
        Arc::new(volunteers),
        Arc::new(flags),
        Arc::new(SequentialIdProvider::new("vol")),
        Arc::new(SteppingTimeProvider::new(0, 1)),
        ProcessorConfig::default(),
    )
}

#[tokio::test]
async fn test_persist_error_propagates_from_repository() {
    let mut volunteers = MockVolunteerRepository::new();
    volunteers
        .expect_fetch_for_event()
        .times(1)
        .returning(|event_id| Ok(vec![Volunteer::new("a", 1, event_id, "g1", "A")]));
    volunteers
        .expect_persist()
        .times(1)
        .withf(|batch| batch.len() == 1 && batch[0].position_id.as_deref() == Some("P1"))
        .returning(|_| Err(AppError::Database("SQLITE_FULL".to_string())));

    let mut flags = MockFeatureFlags::new();
    flags.expect_is_role_mode_enabled().returning(|| Ok(true));

    let service = mocked_service(volunteers, flags);
    service.enqueue(event("ev-1"), group("g1"));

    let err = service.process_queue().await.unwrap_err();

    assert!(matches!(err, AppError::Database(ref msg) if msg.contains("SQLITE_FULL")));
    assert_eq!(service.queued_items().len(), 1);
}

#[tokio::test]
async fn test_flag_read_failure_touches_nothing() {
    let mut volunteers = MockVolunteerRepository::new();
    volunteers.expect_fetch_for_event().never();
    volunteers.expect_persist().never();

    let mut flags = MockFeatureFlags::new();
    flags
        .expect_is_role_mode_enabled()
        .times(1)
        .returning(|| Err(AppError::Database("flag store offline".to_string())));

    let service = mocked_service(volunteers, flags);
    service.enqueue(event("ev-1"), group("g1"));

    assert!(service.process_queue().await.is_err());
    assert_eq!(service.queued_items().len(), 1);
}

// ----------------------------------------------------------------------------
// Timeout & concurrency
// ----------------------------------------------------------------------------

/// Catalog that answers after a delay
struct SlowPositions {
    inner: InMemoryPositionRepository,
    delay: Duration,
}

#[async_trait]
impl PositionRepository for SlowPositions {
    async fn fetch_for_mass(&self, church_id: &str, mass_id: &str) -> Result<Vec<Position>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_for_mass(church_id, mass_id).await
    }
}

fn slow_service(
    delay: Duration,
    volunteers: Arc<InMemoryVolunteerRepository>,
    config: ProcessorConfig,
) -> AssignmentService {
    let inner = InMemoryPositionRepository::new();
    inner.set_catalog(CHURCH, MASS, general_catalog(8));
    AssignmentService::new(
        Arc::new(SlowPositions { inner, delay }),
        volunteers,
        Arc::new(StaticFeatureFlags::new(false)),
        Arc::new(SequentialIdProvider::new("vol")),
        Arc::new(SteppingTimeProvider::new(0, 1)),
        config,
    )
}

#[tokio::test]
async fn test_item_timeout_keeps_item_queued() {
    let volunteers = Arc::new(InMemoryVolunteerRepository::with_volunteers(vec![
        Volunteer::new("a", 1, "ev-1", "g1", "A"),
    ]));
    let config = ProcessorConfig {
        item_timeout: Some(Duration::from_millis(20)),
    };
    let service = slow_service(Duration::from_millis(500), volunteers.clone(), config);
    service.enqueue(event("ev-1"), group("g1"));

    let err = service.process_queue().await.unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
    assert!(err.is_storage_failure());
    assert_eq!(service.queued_items().len(), 1);
    assert_eq!(volunteers.persist_count(), 0);
}

#[tokio::test]
async fn test_concurrent_passes_never_double_assign() {
    let existing: Vec<_> = (0..6)
        .map(|i| Volunteer::new(format!("v{i}"), i, "ev-1", "g1", format!("V{i}")))
        .collect();
    let volunteers = Arc::new(InMemoryVolunteerRepository::with_volunteers(existing));
    let service = Arc::new(slow_service(
        Duration::from_millis(30),
        volunteers.clone(),
        ProcessorConfig::default(),
    ));
    service.enqueue(event("ev-1"), group("g1"));

    let (first, second) = tokio::join!(service.process_queue(), service.process_queue());
    first.unwrap();
    second.unwrap();

    let mut positions: Vec<_> = volunteers
        .all()
        .into_iter()
        .map(|v| v.position_id.unwrap())
        .collect();
    positions.sort();
    positions.dedup();
    assert_eq!(positions.len(), 6, "every volunteer holds a distinct position");
    assert!(service.queued_items().is_empty());
    assert!(lock(&service.event_locks).is_empty());
}
