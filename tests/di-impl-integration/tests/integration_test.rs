//! 装配器集成测试

use serial_test::serial;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use wiring_abstractions::{Assembler, CandidateRegistry, Channel, Inject, Injectable, Literal, Qualifier, Value};
use wiring_common::{AssemblyResult, ErrorKind};
use wiring_impl::{LifecycleState, Wiring};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("wiring_impl=debug")
        .with_test_writer()
        .try_init();
}

fn kind_of(result: AssemblyResult<()>) -> ErrorKind {
    result.unwrap_err().kind()
}

fn shared<T: Any + Send + Sync>(value: T) -> Option<Arc<dyn Any + Send + Sync>> {
    Some(Arc::new(value))
}

trait Repo: Send + Sync {
    fn name(&self) -> &str;
}

trait Missing: Send + Sync {}

#[derive(Default, Injectable)]
#[injectable(implements(dyn Repo), qualifier)]
struct PgRepo;

impl Repo for PgRepo {
    fn name(&self) -> &str {
        "pg"
    }
}

impl Qualifier for PgRepo {
    fn qualify(&self) -> String {
        "pg".into()
    }
}

#[derive(Default, Injectable)]
#[injectable(implements(dyn Repo), qualifier)]
struct MemRepo {
    #[inject("skip[true]")]
    id: u32,
}

impl Repo for MemRepo {
    fn name(&self) -> &str {
        "mem"
    }
}

impl Qualifier for MemRepo {
    fn qualify(&self) -> String {
        "mem".into()
    }
}

/// 装饰器，自身也依赖 `dyn Repo`
#[derive(Default, Injectable)]
#[injectable(implements(dyn Repo))]
struct LoggedRepo {
    inner: Inject<dyn Repo>,
}

impl Repo for LoggedRepo {
    fn name(&self) -> &str {
        "logged"
    }
}

#[derive(Default, Injectable)]
struct RepoHolder {
    repo: Inject<dyn Repo>,
}

#[derive(Default, Injectable)]
struct QualifiedHolder {
    #[inject("qual[mem]")]
    mem: Inject<dyn Repo>,
    #[inject("impl[integration_test::PgRepo]")]
    pg: Inject<dyn Repo>,
}

#[derive(Default, Injectable)]
struct MemHolder {
    repo: Inject<MemRepo>,
}

// ---------------------------------------------------------------------------
// 注册
// ---------------------------------------------------------------------------

#[test]
fn test_register_rejects_null_and_unknown_values() {
    init_tracing();
    let mut wiring = Wiring::new(false);

    assert_eq!(kind_of(wiring.register_any(None)), ErrorKind::CannotRegister);
    assert_eq!(
        kind_of(wiring.register_any(shared(7_i32))),
        ErrorKind::CannotRegister
    );
    assert_eq!(
        kind_of(wiring.register_any(shared(PgRepo))),
        ErrorKind::CannotRegister
    );
    assert!(wiring.registry().is_empty());

    wiring.register_type::<PgRepo>();
    wiring.register_any(shared(PgRepo)).unwrap();
    assert_eq!(wiring.registry().len(), 1);
}

#[test]
fn test_register_all_stops_at_first_failure() {
    let mut wiring = Wiring::new(false);
    wiring.register_type::<PgRepo>();
    wiring.register_type::<MemRepo>();

    let values = [shared(PgRepo), None, shared(MemRepo::default())];
    assert_eq!(kind_of(wiring.register_all(values)), ErrorKind::CannotRegister);
    assert_eq!(wiring.registry().len(), 1);
}

#[test]
fn test_same_type_registered_thrice_keeps_last_instance() {
    let mut wiring = Wiring::new(false);
    for id in 1..=3 {
        wiring.register(MemRepo { id }).unwrap();
    }
    assert_eq!(wiring.registry().len(), 1);

    let holder = MemHolder::default();
    wiring.initialize(&holder).unwrap();
    assert_eq!(holder.repo.get().map(|repo| repo.id), Some(3));
}

#[test]
fn test_register_value_reports_overrides() {
    let mut wiring = Wiring::new(false);

    assert_eq!(
        kind_of(
            wiring
                .register_value("port", Literal::null())
                .map(|_| ())
        ),
        ErrorKind::CannotRegister
    );

    let first = wiring.register_value("port", Literal::new(80_u16)).unwrap();
    assert!(!first.is_overridden());

    let second = wiring.register_value("port", Literal::new(8080_u16)).unwrap();
    assert!(second.is_overridden());
    assert_eq!(
        kind_of(second.into_result()),
        ErrorKind::RegisteredValueOverridden
    );
    assert_eq!(
        wiring
            .registry()
            .literal("port")
            .and_then(|literal| literal.downcast_ref::<u16>()),
        Some(&8080)
    );
}

#[test]
fn test_register_values_is_atomic() {
    let mut wiring = Wiring::new(false);

    let result = wiring.register_values([
        ("host", Literal::new("localhost".to_string())),
        ("port", Literal::from_option::<u16>(None)),
    ]);
    assert_eq!(kind_of(result.map(|_| ())), ErrorKind::CannotRegister);
    assert!(wiring.registry().literal("host").is_none());

    wiring.register_value("host", Literal::new("a".to_string())).unwrap();
    let outcome = wiring
        .register_values([
            ("host", Literal::new("b".to_string())),
            ("port", Literal::new(1_u16)),
        ])
        .unwrap();
    assert_eq!(
        outcome.as_warning().map(|error| error.cause().to_string()),
        Some("host".to_string())
    );
}

// ---------------------------------------------------------------------------
// 装配目标
// ---------------------------------------------------------------------------

#[derive(Default, Injectable)]
struct CallbackHolder {
    callback: Option<fn()>,
}

#[test]
fn test_initialize_rejects_invalid_holders() {
    let mut wiring = Wiring::new(false);
    wiring.register(PgRepo).unwrap();

    assert_eq!(kind_of(wiring.initialize_any(None)), ErrorKind::CannotBeHolder);
    assert_eq!(
        kind_of(wiring.initialize_any(Some(&5_i32 as &(dyn Any + Send + Sync)))),
        ErrorKind::CannotBeHolder
    );

    let holder = RepoHolder::default();
    let erased: &(dyn Any + Send + Sync) = &holder;
    assert_eq!(
        kind_of(wiring.initialize_any(Some(erased))),
        ErrorKind::CannotBeHolder
    );

    wiring.register_type::<RepoHolder>();
    wiring.initialize_any(Some(erased)).unwrap();
    assert_eq!(holder.repo.get().map(|repo| repo.name()), Some("pg"));

    assert_eq!(
        kind_of(wiring.initialize(&CallbackHolder::default())),
        ErrorKind::CannotBeHolder
    );
}

// ---------------------------------------------------------------------------
// 候选选择
// ---------------------------------------------------------------------------

#[test]
fn test_qualifier_and_implementation_select_candidate() {
    let mut wiring = Wiring::new(false);
    wiring.register(PgRepo).unwrap();
    wiring.register(MemRepo::default()).unwrap();

    let holder = QualifiedHolder::default();
    wiring.initialize(&holder).unwrap();
    assert_eq!(holder.mem.get().map(|repo| repo.name()), Some("mem"));
    assert_eq!(holder.pg.get().map(|repo| repo.name()), Some("pg"));

    let error = wiring.initialize(&RepoHolder::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::CannotDecideImplementation);
    assert!(error.cause().contains("integration_test::PgRepo"));
    assert!(error.cause().contains("integration_test::MemRepo"));
}

#[test]
fn test_decorator_is_not_injected_into_itself() {
    let mut wiring = Wiring::new(false);
    wiring.register(MemRepo::default()).unwrap();
    let logged = Arc::new(LoggedRepo::default());
    wiring.register_shared(Arc::clone(&logged)).unwrap();

    let holder = RepoHolder::default();
    wiring.initialize(&holder).unwrap();

    assert_eq!(holder.repo.get().map(|repo| repo.name()), Some("mem"));
    assert_eq!(logged.inner.get().map(|repo| repo.name()), Some("mem"));
}

#[derive(Default, Injectable)]
struct PortHolder {
    #[inject("reg[port]")]
    port: Value<u16>,
    #[inject("reg[repo]")]
    repo: Inject<dyn Repo>,
}

#[derive(Default, Injectable)]
struct RawPortHolder {
    #[inject("reg[port]")]
    port: u16,
}

#[test]
fn test_registered_values_fill_annotated_fields() {
    let mut wiring = Wiring::new(false);
    let repo: Arc<dyn Repo> = Arc::new(PgRepo);
    wiring
        .register_values([
            ("port", Literal::new(8080_u16)),
            ("repo", Literal::new(repo)),
        ])
        .unwrap();

    let holder = PortHolder::default();
    wiring.initialize(&holder).unwrap();
    assert_eq!(holder.port.get(), Some(&8080));
    assert_eq!(holder.repo.get().map(|repo| repo.name()), Some("pg"));

    assert_eq!(
        kind_of(wiring.initialize(&RawPortHolder::default())),
        ErrorKind::CannotBeHolder
    );
}

#[test]
fn test_registered_value_mismatch_and_absence() {
    let mut wiring = Wiring::new(false);
    assert_eq!(
        kind_of(wiring.initialize(&PortHolder::default())),
        ErrorKind::CannotDecideImplementation
    );

    wiring
        .register_value("port", Literal::new("eighty".to_string()))
        .unwrap();
    assert_eq!(
        kind_of(wiring.initialize(&PortHolder::default())),
        ErrorKind::CannotDecideImplementation
    );
}

// ---------------------------------------------------------------------------
// 注解格式
// ---------------------------------------------------------------------------

#[derive(Default, Injectable)]
struct BadSkip {
    #[inject("skip[maybe]")]
    repo: Inject<dyn Repo>,
}

#[derive(Default, Injectable)]
struct BadEnv {
    #[inject("env[]")]
    home: Value<String>,
}

#[derive(Default, Injectable)]
struct BadQual {
    #[inject("qual[mem")]
    repo: Inject<dyn Repo>,
}

#[derive(Default, Injectable)]
struct BadReg {
    #[inject("reg[]")]
    port: Value<u16>,
}

#[derive(Default, Injectable)]
struct BadImpl {
    #[inject("impl[")]
    repo: Inject<dyn Repo>,
}

#[test]
fn test_malformed_directives_are_rejected() {
    let mut wiring = Wiring::new(false);
    wiring.register(PgRepo).unwrap();
    wiring.register(MemRepo::default()).unwrap();

    let results = [
        wiring.initialize(&BadSkip::default()),
        wiring.initialize(&BadEnv::default()),
        wiring.initialize(&BadQual::default()),
        wiring.initialize(&BadReg::default()),
        wiring.initialize(&BadImpl::default()),
    ];
    for result in results {
        assert_eq!(kind_of(result), ErrorKind::IncorrectDirectiveConfiguration);
    }
}

#[derive(Default, Injectable)]
struct SkippedWithBrokenEnv {
    #[inject("skip[true] env[]")]
    repo: Inject<dyn Repo>,
}

#[test]
fn test_skip_ignores_other_directives() {
    let mut wiring = Wiring::new(false);
    wiring.register(PgRepo).unwrap();

    let holder = SkippedWithBrokenEnv::default();
    wiring.initialize(&holder).unwrap();
    assert!(!holder.repo.is_set());
}

#[test]
fn test_single_candidate_does_not_read_selection_directives() {
    let mut wiring = Wiring::new(false);
    wiring.register(PgRepo).unwrap();

    let by_impl = BadImpl::default();
    wiring.initialize(&by_impl).unwrap();
    assert_eq!(by_impl.repo.get().map(|repo| repo.name()), Some("pg"));

    let by_qual = BadQual::default();
    wiring.initialize(&by_qual).unwrap();
    assert_eq!(by_qual.repo.get().map(|repo| repo.name()), Some("pg"));
}

// ---------------------------------------------------------------------------
// 递归装配
// ---------------------------------------------------------------------------

#[derive(Default, Injectable)]
struct Deep {
    repo: Inject<dyn Repo>,
}

#[derive(Default, Injectable)]
struct Inner {
    deep: Deep,
    #[inject("env[WIRING_IT_INNER]")]
    label: Value<String>,
}

#[derive(Default, Injectable)]
struct Outer {
    inner: Inner,
    #[inject("env[WIRING_IT_UNSET]")]
    unset: Value<String>,
}

#[test]
#[serial]
fn test_nested_structs_are_assembled() {
    std::env::set_var("WIRING_IT_INNER", "nested");
    std::env::remove_var("WIRING_IT_UNSET");

    let mut wiring = Wiring::new(false);
    wiring.register(PgRepo).unwrap();

    let outer = Outer::default();
    wiring.initialize(&outer).unwrap();
    std::env::remove_var("WIRING_IT_INNER");

    assert_eq!(outer.inner.deep.repo.get().map(|repo| repo.name()), Some("pg"));
    assert_eq!(outer.inner.label.get().map(String::as_str), Some("nested"));
    assert_eq!(outer.unset.get().map(String::as_str), Some(""));
}

#[derive(Default, Injectable)]
struct BadInner {
    #[inject("skip[x]")]
    value: Value<String>,
}

#[derive(Default, Injectable)]
struct BadOuter {
    inner: BadInner,
}

#[test]
fn test_error_carries_traversal_path() {
    let wiring = Wiring::new(false);

    let error = wiring.initialize(&BadOuter::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::IncorrectDirectiveConfiguration);
    assert_eq!(
        error.path(),
        Some("BadOuter -> inner: BadInner -> BadInner -> value: Value<String>")
    );
}

#[derive(Default, Injectable)]
struct SelectiveHolder {
    #[inject]
    annotated: Inject<dyn Repo>,
    plain: Inject<dyn Repo>,
    ignored: u32,
}

#[test]
fn test_only_annotated_fields_are_assembled_when_configured() {
    let mut wiring = Wiring::builder().inject_only_annotated(true).build();
    wiring.register(PgRepo).unwrap();

    let holder = SelectiveHolder::default();
    wiring.initialize(&holder).unwrap();

    assert!(holder.annotated.is_set());
    assert!(!holder.plain.is_set());

    let eager = Wiring::new(false);
    assert_eq!(
        kind_of(eager.initialize(&SelectiveHolder::default())),
        ErrorKind::CannotDecideImplementation
    );
}

#[derive(Default, Injectable)]
#[injectable(implements(dyn Repo))]
struct StubUserRepo {
    missing: Inject<dyn Missing>,
}

impl Repo for StubUserRepo {
    fn name(&self) -> &str {
        "stub"
    }
}

#[test]
fn test_candidate_failure_is_sticky() {
    let mut wiring = Wiring::new(false);
    wiring.register(StubUserRepo::default()).unwrap();

    let error = wiring.initialize(&RepoHolder::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::CannotDecideImplementation);
    assert_eq!(
        error.path(),
        Some("StubUserRepo -> missing: Inject<dyn Missing>")
    );
    assert!(matches!(
        wiring.lifecycle_state(),
        LifecycleState::Failed(_)
    ));

    wiring.register(PgRepo).unwrap();
    assert_eq!(wiring.initialize(&RepoHolder::default()).unwrap_err(), error);
}

#[derive(Default, Clone, Injectable)]
struct Account {
    #[inject("env[WIRING_IT_OWNER]")]
    owner: Value<String>,
    repo: Inject<dyn Repo>,
}

#[derive(Default, Injectable)]
struct PointerHolder {
    account: Inject<Inject<Account>>,
    copy: Value<Account>,
}

#[test]
#[serial]
fn test_pointer_chain_is_allocated_and_assembled() {
    std::env::set_var("WIRING_IT_OWNER", "bob");
    let mut wiring = Wiring::new(false);
    wiring.register(MemRepo::default()).unwrap();

    let holder = PointerHolder::default();
    let result = wiring.initialize(&holder);
    std::env::remove_var("WIRING_IT_OWNER");
    result.unwrap();

    let account = holder.account.get().and_then(|pointer| pointer.get()).unwrap();
    assert_eq!(account.owner.get().map(String::as_str), Some("bob"));
    assert_eq!(account.repo.get().map(|repo| repo.name()), Some("mem"));

    let copy = holder.copy.get().unwrap();
    assert_eq!(copy.owner.get().map(String::as_str), Some("bob"));
}

#[derive(Default, Clone, Injectable)]
struct Settings {
    #[inject("skip[true]")]
    level: u8,
}

#[derive(Default, Injectable)]
struct SettingsHolder {
    settings: Value<Settings>,
}

#[test]
fn test_struct_value_is_copied_from_candidate() {
    let mut wiring = Wiring::new(false);
    wiring.register(Settings { level: 3 }).unwrap();

    let holder = SettingsHolder::default();
    wiring.initialize(&holder).unwrap();
    assert_eq!(holder.settings.get().map(|settings| settings.level), Some(3));
}

#[derive(Default, Injectable)]
struct Left {
    right: Inject<Right>,
}

#[derive(Default, Injectable)]
struct Right {
    left: Inject<Left>,
}

#[derive(Default, Injectable)]
struct CycleHolder {
    left: Inject<Left>,
}

#[test]
fn test_pointer_cycle_is_closed() {
    let mut wiring = Wiring::new(false);
    wiring.register(Left::default()).unwrap();
    wiring.register(Right::default()).unwrap();

    let holder = CycleHolder::default();
    wiring.initialize(&holder).unwrap();

    let left = holder.left.get().unwrap();
    let right = left.right.get().unwrap();
    assert!(Arc::ptr_eq(right.left.get().unwrap(), left));
}

#[derive(Default, Injectable)]
struct Ping {
    pong: Inject<Pong>,
}

#[derive(Default, Injectable)]
struct Pong {
    ping: Inject<Ping>,
}

#[derive(Default, Injectable)]
struct PingHolder {
    ping: Inject<Ping>,
}

#[test]
fn test_unregistered_pointer_cycle_shares_allocation() {
    let wiring = Wiring::new(false);

    let holder = PingHolder::default();
    wiring.initialize(&holder).unwrap();

    let ping = holder.ping.get().unwrap();
    let pong = ping.pong.get().unwrap();
    assert!(Arc::ptr_eq(pong.ping.get().unwrap(), ping));

    // 互不循环的字段仍各自分配
    let other = PingHolder::default();
    wiring.initialize(&other).unwrap();
    assert!(!Arc::ptr_eq(other.ping.get().unwrap(), ping));
}

#[test]
fn test_late_registration_triggers_another_pass() {
    let mut wiring = Wiring::new(false);
    wiring.register(PgRepo).unwrap();
    wiring.initialize(&RepoHolder::default()).unwrap();
    assert_eq!(wiring.lifecycle_state(), LifecycleState::Assembled);

    wiring.register(Left::default()).unwrap();
    wiring.register(Right::default()).unwrap();
    assert_eq!(wiring.lifecycle_state(), LifecycleState::Unassembled);
    assert!(!wiring.is_assembled(TypeId::of::<Left>()));

    wiring.initialize(&CycleHolder::default()).unwrap();
    assert!(wiring.is_assembled(TypeId::of::<Left>()));
    assert!(wiring.is_assembled(TypeId::of::<Right>()));
}

#[test]
fn test_concurrent_initialization_assembles_candidates_once() {
    init_tracing();
    let mut wiring = Wiring::new(false);
    wiring.register(MemRepo::default()).unwrap();
    let logged = Arc::new(LoggedRepo::default());
    wiring.register_shared(Arc::clone(&logged)).unwrap();

    let wiring = &wiring;
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(move || {
                let holder = RepoHolder::default();
                wiring.initialize(&holder).unwrap();
                assert_eq!(holder.repo.get().map(|repo| repo.name()), Some("mem"));
            });
        }
    });

    assert!(logged.inner.is_set());
    assert_eq!(wiring.lifecycle_state(), LifecycleState::Assembled);
}

// ---------------------------------------------------------------------------
// 容器字段
// ---------------------------------------------------------------------------

#[derive(Default, Injectable)]
struct Containers {
    map: Value<HashMap<String, i32>>,
    #[inject("size[2]")]
    buffered: Channel<i32>,
    default_channel: Channel<String>,
    #[inject("size[0]")]
    rendezvous: Channel<u8>,
    #[inject("size[10] cap[100]")]
    items: Value<Vec<i32>>,
    empty: Value<Vec<String>>,
    fixed: Vec<u8>,
}

#[test]
fn test_container_fields_are_initialized() {
    let wiring = Wiring::new(false);
    let holder = Containers::default();
    wiring.initialize(&holder).unwrap();

    assert_eq!(holder.map.get().map(HashMap::len), Some(0));
    assert_eq!(holder.buffered.capacity(), Some(2));
    assert_eq!(holder.default_channel.capacity(), Some(1));
    assert_eq!(holder.rendezvous.capacity(), Some(0));

    let items = holder.items.get().unwrap();
    assert_eq!(items.len(), 10);
    assert!(items.capacity() >= 100);
    assert_eq!(holder.empty.get().map(Vec::len), Some(0));

    let sender = holder.buffered.sender().unwrap();
    sender.send(1).unwrap();
    sender.send(2).unwrap();
    assert!(sender.try_send(3).is_err());
}

#[test]
fn test_preset_containers_are_kept() {
    let wiring = Wiring::new(false);
    let holder = Containers {
        buffered: Channel::bounded(5),
        items: Value::filled(vec![7]),
        ..Containers::default()
    };

    wiring.initialize(&holder).unwrap();
    assert_eq!(holder.items.get(), Some(&vec![7]));
    assert_eq!(holder.buffered.capacity(), Some(5));
}

#[derive(Default, Injectable)]
struct BadChannel {
    #[inject("size[abc]")]
    channel: Channel<i32>,
}

#[derive(Default, Injectable)]
struct OversizedSlice {
    #[inject("size[11] cap[10]")]
    items: Value<Vec<i32>>,
}

#[derive(Default, Injectable)]
struct BadSliceSize {
    #[inject("size[!]")]
    items: Value<Vec<i32>>,
}

#[derive(Default, Injectable)]
struct BadSliceCap {
    #[inject("cap[arf]")]
    items: Value<Vec<i32>>,
}

#[derive(Default, Injectable)]
struct FixedText {
    #[inject("env[HOME]")]
    home: String,
}

#[test]
fn test_container_directive_errors() {
    let wiring = Wiring::new(false);

    let results = [
        wiring.initialize(&BadChannel::default()),
        wiring.initialize(&OversizedSlice::default()),
        wiring.initialize(&BadSliceSize::default()),
        wiring.initialize(&BadSliceCap::default()),
    ];
    for result in results {
        assert_eq!(kind_of(result), ErrorKind::IncorrectDirectiveConfiguration);
    }

    assert_eq!(
        kind_of(wiring.initialize(&FixedText::default())),
        ErrorKind::CannotBeHolder
    );
}
