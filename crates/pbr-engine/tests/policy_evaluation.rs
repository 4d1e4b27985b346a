//! Integration tests for packet policy evaluation
//!
//! These tests drive `PacketPolicyEvaluator` end to end, with the default
//! collaborators and with mock ACL matcher / transformation evaluators.

use pbr_engine::{
    AccessList, AclLine, AclLineMatchExpr, AclMatcher, AclsByName, Action, BoolExpr,
    EvaluationEnv, EvaluatorConfig, Fib, FibAction, FibEntry, FibsByVrf, FilterStep, FilterType,
    HeaderSpaceMatcher, IpSpacesByName, PacketPolicy, PacketPolicyEvaluator, PacketPolicyResult,
    Statement, StepAction, StepTransformationEvaluator, TraceStep, Transformation,
    TransformationEvaluator, TransformationResult, TransformationTraceStep, TransformationType,
    VrfExpr,
};
use pbr_types::{Flow, IpAddress, IpPrefix};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pbr_engine=trace")
        .with_test_writer()
        .try_init();
}

/// Matcher that counts calls and delegates to `HeaderSpaceMatcher`.
#[derive(Default)]
struct CountingMatcher {
    calls: AtomicUsize,
}

impl CountingMatcher {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AclMatcher for CountingMatcher {
    fn matches(
        &self,
        expr: &AclLineMatchExpr,
        flow: &Flow,
        ingress_interface: Option<&str>,
        acls: &AclsByName,
        ip_spaces: &IpSpacesByName,
    ) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HeaderSpaceMatcher.matches(expr, flow, ingress_interface, acls, ip_spaces)
    }
}

/// Transformation evaluator returning a fixed flow and trace.
struct FixedTransformer {
    output_flow: Flow,
    trace_steps: Vec<TraceStep>,
}

impl TransformationEvaluator for FixedTransformer {
    fn eval(
        &self,
        _transformation: &Transformation,
        _flow: &Flow,
        _ingress_interface: Option<&str>,
        _acls: &AclsByName,
        _ip_spaces: &IpSpacesByName,
    ) -> TransformationResult {
        TransformationResult {
            output_flow: self.output_flow.clone(),
            trace_steps: self.trace_steps.clone(),
        }
    }
}

/// Test fixture holding the network state an evaluation runs against.
struct Network {
    acls: AclsByName,
    ip_spaces: IpSpacesByName,
    fibs: FibsByVrf,
}

impl Network {
    fn new() -> Self {
        Self {
            acls: AclsByName::new(),
            ip_spaces: IpSpacesByName::new(),
            fibs: FibsByVrf::new(),
        }
    }

    fn with_acl(mut self, acl: AccessList) -> Self {
        self.acls.insert(acl.name.clone(), acl);
        self
    }

    fn with_fib(mut self, vrf: &str, fib: Fib) -> Self {
        self.fibs.insert(vrf.to_string(), fib);
        self
    }

    fn env(&self) -> EvaluationEnv<'_> {
        EvaluationEnv::new("Ethernet0", "default", &self.acls, &self.ip_spaces, &self.fibs)
    }
}

fn net_10() -> IpPrefix {
    "10.0.0.0/24".parse().unwrap()
}

fn flow_to(dst: IpAddress) -> Flow {
    Flow::builder("r1")
        .with_ingress_interface("Ethernet0")
        .with_src_ip(IpAddress::v4(192, 168, 1, 10))
        .with_dst_ip(dst)
        .with_dst_port(443)
        .build()
}

fn policy(statements: Vec<Statement>) -> PacketPolicy {
    PacketPolicy::new("pbr", statements, Action::fib_lookup("default"))
}

fn a1() -> Action {
    Action::fib_lookup("vrf1")
}

fn a2() -> Action {
    Action::fib_lookup("vrf2")
}

fn dst_in_10() -> AclLineMatchExpr {
    AclLineMatchExpr::match_dst_prefix(net_10())
}

#[test]
fn test_first_return_wins() {
    let net = Network::new();
    let evaluator = PacketPolicyEvaluator::default();
    let p = policy(vec![Statement::ret(a1()), Statement::ret(a2())]);

    for dst in [IpAddress::v4(10, 0, 0, 5), IpAddress::v4(8, 8, 8, 8)] {
        let result = evaluator.evaluate_policy(&flow_to(dst), &p, &net.env()).unwrap();
        assert_eq!(result.action, a1());
        assert!(result.trace_steps.is_empty());
    }
}

#[test]
fn test_false_condition_skips_body() {
    let net = Network::new().with_acl(AccessList::new(
        "deny-all",
        vec![AclLine::deny(AclLineMatchExpr::True)],
    ));
    let p = policy(vec![
        Statement::if_then(
            BoolExpr::False,
            vec![Statement::apply_filter("deny-all"), Statement::ret(a1())],
        ),
        Statement::ret(a2()),
    ]);

    let result = PacketPolicyEvaluator::default()
        .evaluate_policy(&flow_to(IpAddress::v4(10, 0, 0, 5)), &p, &net.env())
        .unwrap();
    assert_eq!(result.action, a2());
    assert!(result.trace_steps.is_empty());
}

fn permit_all() -> AccessList {
    AccessList::new("permit-all", vec![AclLine::permit(AclLineMatchExpr::True)])
}

fn evaluate_with_permit_all(p: &PacketPolicy) -> PacketPolicyResult {
    let net = Network::new().with_acl(permit_all());
    PacketPolicyEvaluator::default()
        .evaluate_policy(&flow_to(IpAddress::v4(10, 0, 0, 5)), p, &net.env())
        .unwrap()
}

#[test]
fn test_true_condition_body_falls_through() {
    let p = policy(vec![
        Statement::if_then(BoolExpr::True, vec![Statement::apply_filter("permit-all")]),
        Statement::ret(a2()),
    ]);

    let result = evaluate_with_permit_all(&p);
    assert_eq!(result.action, a2());
    assert_eq!(result.trace_steps.len(), 1);
    assert_eq!(result.trace_steps[0].action(), StepAction::Permitted);
}

#[test]
fn test_true_condition_body_returns() {
    let p = policy(vec![
        Statement::if_then(
            BoolExpr::True,
            vec![Statement::apply_filter("permit-all"), Statement::ret(a1())],
        ),
        Statement::ret(a2()),
    ]);

    let result = evaluate_with_permit_all(&p);
    assert_eq!(result.action, a1());
    assert_eq!(result.trace_steps.len(), 1);
}

#[test]
fn test_nested_ifs_return_first_inner_action() {
    let p = policy(vec![
        Statement::if_then(
            BoolExpr::True,
            vec![
                Statement::if_then(BoolExpr::False, vec![Statement::ret(Action::Drop)]),
                Statement::if_then(
                    BoolExpr::True,
                    vec![
                        Statement::if_then(BoolExpr::True, vec![Statement::ret(a1())]),
                        Statement::ret(Action::Drop),
                    ],
                ),
                Statement::ret(Action::Drop),
            ],
        ),
        Statement::ret(a2()),
    ]);

    let result = evaluate_with_permit_all(&p);
    assert_eq!(result.action, a1());
    assert!(result.trace_steps.is_empty());
}

#[test]
fn test_inner_fall_through_continues_outer_body() {
    let p = policy(vec![
        Statement::if_then(
            BoolExpr::True,
            vec![
                Statement::if_then(BoolExpr::True, vec![Statement::apply_filter("permit-all")]),
                Statement::ret(a1()),
            ],
        ),
        Statement::ret(a2()),
    ]);

    let result = evaluate_with_permit_all(&p);
    assert_eq!(result.action, a1());
    assert_eq!(result.trace_steps.len(), 1);
}

#[test]
fn test_nested_fall_through_reaches_next_statement() {
    let p = policy(vec![
        Statement::if_then(
            BoolExpr::True,
            vec![Statement::if_then(
                BoolExpr::True,
                vec![Statement::apply_filter("permit-all")],
            )],
        ),
        Statement::ret(a2()),
    ]);

    let result = evaluate_with_permit_all(&p);
    assert_eq!(result.action, a2());
    assert_eq!(result.trace_steps.len(), 1);
}

#[test]
fn test_conjunction_with_true_matches_alone() {
    let net = Network::new();
    let evaluator = PacketPolicyEvaluator::default();
    let x = BoolExpr::packet_match(dst_in_10());
    let with_true = BoolExpr::and(vec![BoolExpr::True, x.clone()]).unwrap();

    for dst in [
        IpAddress::v4(10, 0, 0, 5),
        IpAddress::v4(10, 0, 1, 5),
        IpAddress::v4(8, 8, 8, 8),
    ] {
        let flow = flow_to(dst);
        let run = |cond: &BoolExpr| {
            let p = policy(vec![Statement::if_then(cond.clone(), vec![Statement::ret(a1())])]);
            evaluator.evaluate(&flow, &p, &net.env(), &a2()).unwrap()
        };
        let alone = run(&x);
        let combined = run(&with_true);
        assert_eq!(alone, combined);
    }
}

#[test]
fn test_conjunction_short_circuits() {
    let net = Network::new();
    let matcher = Arc::new(CountingMatcher::default());
    let evaluator = PacketPolicyEvaluator::new(
        matcher.clone(),
        Arc::new(StepTransformationEvaluator::default()),
    );
    let cond = BoolExpr::and(vec![
        BoolExpr::False,
        BoolExpr::packet_match(dst_in_10()),
    ])
    .unwrap();
    let p = policy(vec![Statement::if_then(cond, vec![Statement::ret(a1())])]);

    let result = evaluator
        .evaluate_policy(&flow_to(IpAddress::v4(10, 0, 0, 5)), &p, &net.env())
        .unwrap();
    assert_eq!(result.action, Action::fib_lookup("default"));
    assert_eq!(matcher.calls(), 0);
}

#[test]
fn test_apply_filter_deny_drops() {
    let net = Network::new().with_acl(AccessList::new(
        "A",
        vec![
            AclLine::deny(dst_in_10()),
            AclLine::permit(AclLineMatchExpr::True),
        ],
    ));
    let p = policy(vec![Statement::apply_filter("A"), Statement::ret(a1())]);
    let flow = flow_to(IpAddress::v4(10, 0, 0, 5));

    let result = PacketPolicyEvaluator::default()
        .evaluate_policy(&flow, &p, &net.env())
        .unwrap();
    assert_eq!(result.action, Action::Drop);
    assert_eq!(
        result.trace_steps,
        vec![TraceStep::Filter(FilterStep {
            filter: "A".to_string(),
            filter_type: FilterType::IngressFilter,
            input_interface: "Ethernet0".to_string(),
            flow: flow.clone(),
            action: StepAction::Denied,
        })]
    );
}

#[test]
fn test_apply_filter_permit_continues() {
    let net = Network::new().with_acl(AccessList::new(
        "A",
        vec![
            AclLine::deny(dst_in_10()),
            AclLine::permit(AclLineMatchExpr::True),
        ],
    ));
    let p = policy(vec![Statement::apply_filter("A"), Statement::ret(a1())]);
    let flow = flow_to(IpAddress::v4(8, 8, 8, 8));

    let result = PacketPolicyEvaluator::default()
        .evaluate_policy(&flow, &p, &net.env())
        .unwrap();
    assert_eq!(result.action, a1());
    assert_eq!(
        result.trace_steps,
        vec![TraceStep::Filter(FilterStep {
            filter: "A".to_string(),
            filter_type: FilterType::IngressFilter,
            input_interface: "Ethernet0".to_string(),
            flow,
            action: StepAction::Permitted,
        })]
    );
}

#[test]
fn test_transformation_then_return() {
    let net = Network::new();
    let input = flow_to(IpAddress::v4(10, 0, 0, 5));
    let rewritten = input
        .to_builder()
        .with_src_ip(IpAddress::v4(203, 0, 113, 9))
        .build();
    let steps = vec![TraceStep::Transformation(TransformationTraceStep {
        transformation_type: TransformationType::SourceNat,
        flow_diffs: pbr_engine::FlowDiff::between(&input, &rewritten),
        action: StepAction::Transformed,
    })];
    let evaluator = PacketPolicyEvaluator::new(
        Arc::new(HeaderSpaceMatcher),
        Arc::new(FixedTransformer {
            output_flow: rewritten.clone(),
            trace_steps: steps.clone(),
        }),
    );
    let p = policy(vec![
        Statement::apply_transformation(Transformation::always(TransformationType::SourceNat)),
        Statement::ret(a1()),
    ]);

    let result = evaluator.evaluate_policy(&input, &p, &net.env()).unwrap();
    assert_eq!(result.action, a1());
    assert_eq!(result.final_flow, rewritten);
    assert_eq!(result.trace_steps, steps);
}

#[test]
fn test_condition_sees_transformed_flow() {
    let net = Network::new();
    let nat = Transformation::always(TransformationType::DestNat).apply(
        pbr_engine::TransformationStep::AssignDestinationIp(IpAddress::v4(10, 0, 0, 77)),
    );
    let p = policy(vec![
        Statement::apply_transformation(nat),
        Statement::if_then(BoolExpr::packet_match(dst_in_10()), vec![Statement::ret(a1())]),
    ]);

    let result = PacketPolicyEvaluator::default()
        .evaluate_policy(&flow_to(IpAddress::v4(8, 8, 8, 8)), &p, &net.env())
        .unwrap();
    assert_eq!(result.action, a1());
    assert_eq!(result.final_flow.dst_ip(), IpAddress::v4(10, 0, 0, 77));
}

#[test]
fn test_empty_policy_returns_default() {
    let net = Network::new();
    let flow = flow_to(IpAddress::v4(10, 0, 0, 5));

    let result = PacketPolicyEvaluator::default()
        .evaluate(&flow, &policy(vec![]), &net.env(), &Action::Drop)
        .unwrap();
    assert_eq!(result.action, Action::Drop);
    assert_eq!(result.final_flow, flow);
    assert!(result.trace_steps.is_empty());
}

#[test]
fn test_destination_prefix_scenario() {
    let net = Network::new();
    let p = PacketPolicy::new(
        "pbr",
        vec![
            Statement::if_then(BoolExpr::packet_match(dst_in_10()), vec![Statement::ret(Action::Drop)]),
            Statement::ret(Action::fib_lookup("default")),
        ],
        Action::Drop,
    );

    let hit = pbr_engine::evaluate(
        &flow_to(IpAddress::v4(10, 0, 0, 5)),
        "Ethernet0",
        "default",
        &p,
        &net.acls,
        &net.ip_spaces,
        &net.fibs,
        &p.default_action,
    )
    .unwrap();
    assert_eq!(hit.action, Action::Drop);
    assert!(hit.trace_steps.is_empty());

    let miss = pbr_engine::evaluate_policy(
        &flow_to(IpAddress::v4(8, 8, 8, 8)),
        "Ethernet0",
        "default",
        &p,
        &net.acls,
        &net.ip_spaces,
        &net.fibs,
    )
    .unwrap();
    assert_eq!(miss.action, Action::fib_lookup("default"));
    assert!(miss.trace_steps.is_empty());
}

/// Builds FIBs where `default` leaks into `vrf1`, `vrf1` into `vrf2`, and
/// so on for `depth` hops; the last VRF forwards out of `terminal`.
fn next_vrf_chain(depth: usize, terminal: &str) -> Network {
    let name = |i: usize| if i == 0 { "default".to_string() } else { format!("vrf{}", i) };
    let mut net = Network::new();
    for i in 0..depth {
        net = net.with_fib(
            &name(i),
            Fib::new().with_entry(FibEntry::new(net_10(), FibAction::next_vrf(name(i + 1)))),
        );
    }
    net.with_fib(
        &name(depth),
        Fib::new().with_entry(FibEntry::connected(net_10(), terminal)),
    )
}

fn outgoing_policy(interfaces: &[&str]) -> PacketPolicy {
    policy(vec![Statement::if_then(
        BoolExpr::outgoing_interface_is_one_of(VrfExpr::IngressInterfaceVrf, interfaces.iter().copied()),
        vec![Statement::ret(a1())],
    )])
}

#[test]
fn test_next_vrf_chain_resolves_terminal_interface() {
    init_tracing();
    let evaluator = PacketPolicyEvaluator::default();
    let flow = flow_to(IpAddress::v4(10, 0, 0, 5));

    for depth in [0, 1, 5, 20] {
        let net = next_vrf_chain(depth, "Ethernet40");
        let hit = evaluator
            .evaluate_policy(&flow, &outgoing_policy(&["Ethernet40"]), &net.env())
            .unwrap();
        assert_eq!(hit.action, a1(), "depth {}", depth);

        let miss = evaluator
            .evaluate_policy(&flow, &outgoing_policy(&["Ethernet44"]), &net.env())
            .unwrap();
        assert_eq!(miss.action, Action::fib_lookup("default"), "depth {}", depth);
    }
}

#[test]
fn test_next_vrf_depth_limit() {
    let net = next_vrf_chain(5, "Ethernet40");
    let flow = flow_to(IpAddress::v4(10, 0, 0, 5));
    let p = outgoing_policy(&["Ethernet40"]);

    let deep_enough = PacketPolicyEvaluator::default()
        .with_config(EvaluatorConfig::default().with_max_next_vrf_depth(5));
    assert_eq!(deep_enough.evaluate_policy(&flow, &p, &net.env()).unwrap().action, a1());

    let too_shallow = PacketPolicyEvaluator::default()
        .with_config(EvaluatorConfig::default().with_max_next_vrf_depth(4));
    assert_eq!(
        too_shallow.evaluate_policy(&flow, &p, &net.env()).unwrap().action,
        Action::fib_lookup("default")
    );
}

#[test]
fn test_next_vrf_cycle_terminates() {
    init_tracing();
    let net = Network::new()
        .with_fib(
            "default",
            Fib::new()
                .with_entry(FibEntry::new(net_10(), FibAction::next_vrf("red")))
                .with_entry(FibEntry::new(net_10(), FibAction::next_vrf("blue"))),
        )
        .with_fib(
            "red",
            Fib::new().with_entry(FibEntry::new(net_10(), FibAction::next_vrf("default"))),
        )
        .with_fib(
            "blue",
            Fib::new().with_entry(FibEntry::connected(net_10(), "Ethernet8")),
        );
    let flow = flow_to(IpAddress::v4(10, 0, 0, 5));
    let evaluator = PacketPolicyEvaluator::default();

    // The red branch loops back; the blue branch still reaches Ethernet8.
    let hit = evaluator
        .evaluate_policy(&flow, &outgoing_policy(&["Ethernet8"]), &net.env())
        .unwrap();
    assert_eq!(hit.action, a1());

    let miss = evaluator
        .evaluate_policy(&flow, &outgoing_policy(&["Ethernet12"]), &net.env())
        .unwrap();
    assert_eq!(miss.action, Action::fib_lookup("default"));
}

#[test]
fn test_evaluator_shared_across_threads() {
    let evaluator = Arc::new(PacketPolicyEvaluator::default());
    let p = Arc::new(policy(vec![Statement::if_then(
        BoolExpr::packet_match(dst_in_10()),
        vec![Statement::ret(Action::Drop)],
    )]));

    let handles: Vec<_> = (0..4u8)
        .map(|i| {
            let evaluator = Arc::clone(&evaluator);
            let p = Arc::clone(&p);
            std::thread::spawn(move || {
                let net = Network::new();
                let flow = flow_to(IpAddress::v4(10, 0, i, 5));
                evaluator.evaluate_policy(&flow, &p, &net.env()).unwrap().action
            })
        })
        .collect();

    let actions: Vec<Action> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        actions,
        vec![
            Action::Drop,
            Action::fib_lookup("default"),
            Action::fib_lookup("default"),
            Action::fib_lookup("default"),
        ]
    );
}
