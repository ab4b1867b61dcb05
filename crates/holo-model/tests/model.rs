//! Tests for holo-model types.

use holo_model::{
    AggregationSpec, AttachOptions, JoinKey, OutputShape, ReplacePolicy, ResultMode, Span,
    TimeWindow,
};

#[test]
fn default_policy_is_asymmetric() {
    assert_eq!(JoinKey::Trial.default_policy(), ReplacePolicy::Replace);
    assert_eq!(JoinKey::Cell.default_policy(), ReplacePolicy::Reject);
}

#[test]
fn attach_options_fall_back_to_key_default() {
    let options = AttachOptions::named("stim");
    assert_eq!(options.policy_for(JoinKey::Trial), ReplacePolicy::Replace);
    assert_eq!(options.policy_for(JoinKey::Cell), ReplacePolicy::Reject);

    let explicit = AttachOptions::named("stim").with_replace(false);
    assert_eq!(explicit.policy_for(JoinKey::Trial), ReplacePolicy::Reject);
}

#[test]
fn by_trial_orders_cell_before_trial() {
    let spec = AggregationSpec::by_trial(["stim"]);
    assert_eq!(spec.group_columns, vec!["cell", "trial", "stim"]);
    assert_eq!(spec.value_column, "value");
    assert_eq!(spec.shape, OutputShape::Stacked);
    assert_eq!(spec.result, ResultMode::Owned);

    let by_cell = AggregationSpec::by_cell(Vec::<String>::new()).pivoted();
    assert_eq!(by_cell.group_columns, vec!["cell"]);
    assert_eq!(by_cell.shape, OutputShape::Pivoted);
}

#[test]
fn spec_serializes_window_mode() {
    let spec = AggregationSpec::new(["cell"]).with_window(TimeWindow::Baselined {
        baseline: Span::new(0.0, 2.0),
        response: Span::new(5.0, 7.0),
    });
    let json = serde_json::to_value(&spec).expect("serialize spec");
    assert_eq!(json["window"]["mode"], "baselined");
    assert_eq!(json["shape"], "stacked");
    let round: AggregationSpec = serde_json::from_value(json).expect("deserialize spec");
    assert_eq!(round, spec);
}
