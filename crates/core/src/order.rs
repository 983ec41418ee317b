//! Order-progress state machine.
//!
//! An order moves through a fixed, ordered [`StepSequence`] strictly forward.
//! Which step follows which, and after how long, is a [`ProgressPlan`]: a
//! transition need not target the adjacent step (the delivery-only flow skips
//! "ready for pickup"). [`OrderProgress`] is the clock-free state machine;
//! timers live with whoever drives it.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of an order step (`confirmed`, `preparing`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Well-known step identifiers of the standard sequence.
pub mod steps {
    pub const CONFIRMED: &str = "confirmed";
    pub const PREPARING: &str = "preparing";
    pub const PICKUP: &str = "pickup";
    pub const DELIVERY: &str = "delivery";
    pub const DELIVERED: &str = "delivered";
}

/// One named stage of the order lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStep {
    pub id: StepId,
    pub name: String,
    /// Zero-based ordinal within the sequence.
    pub position: usize,
    /// Message shown while this step is current.
    pub status_message: Option<String>,
}

/// The fixed, ordered list of steps shown to the customer.
///
/// Step identifiers must be unique; [`ProgressPlan::new`] rejects a sequence
/// that repeats one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSequence {
    steps: Vec<OrderStep>,
}

impl StepSequence {
    /// Build a sequence from `(id, name, status message)` triples in order.
    #[must_use]
    pub fn new<'a>(steps: impl IntoIterator<Item = (&'a str, &'a str, Option<&'a str>)>) -> Self {
        Self {
            steps: steps
                .into_iter()
                .enumerate()
                .map(|(position, (id, name, message))| OrderStep {
                    id: StepId::new(id),
                    name: name.to_string(),
                    position,
                    status_message: message.map(ToString::to_string),
                })
                .collect(),
        }
    }

    /// Confirmed, preparing, ready for pickup, out for delivery, delivered.
    #[must_use]
    pub fn standard() -> Self {
        Self::new([
            (
                steps::CONFIRMED,
                "Order Confirmed",
                Some("Your order is confirmed and the restaurant is preparing it."),
            ),
            (
                steps::PREPARING,
                "Preparing Food",
                Some("The chef is working their magic on your order!"),
            ),
            (steps::PICKUP, "Ready for Pickup", None),
            (
                steps::DELIVERY,
                "Out for Delivery",
                Some("Your order is out for delivery. Track its progress below."),
            ),
            (
                steps::DELIVERED,
                "Delivered",
                Some("Your order has been delivered. Enjoy your meal!"),
            ),
        ])
    }

    #[must_use]
    pub fn steps(&self) -> &[OrderStep] {
        &self.steps
    }

    /// Find a step by identifier (linear scan).
    #[must_use]
    pub fn find(&self, id: &StepId) -> Option<&OrderStep> {
        self.steps.iter().find(|step| &step.id == id)
    }

    #[must_use]
    pub fn first(&self) -> Option<&OrderStep> {
        self.steps.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&OrderStep> {
        self.steps.last()
    }
}

/// A timed, unconditional move from one step to a later one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: StepId,
    pub to: StepId,
    pub delay: Duration,
}

impl Transition {
    #[must_use]
    pub fn new(from: &str, to: &str, delay: Duration) -> Self {
        Self {
            from: StepId::new(from),
            to: StepId::new(to),
            delay,
        }
    }
}

/// Which route an order takes through the standard sequence.
///
/// The standard sequence declares a "ready for pickup" step that a delivery
/// order has no reason to stop at. Both readings are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryFlow {
    /// Preparing goes straight to out-for-delivery; pickup is never visited.
    #[default]
    DeliveryOnly,
    /// Every declared step is visited in order.
    WithPickup,
}

impl FromStr for DeliveryFlow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery-only" => Ok(Self::DeliveryOnly),
            "with-pickup" => Ok(Self::WithPickup),
            _ => Err(format!(
                "invalid delivery flow: {s} (expected delivery-only or with-pickup)"
            )),
        }
    }
}

impl fmt::Display for DeliveryFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeliveryOnly => f.write_str("delivery-only"),
            Self::WithPickup => f.write_str("with-pickup"),
        }
    }
}

/// Errors rejected when assembling a [`ProgressPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("step sequence is empty")]
    EmptySequence,
    #[error("step '{0}' is declared more than once")]
    DuplicateStep(StepId),
    #[error("transition references unknown step '{0}'")]
    UnknownStep(StepId),
    #[error("transition {from} -> {to} does not move forward")]
    NotForward { from: StepId, to: StepId },
    #[error("step '{0}' has more than one outgoing transition")]
    DuplicateTransition(StepId),
    #[error("terminal step '{0}' cannot have an outgoing transition")]
    FromTerminal(StepId),
}

/// A step sequence plus the transitions that advance through it.
///
/// Only built through [`ProgressPlan::new`] or [`ProgressPlan::standard`], so
/// every plan in hand has passed the checks in `new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressPlan {
    sequence: StepSequence,
    transitions: Vec<Transition>,
}

impl ProgressPlan {
    /// Assemble and check a plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the sequence is empty or repeats a step id,
    /// a transition names an unknown step, moves backward or sideways, leaves
    /// the terminal step, or a step has two outgoing transitions.
    pub fn new(sequence: StepSequence, transitions: Vec<Transition>) -> Result<Self, PlanError> {
        let terminal = sequence.last().ok_or(PlanError::EmptySequence)?.id.clone();

        let steps = sequence.steps();
        for (index, step) in steps.iter().enumerate() {
            if steps.iter().take(index).any(|earlier| earlier.id == step.id) {
                return Err(PlanError::DuplicateStep(step.id.clone()));
            }
        }

        for (index, transition) in transitions.iter().enumerate() {
            let from = sequence
                .find(&transition.from)
                .ok_or_else(|| PlanError::UnknownStep(transition.from.clone()))?;
            let to = sequence
                .find(&transition.to)
                .ok_or_else(|| PlanError::UnknownStep(transition.to.clone()))?;

            if from.id == terminal {
                return Err(PlanError::FromTerminal(from.id.clone()));
            }
            if to.position <= from.position {
                return Err(PlanError::NotForward {
                    from: from.id.clone(),
                    to: to.id.clone(),
                });
            }
            if transitions
                .iter()
                .take(index)
                .any(|earlier| earlier.from == transition.from)
            {
                return Err(PlanError::DuplicateTransition(transition.from.clone()));
            }
        }

        Ok(Self {
            sequence,
            transitions,
        })
    }

    /// The standard sequence with the timings for the given flow.
    ///
    /// Delivery-only: confirmed 3s, preparing 5s, out for delivery 7s.
    /// With pickup: the 5s after preparing lands on pickup, then 2s to delivery.
    #[must_use]
    pub fn standard(flow: DeliveryFlow) -> Self {
        use steps::{CONFIRMED, DELIVERED, DELIVERY, PICKUP, PREPARING};

        let transitions = match flow {
            DeliveryFlow::DeliveryOnly => vec![
                Transition::new(CONFIRMED, PREPARING, Duration::from_secs(3)),
                Transition::new(PREPARING, DELIVERY, Duration::from_secs(5)),
                Transition::new(DELIVERY, DELIVERED, Duration::from_secs(7)),
            ],
            DeliveryFlow::WithPickup => vec![
                Transition::new(CONFIRMED, PREPARING, Duration::from_secs(3)),
                Transition::new(PREPARING, PICKUP, Duration::from_secs(5)),
                Transition::new(PICKUP, DELIVERY, Duration::from_secs(2)),
                Transition::new(DELIVERY, DELIVERED, Duration::from_secs(7)),
            ],
        };

        Self {
            sequence: StepSequence::standard(),
            transitions,
        }
    }

    #[must_use]
    pub const fn sequence(&self) -> &StepSequence {
        &self.sequence
    }

    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Outgoing transition of a step, if any.
    #[must_use]
    pub fn transition_from(&self, id: &StepId) -> Option<&Transition> {
        self.transitions.iter().find(|t| &t.from == id)
    }

    /// Sum of delays from the first step until no transition remains.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        let mut total = Duration::ZERO;
        let mut current = self.sequence.first().map(|step| step.id.clone());
        while let Some(transition) = current.as_ref().and_then(|id| self.transition_from(id)) {
            total += transition.delay;
            current = Some(transition.to.clone());
        }
        total
    }
}

/// How a step should be drawn relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

/// The running state machine for one order.
///
/// Starts at the first step of the plan. The active step is tracked by
/// identifier and only ever moves forward along the plan's transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderProgress {
    plan: ProgressPlan,
    current: StepId,
    visited: Vec<StepId>,
}

impl OrderProgress {
    /// Start at the first step.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::EmptySequence`] if the plan has no steps.
    pub fn start(plan: ProgressPlan) -> Result<Self, PlanError> {
        let first = plan
            .sequence
            .first()
            .ok_or(PlanError::EmptySequence)?
            .id
            .clone();

        Ok(Self {
            plan,
            visited: vec![first.clone()],
            current: first,
        })
    }

    #[must_use]
    pub const fn plan(&self) -> &ProgressPlan {
        &self.plan
    }

    #[must_use]
    pub const fn current_id(&self) -> &StepId {
        &self.current
    }

    /// The current step (looked up by identifier).
    #[must_use]
    pub fn current(&self) -> Option<&OrderStep> {
        self.plan.sequence.find(&self.current)
    }

    /// Steps visited so far, in order, including the current one.
    #[must_use]
    pub fn visited(&self) -> &[StepId] {
        &self.visited
    }

    /// The transition that will fire next, if the order is not finished.
    #[must_use]
    pub fn next_transition(&self) -> Option<&Transition> {
        self.plan.transition_from(&self.current)
    }

    /// Whether the current step is the last declared step.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.plan
            .sequence
            .last()
            .is_some_and(|last| last.id == self.current)
    }

    /// Take the outgoing transition of the current step.
    ///
    /// Returns the new current step id, or `None` if nothing follows.
    pub fn advance(&mut self) -> Option<&StepId> {
        let next = self.next_transition()?.to.clone();
        self.visited.push(next.clone());
        self.current = next;
        Some(&self.current)
    }

    /// Every step paired with its display state.
    ///
    /// Steps before the current position are completed, including ones the
    /// plan skipped over.
    #[must_use]
    pub fn step_states(&self) -> Vec<(&OrderStep, StepState)> {
        let current_position = self.current().map_or(0, |step| step.position);
        self.plan
            .sequence
            .steps()
            .iter()
            .map(|step| {
                let state = match step.position.cmp(&current_position) {
                    std::cmp::Ordering::Less => StepState::Completed,
                    std::cmp::Ordering::Equal => StepState::Current,
                    std::cmp::Ordering::Greater => StepState::Upcoming,
                };
                (step, state)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn ids(progress: &OrderProgress) -> Vec<&str> {
        progress.visited().iter().map(StepId::as_str).collect()
    }

    #[test]
    fn test_starts_at_first_step() {
        let progress =
            OrderProgress::start(ProgressPlan::standard(DeliveryFlow::DeliveryOnly)).unwrap();
        assert_eq!(progress.current_id().as_str(), steps::CONFIRMED);
        assert_eq!(progress.current().unwrap().name, "Order Confirmed");
        assert!(!progress.is_terminal());
    }

    #[test]
    fn test_delivery_only_skips_pickup() {
        let mut progress =
            OrderProgress::start(ProgressPlan::standard(DeliveryFlow::DeliveryOnly)).unwrap();
        while progress.advance().is_some() {}

        assert_eq!(ids(&progress), ["confirmed", "preparing", "delivery", "delivered"]);
        assert!(progress.is_terminal());
        assert!(progress.next_transition().is_none());
    }

    #[test]
    fn test_with_pickup_visits_every_step() {
        let mut progress =
            OrderProgress::start(ProgressPlan::standard(DeliveryFlow::WithPickup)).unwrap();
        while progress.advance().is_some() {}

        assert_eq!(
            ids(&progress),
            ["confirmed", "preparing", "pickup", "delivery", "delivered"]
        );
    }

    #[test]
    fn test_advance_at_terminal_is_noop() {
        let mut progress =
            OrderProgress::start(ProgressPlan::standard(DeliveryFlow::DeliveryOnly)).unwrap();
        while progress.advance().is_some() {}
        let before = progress.clone();

        assert!(progress.advance().is_none());
        assert_eq!(progress, before);
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(
            ProgressPlan::standard(DeliveryFlow::DeliveryOnly).total_duration(),
            Duration::from_secs(15)
        );
        assert_eq!(
            ProgressPlan::standard(DeliveryFlow::WithPickup).total_duration(),
            Duration::from_secs(17)
        );
    }

    #[test]
    fn test_step_states_mark_skipped_steps_completed() {
        let mut progress =
            OrderProgress::start(ProgressPlan::standard(DeliveryFlow::DeliveryOnly)).unwrap();
        progress.advance();
        progress.advance();

        let states: Vec<StepState> = progress.step_states().into_iter().map(|(_, s)| s).collect();
        assert_eq!(
            states,
            [
                StepState::Completed,
                StepState::Completed,
                StepState::Completed,
                StepState::Current,
                StepState::Upcoming,
            ]
        );
    }

    #[test]
    fn test_plan_rejects_backward_transition() {
        let err = ProgressPlan::new(
            StepSequence::standard(),
            vec![Transition::new("delivery", "preparing", Duration::from_secs(1))],
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::NotForward { .. }));
    }

    #[test]
    fn test_plan_rejects_self_transition() {
        let err = ProgressPlan::new(
            StepSequence::standard(),
            vec![Transition::new("preparing", "preparing", Duration::from_secs(1))],
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::NotForward { .. }));
    }

    #[test]
    fn test_plan_rejects_unknown_step() {
        let err = ProgressPlan::new(
            StepSequence::standard(),
            vec![Transition::new("confirmed", "teleported", Duration::from_secs(1))],
        )
        .unwrap_err();
        assert_eq!(err, PlanError::UnknownStep(StepId::new("teleported")));
    }

    #[test]
    fn test_plan_rejects_duplicate_outgoing() {
        let err = ProgressPlan::new(
            StepSequence::standard(),
            vec![
                Transition::new("confirmed", "preparing", Duration::from_secs(1)),
                Transition::new("confirmed", "delivery", Duration::from_secs(1)),
            ],
        )
        .unwrap_err();
        assert_eq!(err, PlanError::DuplicateTransition(StepId::new("confirmed")));
    }

    #[test]
    fn test_plan_rejects_duplicate_step_ids() {
        let sequence = StepSequence::new([
            ("confirmed", "Order Confirmed", None),
            ("preparing", "Preparing Food", None),
            ("confirmed", "Confirmed Again", None),
        ]);
        let err = ProgressPlan::new(
            sequence,
            vec![Transition::new("confirmed", "preparing", Duration::from_secs(1))],
        )
        .unwrap_err();
        assert_eq!(err, PlanError::DuplicateStep(StepId::new("confirmed")));
    }

    #[test]
    fn test_plan_rejects_empty_sequence() {
        let err = ProgressPlan::new(StepSequence::new([]), vec![]).unwrap_err();
        assert_eq!(err, PlanError::EmptySequence);
    }

    #[test]
    fn test_standard_plans_are_valid() {
        for flow in [DeliveryFlow::DeliveryOnly, DeliveryFlow::WithPickup] {
            let plan = ProgressPlan::standard(flow);
            let rebuilt = ProgressPlan::new(plan.sequence().clone(), plan.transitions().to_vec());
            assert_eq!(rebuilt.unwrap(), plan);
        }
    }

    #[test]
    fn test_delivery_flow_parse() {
        assert_eq!("with-pickup".parse::<DeliveryFlow>().unwrap(), DeliveryFlow::WithPickup);
        assert_eq!(
            "delivery-only".parse::<DeliveryFlow>().unwrap(),
            DeliveryFlow::DeliveryOnly
        );
        assert!("drone".parse::<DeliveryFlow>().is_err());
        assert_eq!(DeliveryFlow::WithPickup.to_string(), "with-pickup");
    }
}
