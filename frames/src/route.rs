use std::collections::VecDeque;

use glam::DVec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::helmert;
use crate::params::{ParameterStore, TransformParameters};
use crate::registry::{FrameCode, FrameRegistry};

/// Which way a stored parameter record is applied in a resolved step.
///
/// Records are fit for one direction only; using one the other way means
/// the exact matrix inverse, and that choice is recorded here explicitly
/// rather than assumed downstream.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Inverse,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub params: TransformParameters,
    pub direction: Direction,
}

impl PathStep {
    /// Frame this step starts from, accounting for direction.
    pub fn from_frame(&self) -> &FrameCode {
        match self.direction {
            Direction::Forward => &self.params.from,
            Direction::Inverse => &self.params.to,
        }
    }

    /// Frame this step lands in, accounting for direction.
    pub fn to_frame(&self) -> &FrameCode {
        match self.direction {
            Direction::Forward => &self.params.to,
            Direction::Inverse => &self.params.from,
        }
    }

    pub fn apply(&self, point: DVec3) -> DVec3 {
        match self.direction {
            Direction::Forward => helmert::forward(&self.params, point),
            Direction::Inverse => helmert::inverse(&self.params, point),
        }
    }
}

/// Ordered sequence of Helmert steps carrying a point from `source` to
/// `target`. Empty steps means source == target (identity).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformPath {
    pub source: FrameCode,
    pub target: FrameCode,
    pub steps: Vec<PathStep>,
}

impl TransformPath {
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Frames visited, source first, target last.
    pub fn frame_sequence(&self) -> Vec<FrameCode> {
        let mut sequence = vec![self.source.clone()];
        sequence.extend(self.steps.iter().map(|step| step.to_frame().clone()));
        sequence
    }

    pub fn describe(&self) -> String {
        self.frame_sequence()
            .iter()
            .map(FrameCode::as_str)
            .collect::<Vec<&str>>()
            .join(" -> ")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveError {
    #[error("Unknown reference frame: {0}")]
    UnknownFrame(FrameCode),
    #[error("No transformation path between frames {source} and {target}")]
    NoTransformPath {
        source: FrameCode,
        target: FrameCode,
    },
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Resolves an ordered list of Helmert steps from `source` to `target`.
///
/// Resolution order: identity, direct record, explicit reverse record, then
/// breadth-first search over the undirected frame graph. BFS yields the
/// fewest parameter hops, which keeps accumulated floating-point error down;
/// ties break on lexical frame-code order so results are reproducible.
pub fn resolve(
    store: &ParameterStore,
    registry: &FrameRegistry,
    source: &FrameCode,
    target: &FrameCode,
) -> ResolveResult<TransformPath> {
    if !registry.is_known(source) {
        return Err(ResolveError::UnknownFrame(source.clone()));
    }
    if !registry.is_known(target) {
        return Err(ResolveError::UnknownFrame(target.clone()));
    }

    if source == target {
        return Ok(TransformPath {
            source: source.clone(),
            target: target.clone(),
            steps: vec![],
        });
    }

    if let Some(step) = step_between(store, source, target) {
        let path = TransformPath {
            source: source.clone(),
            target: target.clone(),
            steps: vec![step],
        };
        debug!(path = %path.describe(), "resolved single-step path");
        return Ok(path);
    }

    let frame_chain = shortest_chain(store, source, target).ok_or_else(|| {
        ResolveError::NoTransformPath {
            source: source.clone(),
            target: target.clone(),
        }
    })?;

    let steps: Vec<PathStep> = frame_chain
        .windows(2)
        .map(|pair| {
            step_between(store, &pair[0], &pair[1])
                .expect("adjacent frames in a BFS chain must share a stored record")
        })
        .collect();

    let path = TransformPath {
        source: source.clone(),
        target: target.clone(),
        steps,
    };
    debug!(path = %path.describe(), "resolved composed path");
    Ok(path)
}

/// Single step between adjacent frames: a direct record applied forward, or
/// an explicit reverse record applied inverse. Direct wins when both exist.
fn step_between(store: &ParameterStore, from: &FrameCode, to: &FrameCode) -> Option<PathStep> {
    if let Some(params) = store.lookup_direct(from, to) {
        return Some(PathStep {
            params: params.clone(),
            direction: Direction::Forward,
        });
    }
    if let Some(params) = store.lookup_direct(to, from) {
        return Some(PathStep {
            params: params.clone(),
            direction: Direction::Inverse,
        });
    }
    None
}

/// Breadth-first search over stored record pairs, returning the frame chain
/// source..=target, or None if the frames are disconnected.
fn shortest_chain(
    store: &ParameterStore,
    source: &FrameCode,
    target: &FrameCode,
) -> Option<Vec<FrameCode>> {
    let adjacency = store.adjacency();

    let mut predecessor: HashMap<FrameCode, FrameCode> = HashMap::new();
    let mut queue: VecDeque<FrameCode> = VecDeque::new();
    queue.push_back(source.clone());
    predecessor.insert(source.clone(), source.clone());

    while let Some(frame) = queue.pop_front() {
        if &frame == target {
            let mut chain = vec![frame.clone()];
            let mut current = frame;
            while &current != source {
                current = predecessor[&current].clone();
                chain.push(current.clone());
            }
            chain.reverse();
            return Some(chain);
        }

        let Some(neighbors) = adjacency.get(&frame) else {
            continue;
        };
        // neighbors are pre-sorted, so first-discovered predecessors are
        // the lexically smallest among equal-length paths
        for neighbor in neighbors {
            if !predecessor.contains_key(neighbor) {
                predecessor.insert(neighbor.clone(), frame.clone());
                queue.push_back(neighbor.clone());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;

    fn record(from: &str, to: &str, tx: f64) -> TransformParameters {
        TransformParameters {
            from: FrameCode::from(from),
            to: FrameCode::from(to),
            translation_m: DVec3::new(tx, 0.0, 0.0),
            rotation_arcsec: DVec3::ZERO,
            scale_ppm: 0.0,
            epoch: None,
        }
    }

    fn store_of(records: Vec<TransformParameters>) -> ParameterStore {
        ParameterStore::from_set(ParameterSet {
            frames: vec![],
            parameters: records,
        })
        .unwrap()
    }

    #[test]
    fn identity_path_is_empty() {
        let store = store_of(vec![record("A", "B", 1.0)]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"A".into(), &"A".into()).unwrap();
        assert!(path.is_identity());
        assert_eq!(path.describe(), "A");
    }

    #[test]
    fn direct_record_gives_forward_step() {
        let store = store_of(vec![record("A", "B", 1.0)]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"A".into(), &"B".into()).unwrap();
        assert_eq!(path.steps.len(), 1);
        assert_eq!(path.steps[0].direction, Direction::Forward);
        assert_eq!(path.describe(), "A -> B");
    }

    #[test]
    fn missing_direct_record_gives_inverse_step() {
        let store = store_of(vec![record("A", "B", 1.0)]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"B".into(), &"A".into()).unwrap();
        assert_eq!(path.steps.len(), 1);
        assert_eq!(path.steps[0].direction, Direction::Inverse);
        assert_eq!(path.steps[0].from_frame(), &FrameCode::from("B"));
        assert_eq!(path.steps[0].to_frame(), &FrameCode::from("A"));
    }

    #[test]
    fn explicit_reverse_record_wins_over_inversion() {
        // both A->B and B->A stored; requesting B->A must use the stored
        // B->A record forward, not invert A->B
        let store = store_of(vec![record("A", "B", 1.0), record("B", "A", -1.5)]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"B".into(), &"A".into()).unwrap();
        assert_eq!(path.steps.len(), 1);
        assert_eq!(path.steps[0].direction, Direction::Forward);
        assert_eq!(path.steps[0].params.from, FrameCode::from("B"));
        assert_eq!(path.steps[0].params.translation_m.x, -1.5);
    }

    #[test]
    fn composes_through_intermediate_frame() {
        let store = store_of(vec![record("A", "B", 1.0), record("B", "C", 2.0)]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"A".into(), &"C".into()).unwrap();
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.describe(), "A -> B -> C");
        assert_eq!(path.steps[0].direction, Direction::Forward);
        assert_eq!(path.steps[1].direction, Direction::Forward);
    }

    #[test]
    fn composed_path_uses_inverse_hops_where_needed() {
        // records point away from the path direction on both hops
        let store = store_of(vec![record("B", "A", 1.0), record("C", "B", 2.0)]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"A".into(), &"C".into()).unwrap();
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.steps[0].direction, Direction::Inverse);
        assert_eq!(path.steps[1].direction, Direction::Inverse);
        assert_eq!(path.frame_sequence().len(), 3);
    }

    #[test]
    fn shortest_path_wins() {
        let store = store_of(vec![
            record("A", "B", 1.0),
            record("B", "C", 2.0),
            record("C", "D", 3.0),
            record("A", "D", 10.0),
        ]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"A".into(), &"D".into()).unwrap();
        assert_eq!(path.steps.len(), 1);
        assert_eq!(path.describe(), "A -> D");
    }

    #[test]
    fn equal_length_paths_break_ties_lexically() {
        // diamond: A-B-Z and A-C-Z, both two hops; B sorts before C
        let store = store_of(vec![
            record("A", "C", 1.0),
            record("A", "B", 2.0),
            record("B", "Z", 3.0),
            record("C", "Z", 4.0),
        ]);
        let registry = store.registry();

        let path = resolve(&store, &registry, &"A".into(), &"Z".into()).unwrap();
        assert_eq!(path.describe(), "A -> B -> Z");

        // same answer on every call
        for _ in 0..10 {
            let again = resolve(&store, &registry, &"A".into(), &"Z".into()).unwrap();
            assert_eq!(again, path);
        }
    }

    #[test]
    fn disconnected_frames_report_no_transform_path() {
        let store = ParameterStore::from_set(ParameterSet {
            frames: vec![FrameCode::from("X")],
            parameters: vec![record("A", "B", 1.0)],
        })
        .unwrap();
        let registry = store.registry();

        let err = resolve(&store, &registry, &"A".into(), &"X".into()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoTransformPath {
                source: FrameCode::from("A"),
                target: FrameCode::from("X"),
            }
        );
    }

    #[test]
    fn unknown_frame_is_distinct_from_missing_path() {
        let store = store_of(vec![record("A", "B", 1.0)]);
        let registry = store.registry();

        let err = resolve(&store, &registry, &"A".into(), &"NOPE".into()).unwrap_err();
        assert_eq!(err, ResolveError::UnknownFrame(FrameCode::from("NOPE")));

        let err = resolve(&store, &registry, &"NOPE".into(), &"B".into()).unwrap_err();
        assert_eq!(err, ResolveError::UnknownFrame(FrameCode::from("NOPE")));
    }
}
