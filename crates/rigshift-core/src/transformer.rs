//! Per-frame pose transformation.
//!
//! [`PoseTransformer`] owns the read-only retargeting table used for a pass,
//! the evaluation-time calibration (mirrors and manual offsets) and the last
//! destination pose written. Rebuilt tables and calibration edits are staged
//! from other threads and picked up at the start of the next frame with a
//! non-blocking `try_lock`; nothing in [`PoseTransformer::evaluate`] blocks
//! or returns an error.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use glam::Quat;
use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::mirror::{MirrorAxes, MirrorSpec};
use crate::retarget::RetargetTable;
use crate::sink::{DestinationPose, PoseSink, SlotOutput};
use crate::slot::{CanonicalSlot, SlotArray};
use crate::source::{ManualOffset, Mirrored, PoseSource, Retargeted};

/// What to do when the source has no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Keep the last written value. A frame with no source at all writes
    /// nothing.
    #[default]
    Hold,
    /// Fall back to the destination rest pose.
    Rest,
}

/// Outcome of one [`PoseTransformer::evaluate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A pose was computed and written.
    Evaluated,
    /// The source was unavailable; the previous pose is held.
    Held,
    /// The source was unavailable; the rest pose was written.
    Rest,
}

/// Diagnostics counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    pub frames_evaluated: u64,
    pub frames_skipped: u64,
    /// Mapped slots that kept a previous value because the source lacked them.
    pub slots_held: u64,
    /// Slots written as rest (unmapped, or unavailable under [`GapPolicy::Rest`]).
    pub slots_rest: u64,
    /// Samples that evaluated to a non-finite transform and were treated as
    /// missing.
    pub slots_rejected: u64,
    pub tables_published: u64,
}

/// Applies the gap policy to one slot the source could not provide.
fn fill_gap(policy: GapPolicy, output: &mut SlotOutput, stats: &mut FrameStats) {
    match policy {
        GapPolicy::Hold => {
            if output.is_rest() {
                stats.slots_rest += 1;
            } else {
                stats.slots_held += 1;
            }
        }
        GapPolicy::Rest => {
            *output = SlotOutput::Rest;
            stats.slots_rest += 1;
        }
    }
}

// =============================================================================
// Calibration
// =============================================================================

/// Evaluation-time corrections. Never baked into a retargeting table.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub mirrors: MirrorSpec,
    pub manual_offsets: SlotArray<Quat>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            mirrors: MirrorSpec::splat(MirrorAxes::NONE),
            manual_offsets: SlotArray::splat(Quat::IDENTITY),
        }
    }
}

impl Calibration {
    /// Applies one edit.
    pub fn apply(&mut self, edit: CalibrationEdit) {
        match edit {
            CalibrationEdit::Mirror { slot, axes } => self.mirrors[slot] = axes,
            CalibrationEdit::ManualOffset { slot, rotation } => {
                self.manual_offsets[slot] = rotation.normalize()
            }
        }
    }
}

/// A per-slot calibration change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationEdit {
    Mirror { slot: CanonicalSlot, axes: MirrorAxes },
    ManualOffset { slot: CanonicalSlot, rotation: Quat },
}

fn try_lock<T>(mutex: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match mutex.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Queue of calibration edits, shared between the runtime and its callers.
#[derive(Debug, Clone, Default)]
pub struct CalibrationStage {
    pending: Arc<Mutex<Vec<CalibrationEdit>>>,
}

impl CalibrationStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an edit for the next frame.
    pub fn push(&self, edit: CalibrationEdit) {
        lock(&self.pending).push(edit);
    }

    /// Queues a mirror change.
    pub fn set_mirror(&self, slot: CanonicalSlot, axes: MirrorAxes) {
        self.push(CalibrationEdit::Mirror { slot, axes });
    }

    /// Queues a manual offset change.
    pub fn set_manual_offset(&self, slot: CanonicalSlot, rotation: Quat) {
        self.push(CalibrationEdit::ManualOffset { slot, rotation });
    }

    /// Takes every queued edit unless the queue is locked elsewhere.
    fn try_drain(&self) -> Vec<CalibrationEdit> {
        try_lock(&self.pending)
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }
}

/// Slot for a rebuilt table waiting to be picked up by the runtime.
#[derive(Debug, Clone, Default)]
pub struct TableStage {
    pending: Arc<Mutex<Option<Arc<RetargetTable>>>>,
}

impl TableStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `table` for the next frame, replacing any table not yet picked up.
    pub fn publish(&self, table: RetargetTable) {
        *lock(&self.pending) = Some(Arc::new(table));
    }

    /// Returns true when a table is waiting.
    pub fn has_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    fn try_take(&self) -> Option<Arc<RetargetTable>> {
        try_lock(&self.pending).and_then(|mut pending| pending.take())
    }
}

// =============================================================================
// Transformer
// =============================================================================

/// Applies a retargeting table to live poses frame by frame.
#[derive(Debug)]
pub struct PoseTransformer {
    table: Arc<RetargetTable>,
    calibration: Calibration,
    apply_position: bool,
    gap_policy: GapPolicy,
    last: DestinationPose,
    stats: FrameStats,
    table_stage: TableStage,
    calibration_stage: CalibrationStage,
}

impl PoseTransformer {
    pub fn new(table: RetargetTable) -> Self {
        Self {
            table: Arc::new(table),
            calibration: Calibration::default(),
            apply_position: true,
            gap_policy: GapPolicy::default(),
            last: DestinationPose::default(),
            stats: FrameStats::default(),
            table_stage: TableStage::new(),
            calibration_stage: CalibrationStage::new(),
        }
    }

    /// Sets whether positions are written.
    pub fn with_apply_position(mut self, apply_position: bool) -> Self {
        self.apply_position = apply_position;
        self
    }

    /// Sets the gap policy.
    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// Sets the initial calibration.
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Handle for staging rebuilt tables.
    pub fn table_stage(&self) -> TableStage {
        self.table_stage.clone()
    }

    /// Handle for staging calibration edits.
    pub fn calibration_stage(&self) -> CalibrationStage {
        self.calibration_stage.clone()
    }

    /// The table used by the next pass, pending swaps aside.
    pub fn table(&self) -> &RetargetTable {
        &self.table
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// The last pose handed to a sink.
    pub fn last_pose(&self) -> &DestinationPose {
        &self.last
    }

    /// Replaces the table between frames, bypassing the stage.
    ///
    /// Values held from the previous table are dropped: a slot without a
    /// fresh sample falls back to rest under the new table.
    pub fn replace_table(&mut self, table: RetargetTable) {
        self.install_table(Arc::new(table));
    }

    fn install_table(&mut self, table: Arc<RetargetTable>) {
        self.table = table;
        self.last = DestinationPose::default();
        self.stats.tables_published += 1;
        info!(
            "published retarget table: {} slots mapped",
            self.table.mapped_count()
        );
    }

    fn begin_frame(&mut self) {
        if let Some(table) = self.table_stage.try_take() {
            self.install_table(table);
        }
        for edit in self.calibration_stage.try_drain() {
            self.calibration.apply(edit);
        }
    }

    /// Evaluates one frame and writes the result to `sink`.
    ///
    /// `None` means the source produced nothing this frame. Every slot of the
    /// pass reads the same `source` snapshot and the same table.
    pub fn evaluate<S, K>(&mut self, source: Option<&S>, sink: &mut K) -> FrameStatus
    where
        S: PoseSource + ?Sized,
        K: PoseSink + ?Sized,
    {
        self.begin_frame();

        let Some(source) = source else {
            self.stats.frames_skipped += 1;
            trace!("pose source unavailable, policy {:?}", self.gap_policy);
            return match self.gap_policy {
                GapPolicy::Hold => FrameStatus::Held,
                GapPolicy::Rest => {
                    self.last = DestinationPose::default();
                    self.stats.slots_rest += crate::slot::SLOT_COUNT as u64;
                    sink.write_pose(&self.last);
                    FrameStatus::Rest
                }
            };
        };

        let layered = ManualOffset::new(
            Retargeted::new(
                Mirrored::new(source, &self.calibration.mirrors),
                &self.table,
            ),
            &self.calibration.manual_offsets,
        );

        for slot in CanonicalSlot::ALL {
            if !self.table.is_mapped(slot) {
                self.last[slot] = SlotOutput::Rest;
                self.stats.slots_rest += 1;
            } else if layered.available(slot) {
                let rotation = layered.rotation(slot);
                let position = self.apply_position.then(|| layered.position(slot));
                if rotation.is_finite() && position.map_or(true, |p| p.is_finite()) {
                    self.last[slot] = SlotOutput::Retargeted { rotation, position };
                } else {
                    trace!("rejected non-finite sample for {}", slot);
                    self.stats.slots_rejected += 1;
                    fill_gap(self.gap_policy, &mut self.last[slot], &mut self.stats);
                }
            } else {
                fill_gap(self.gap_policy, &mut self.last[slot], &mut self.stats);
            }
        }

        sink.write_pose(&self.last);
        self.stats.frames_evaluated += 1;
        FrameStatus::Evaluated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::MirrorAxis;
    use crate::quat::same_rotation;
    use crate::source::{JointSample, LivePose};
    use glam::Vec3;

    /// A table mapping Hips and Head with identity components.
    fn table() -> RetargetTable {
        let mut table = RetargetTable::unmapped();
        table.set(CanonicalSlot::Hips, Default::default());
        table.set(CanonicalSlot::Head, Default::default());
        table
    }

    #[derive(Default)]
    struct Capture {
        poses: Vec<DestinationPose>,
    }

    impl PoseSink for Capture {
        fn write_pose(&mut self, pose: &DestinationPose) {
            self.poses.push(*pose);
        }
    }

    fn live(slot: CanonicalSlot, rotation: Quat) -> LivePose {
        let mut live = LivePose::new();
        live.set(slot, JointSample::new(rotation, Vec3::new(0.0, 1.0, 0.0)));
        live
    }

    #[test]
    fn test_unmapped_slots_are_rest() {
        let mut transformer = PoseTransformer::new(table());
        let mut sink = Capture::default();
        let mut source = live(CanonicalSlot::Hips, Quat::from_rotation_y(0.5));
        source.set(CanonicalSlot::LeftHand, JointSample::new(Quat::from_rotation_x(1.0), Vec3::ZERO));

        assert_eq!(transformer.evaluate(Some(&source), &mut sink), FrameStatus::Evaluated);
        let pose = &sink.poses[0];
        assert!(matches!(pose[CanonicalSlot::Hips], SlotOutput::Retargeted { .. }));
        assert_eq!(pose[CanonicalSlot::LeftHand], SlotOutput::Rest);
        // Head is mapped but has never been sampled.
        assert_eq!(pose[CanonicalSlot::Head], SlotOutput::Rest);
    }

    #[test]
    fn test_missing_slot_holds_previous_value() {
        let mut transformer = PoseTransformer::new(table());
        let mut sink = Capture::default();
        let q = Quat::from_rotation_z(0.4);

        transformer.evaluate(Some(&live(CanonicalSlot::Head, q)), &mut sink);
        transformer.evaluate(Some(&live(CanonicalSlot::Hips, Quat::IDENTITY)), &mut sink);

        match sink.poses[1][CanonicalSlot::Head] {
            SlotOutput::Retargeted { rotation, .. } => assert!(same_rotation(rotation, q, 1e-5)),
            SlotOutput::Rest => panic!("head should be held"),
        }
        assert_eq!(transformer.stats().slots_held, 1);
    }

    #[test]
    fn test_missing_slot_rest_policy() {
        let mut transformer = PoseTransformer::new(table()).with_gap_policy(GapPolicy::Rest);
        let mut sink = Capture::default();

        transformer.evaluate(Some(&live(CanonicalSlot::Head, Quat::from_rotation_z(0.4))), &mut sink);
        transformer.evaluate(Some(&live(CanonicalSlot::Hips, Quat::IDENTITY)), &mut sink);
        assert_eq!(sink.poses[1][CanonicalSlot::Head], SlotOutput::Rest);
    }

    #[test]
    fn test_gap_hold_writes_nothing() {
        let mut transformer = PoseTransformer::new(table());
        let mut sink = Capture::default();

        let status = transformer.evaluate::<LivePose, _>(None, &mut sink);
        assert_eq!(status, FrameStatus::Held);
        assert!(sink.poses.is_empty());
        assert_eq!(transformer.stats().frames_skipped, 1);
        assert_eq!(transformer.stats().frames_evaluated, 0);
    }

    #[test]
    fn test_gap_rest_writes_rest_pose() {
        let mut transformer = PoseTransformer::new(table()).with_gap_policy(GapPolicy::Rest);
        let mut sink = Capture::default();

        transformer.evaluate(Some(&live(CanonicalSlot::Hips, Quat::from_rotation_y(0.5))), &mut sink);
        let status = transformer.evaluate::<LivePose, _>(None, &mut sink);
        assert_eq!(status, FrameStatus::Rest);
        assert_eq!(sink.poses.len(), 2);
        assert!(sink.poses[1].iter().all(|(_, output)| output.is_rest()));
    }

    #[test]
    fn test_apply_position_flag() {
        let source = live(CanonicalSlot::Hips, Quat::IDENTITY);

        let mut with_position = PoseTransformer::new(table());
        let mut sink = Capture::default();
        with_position.evaluate(Some(&source), &mut sink);
        assert_eq!(
            sink.poses[0][CanonicalSlot::Hips],
            SlotOutput::Retargeted {
                rotation: Quat::IDENTITY,
                position: Some(Vec3::new(0.0, 1.0, 0.0)),
            }
        );

        let mut rotation_only = PoseTransformer::new(table()).with_apply_position(false);
        let mut sink = Capture::default();
        rotation_only.evaluate(Some(&source), &mut sink);
        assert!(matches!(
            sink.poses[0][CanonicalSlot::Hips],
            SlotOutput::Retargeted { position: None, .. }
        ));
    }

    #[test]
    fn test_staged_table_takes_effect_next_frame() {
        let mut transformer = PoseTransformer::new(RetargetTable::unmapped());
        let stage = transformer.table_stage();
        let mut sink = Capture::default();
        let source = live(CanonicalSlot::Hips, Quat::from_rotation_x(0.2));

        transformer.evaluate(Some(&source), &mut sink);
        assert_eq!(sink.poses[0][CanonicalSlot::Hips], SlotOutput::Rest);

        stage.publish(table());
        assert!(stage.has_pending());
        transformer.evaluate(Some(&source), &mut sink);
        assert!(matches!(sink.poses[1][CanonicalSlot::Hips], SlotOutput::Retargeted { .. }));
        assert!(!stage.has_pending());
        assert_eq!(transformer.stats().tables_published, 1);
    }

    #[test]
    fn test_table_swap_drops_held_values() {
        let mut transformer = PoseTransformer::new(table());
        let mut sink = Capture::default();

        transformer.evaluate(Some(&live(CanonicalSlot::Head, Quat::from_rotation_z(0.4))), &mut sink);
        assert!(!transformer.last_pose()[CanonicalSlot::Head].is_rest());

        transformer.replace_table(table());
        assert!(transformer.last_pose()[CanonicalSlot::Head].is_rest());
        assert_eq!(transformer.stats().tables_published, 1);

        transformer.evaluate(Some(&live(CanonicalSlot::Hips, Quat::IDENTITY)), &mut sink);
        assert_eq!(sink.poses[1][CanonicalSlot::Head], SlotOutput::Rest);
        assert_eq!(transformer.stats().slots_held, 0);
    }

    #[test]
    fn test_non_finite_sample_is_treated_as_missing() {
        let good = Quat::from_rotation_x(0.3);
        let mut sink = Capture::default();

        let mut transformer = PoseTransformer::new(table());
        transformer.evaluate(Some(&live(CanonicalSlot::Head, good)), &mut sink);
        for bad in [
            Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
            Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0),
        ] {
            transformer.evaluate(Some(&live(CanonicalSlot::Head, bad)), &mut sink);
            match transformer.last_pose()[CanonicalSlot::Head] {
                SlotOutput::Retargeted { rotation, .. } => {
                    assert!(same_rotation(rotation, good, 1e-5))
                }
                SlotOutput::Rest => panic!("head should be held"),
            }
        }
        assert_eq!(transformer.stats().slots_rejected, 2);
        assert_eq!(transformer.stats().slots_held, 2);

        let mut source = live(CanonicalSlot::Head, good);
        source.set(
            CanonicalSlot::Hips,
            JointSample::new(Quat::IDENTITY, Vec3::new(f32::INFINITY, 0.0, 0.0)),
        );
        let mut transformer = PoseTransformer::new(table()).with_gap_policy(GapPolicy::Rest);
        transformer.evaluate(Some(&source), &mut sink);
        assert_eq!(transformer.last_pose()[CanonicalSlot::Hips], SlotOutput::Rest);
        assert!(!transformer.last_pose()[CanonicalSlot::Head].is_rest());
        assert_eq!(transformer.stats().slots_rejected, 1);
    }

    #[test]
    fn test_calibration_edits_apply_next_frame() {
        let mut transformer = PoseTransformer::new(table());
        let calibration = transformer.calibration_stage();
        let mut sink = Capture::default();
        let q = Quat::from_xyzw(0.1, 0.2, 0.3, 0.927_361_85).normalize();
        let source = live(CanonicalSlot::Hips, q);

        calibration.set_mirror(CanonicalSlot::Hips, MirrorAxes::from_axes(&[MirrorAxis::X]));
        calibration.set_manual_offset(CanonicalSlot::Head, Quat::from_rotation_y(1.0));
        transformer.evaluate(Some(&source), &mut sink);

        match sink.poses[0][CanonicalSlot::Hips] {
            SlotOutput::Retargeted { rotation, .. } => {
                assert!(same_rotation(rotation, MirrorAxis::X.mirror(q), 1e-5))
            }
            SlotOutput::Rest => panic!("hips should be retargeted"),
        }
        assert!(same_rotation(
            transformer.calibration().manual_offsets[CanonicalSlot::Head],
            Quat::from_rotation_y(1.0),
            1e-5
        ));
    }

    #[test]
    fn test_held_stage_lock_defers_edits() {
        let mut transformer = PoseTransformer::new(table());
        let stage = transformer.calibration_stage();
        stage.set_mirror(CanonicalSlot::Hips, MirrorAxes::from_axes(&[MirrorAxis::Y]));

        let guard = stage.pending.lock().unwrap();
        let mut sink = Capture::default();
        transformer.evaluate(Some(&live(CanonicalSlot::Hips, Quat::IDENTITY)), &mut sink);
        assert_eq!(transformer.calibration().mirrors[CanonicalSlot::Hips], MirrorAxes::NONE);
        drop(guard);

        transformer.evaluate(Some(&live(CanonicalSlot::Hips, Quat::IDENTITY)), &mut sink);
        assert!(transformer.calibration().mirrors[CanonicalSlot::Hips].y);
    }
}
