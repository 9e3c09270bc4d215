//! End-to-end retargeting session for one source/destination pair.

use log::debug;

use crate::config::RetargetConfig;
use crate::correspondence::{ResolveOptions, SkeletonCorrespondence};
use crate::error::RetargetResult;
use crate::rest_pose::{apply_rest_correction, ReferenceRoot, RestPose};
use crate::retarget::{build_components, BoundSkeleton, RetargetTable};
use crate::sink::{PoseSink, SkeletonPoseSink};
use crate::skeleton::{Skeleton, SkeletonDefinition};
use crate::source::{BoneFrame, StreamPose};
use crate::transformer::{CalibrationStage, FrameStats, FrameStatus, PoseTransformer, TableStage};

/// A skeleton resolved against its naming table.
#[derive(Debug, Clone)]
struct BoundRig {
    skeleton: Skeleton,
    correspondence: SkeletonCorrespondence,
    root: ReferenceRoot,
}

impl BoundRig {
    fn bound(&self) -> BoundSkeleton<'_> {
        BoundSkeleton::new(&self.skeleton, &self.correspondence).with_root(self.root)
    }
}

/// Owns setup results and the runtime for one skeleton pair.
///
/// Setup either succeeds completely or returns the first configuration
/// error; a session never exists for a pairing that failed setup.
#[derive(Debug)]
pub struct RetargetSession {
    config: RetargetConfig,
    source: BoundRig,
    destination: BoundRig,
    stream: StreamPose,
    transformer: PoseTransformer,
}

impl RetargetSession {
    /// Validates both skeletons, resolves their correspondences and builds
    /// the retargeting table.
    pub fn setup(
        config: RetargetConfig,
        source: &SkeletonDefinition,
        destination: &SkeletonDefinition,
    ) -> RetargetResult<Self> {
        config.validate()?;

        let source = Self::bind_source(&config, source)?;
        let destination = Self::bind_destination(&config, destination)?;
        let table = build_components(&source.bound(), &destination.bound())?;

        let transformer = PoseTransformer::new(table)
            .with_apply_position(config.apply_position)
            .with_gap_policy(config.gap_policy)
            .with_calibration(config.calibration());
        let stream = StreamPose::new(&source.skeleton, &source.correspondence);

        debug!(
            "session '{}' -> '{}' ready",
            source.skeleton.name(),
            destination.skeleton.name()
        );

        Ok(Self {
            config,
            source,
            destination,
            stream,
            transformer,
        })
    }

    fn options(config: &RetargetConfig) -> ResolveOptions {
        ResolveOptions {
            strict: config.strict,
        }
    }

    fn bind_source(config: &RetargetConfig, definition: &SkeletonDefinition) -> RetargetResult<BoundRig> {
        let mut skeleton = Skeleton::from_definition(definition)?;
        let correspondence =
            SkeletonCorrespondence::resolve(&skeleton, &config.source_names(), Self::options(config))?;
        if config.thumb_rest_correction {
            apply_rest_correction(&mut skeleton, &correspondence, config.source.convention);
        }
        let root = ReferenceRoot::resolve(&skeleton, config.source.reference_root.as_deref())?;
        Ok(BoundRig {
            skeleton,
            correspondence,
            root,
        })
    }

    fn bind_destination(
        config: &RetargetConfig,
        definition: &SkeletonDefinition,
    ) -> RetargetResult<BoundRig> {
        let skeleton = Skeleton::from_definition(definition)?;
        let correspondence = SkeletonCorrespondence::resolve(
            &skeleton,
            &config.destination_names(),
            Self::options(config),
        )?;
        let root = ReferenceRoot::resolve(&skeleton, config.destination.reference_root.as_deref())?;
        Ok(BoundRig {
            skeleton,
            correspondence,
            root,
        })
    }

    /// Merges a streamed frame into the source snapshot.
    pub fn ingest(&mut self, frame: &BoneFrame) -> usize {
        self.stream.ingest(frame)
    }

    /// Evaluates one frame.
    ///
    /// When nothing was ingested since the previous call the frame is a
    /// stream gap and the configured gap policy applies.
    pub fn evaluate<K: PoseSink + ?Sized>(&mut self, sink: &mut K) -> FrameStatus {
        let source = self.stream.take_fresh().then_some(&self.stream);
        self.transformer.evaluate(source, sink)
    }

    /// Rebuilds the table against a new destination description.
    ///
    /// The destination and its table are swapped together, so the next
    /// [`Self::evaluate`] uses both. Slots without a fresh sample then fall
    /// back to the new destination's rest. On error the running pairing is
    /// left untouched. A sink built from the previous destination should be
    /// replaced with [`Self::destination_sink`].
    pub fn recalibrate_destination(&mut self, definition: &SkeletonDefinition) -> RetargetResult<()> {
        let destination = Self::bind_destination(&self.config, definition)?;
        let table = build_components(&self.source.bound(), &destination.bound())?;
        self.destination = destination;
        self.transformer.replace_table(table);
        Ok(())
    }

    /// A sink over the destination skeleton's live transforms.
    pub fn destination_sink(&self) -> SkeletonPoseSink {
        SkeletonPoseSink::new(&self.destination.skeleton, &self.destination.correspondence)
    }

    /// Destination rest pose.
    pub fn destination_rest(&self) -> RestPose {
        RestPose::from_skeleton(&self.destination.skeleton, &self.destination.correspondence)
    }

    /// Handle for per-slot mirror and manual offset edits.
    pub fn calibration(&self) -> CalibrationStage {
        self.transformer.calibration_stage()
    }

    /// Handle for staging externally built tables.
    pub fn table_stage(&self) -> TableStage {
        self.transformer.table_stage()
    }

    pub fn table(&self) -> &RetargetTable {
        self.transformer.table()
    }

    pub fn stats(&self) -> FrameStats {
        self.transformer.stats()
    }

    pub fn config(&self) -> &RetargetConfig {
        &self.config
    }

    pub fn source_skeleton(&self) -> &Skeleton {
        &self.source.skeleton
    }

    pub fn source_correspondence(&self) -> &SkeletonCorrespondence {
        &self.source.correspondence
    }

    pub fn destination_skeleton(&self) -> &Skeleton {
        &self.destination.skeleton
    }

    pub fn destination_correspondence(&self) -> &SkeletonCorrespondence {
        &self.destination.correspondence
    }
}
