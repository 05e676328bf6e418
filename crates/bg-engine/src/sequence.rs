//! Render sequence: processors in topological order, one frame at a time.

use bg_expr::{Evaluator, RuntimeInputs, INPUT_CHANNELS};

use crate::clock::{TransportClock, TransportSnapshot};
use crate::frame::Frame;
use crate::graph_state::{topological_sort, validate_connections, GraphError, MAX_FAN_IN};
use crate::handoff::{program_channel, ProgramPublisher, ProgramSlot, DEFAULT_CAPACITY};
use crate::patch::{NodeId, NodeKind, Patch};

const RAND_SEED: u64 = 0x5eed;

type Sources = heapless::Vec<usize, MAX_FAN_IN>;

/// Control-thread handle for one expression node's program slot.
pub struct ExpressionHandle {
    pub node: NodeId,
    pub publisher: ProgramPublisher,
}

struct ExpressionStage {
    index: usize,
    slot: ProgramSlot,
    evaluator: Evaluator,
    sources: [Sources; INPUT_CHANNELS],
}

struct OutputStage {
    stereo: bool,
    sources: [Sources; 2],
}

enum Stage {
    Expression(ExpressionStage),
    Output(OutputStage),
}

/// Executes a patch sample by sample.
///
/// Built once per patch on the control thread; afterwards only program
/// updates arrive, through the [`ExpressionHandle`]s returned by
/// [`RenderSequence::build`].
pub struct RenderSequence {
    stages: Vec<Stage>,
    /// Latest output of every node, indexed by node ID.
    values: Vec<f64>,
    clock: TransportClock,
}

impl RenderSequence {
    /// A sequence with no nodes, rendering silence.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            stages: Vec::new(),
            values: Vec::new(),
            clock: TransportClock::new(sample_rate),
        }
    }

    /// Validate `patch` and lay out its nodes in evaluation order.
    ///
    /// Every expression node starts with the empty program; compiled
    /// programs are published through the returned handles.
    pub fn build(
        patch: &Patch,
        sample_rate: f64,
    ) -> Result<(Self, Vec<ExpressionHandle>), GraphError> {
        validate_connections(patch)?;
        let order = topological_sort(patch)?;

        let mut stages = Vec::with_capacity(order.len());
        let mut handles = Vec::new();

        for id in order {
            let Some(node) = patch.node(id) else {
                return Err(GraphError::UnknownNode(id));
            };
            match node.kind {
                NodeKind::Expression { .. } => {
                    let (publisher, slot) = program_channel(DEFAULT_CAPACITY);
                    handles.push(ExpressionHandle { node: id, publisher });
                    stages.push(Stage::Expression(ExpressionStage {
                        index: id as usize,
                        slot,
                        evaluator: Evaluator::with_seed(RAND_SEED.wrapping_add(id as u64)),
                        sources: gather_sources::<INPUT_CHANNELS>(patch, id)?,
                    }));
                }
                NodeKind::Output { stereo } => {
                    stages.push(Stage::Output(OutputStage {
                        stereo,
                        sources: gather_sources::<2>(patch, id)?,
                    }));
                }
            }
        }

        handles.sort_by_key(|h| h.node);
        log::debug!(
            "render sequence: {} nodes, {} expressions",
            stages.len(),
            handles.len()
        );

        let sequence = Self {
            stages,
            values: vec![0.0; patch.nodes.len()],
            clock: TransportClock::new(sample_rate),
        };
        Ok((sequence, handles))
    }

    /// Render one stereo frame and advance the clock by one sample.
    pub fn render_frame(&mut self) -> Frame {
        let globals = *self.clock.globals();
        let mut left = 0.0;
        let mut right = 0.0;

        for stage in &mut self.stages {
            match stage {
                Stage::Expression(expr) => {
                    expr.slot.refresh();
                    let mut channels = [0.0; INPUT_CHANNELS];
                    for (value, sources) in channels.iter_mut().zip(&expr.sources) {
                        *value = sum_sources(&self.values, sources);
                    }
                    let inputs = RuntimeInputs::new(channels, globals);
                    self.values[expr.index] = expr.evaluator.evaluate(expr.slot.program(), &inputs);
                }
                Stage::Output(out) => {
                    let [first, second] = &out.sources;
                    if out.stereo {
                        if !first.is_empty() {
                            left += byte_to_unit(sum_sources(&self.values, first));
                        }
                        if !second.is_empty() {
                            right += byte_to_unit(sum_sources(&self.values, second));
                        }
                    } else if !first.is_empty() {
                        let value = byte_to_unit(sum_sources(&self.values, first));
                        left += value;
                        right += value;
                    }
                }
            }
        }

        self.clock.advance();
        Frame::from_unit(left, right)
    }

    /// Install newly published programs without rendering.
    pub fn refresh_programs(&mut self) {
        for stage in &mut self.stages {
            if let Stage::Expression(expr) = stage {
                expr.slot.refresh();
            }
        }
    }

    /// Fill `out` with consecutive frames.
    pub fn render_block(&mut self, out: &mut [Frame]) {
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.fill(out));
        #[cfg(not(feature = "alloc_check"))]
        self.fill(out);
    }

    fn fill(&mut self, out: &mut [Frame]) {
        for frame in out {
            *frame = self.render_frame();
        }
    }

    /// Render `count` frames into a new buffer. Allocates; offline use only.
    pub fn render_frames(&mut self, count: usize) -> Vec<Frame> {
        let mut frames = vec![Frame::silence(); count];
        self.render_block(&mut frames);
        frames
    }

    /// Latest output of node `id`.
    pub fn node_value(&self, id: NodeId) -> Option<f64> {
        self.values.get(id as usize).copied()
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.clock.prepare(sample_rate);
    }

    pub fn start_note(&mut self, frequency: f64) {
        self.clock.start_note(frequency);
    }

    pub fn sync(&mut self, snapshot: &TransportSnapshot) {
        self.clock.sync(snapshot);
    }

    pub fn clock(&self) -> &TransportClock {
        &self.clock
    }
}

fn gather_sources<const N: usize>(patch: &Patch, id: NodeId) -> Result<[Sources; N], GraphError> {
    let mut sources: [Sources; N] = core::array::from_fn(|_| Sources::new());
    for conn in patch.connections.iter().filter(|c| c.to == id) {
        let channel = conn.to_channel as usize;
        let Some(list) = sources.get_mut(channel) else {
            return Err(GraphError::InvalidChannel {
                node: id,
                channel: conn.to_channel,
            });
        };
        list.push(conn.from as usize)
            .map_err(|_| GraphError::FanInExceeded {
                node: id,
                channel: conn.to_channel,
            })?;
    }
    Ok(sources)
}

#[inline]
fn sum_sources(values: &[f64], sources: &[usize]) -> f64 {
    sources.iter().map(|&i| values[i]).sum()
}

/// Classic 8-bit bytebeat output: wrap to an unsigned byte, map to [-1, 1).
#[inline]
pub fn byte_to_unit(value: f64) -> f64 {
    ((value as i64) as u8) as f64 / 128.0 - 1.0
}
