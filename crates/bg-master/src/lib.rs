//! Headless controller for bytegraph.
//!
//! Owns the patch, compiles expressions as they are edited and hands the
//! results to the render sequence. Shared by the CLI and tests.

use bg_engine::{ExpressionHandle, NodeId, RenderSequence};
use bg_expr::{compile, CompileError, CompiledProgram};

// Re-export common types so callers don't need bg-engine/bg-formats directly.
pub use bg_engine::{Frame, GraphError, Patch, TransportSnapshot};
pub use bg_formats::{frames_to_wav, write_wav, FormatError, MAX_WAV_FRAMES};

/// Errors from replacing the controller's patch or exporting audio.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("cannot render {0} seconds")]
    InvalidDuration(f64),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Per-expression-node compile state.
struct NodeProgram {
    handle: ExpressionHandle,
    valid: bool,
    error: Option<CompileError>,
    /// Newest program that did not fit in the hand-off queue.
    waiting: Option<CompiledProgram>,
}

impl NodeProgram {
    fn publish(&mut self, program: CompiledProgram) {
        if let Err(program) = self.handle.publisher.publish(program) {
            self.waiting = Some(program);
        }
    }

    fn flush(&mut self) {
        if let Some(program) = self.waiting.take() {
            self.publish(program);
        }
    }
}

/// Headless bytegraph controller.
pub struct Controller {
    patch: Patch,
    sample_rate: u32,
    sequence: Option<RenderSequence>,
    programs: Vec<NodeProgram>,
}

impl Controller {
    /// Controller with an empty patch.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            patch: Patch::new(),
            sample_rate,
            sequence: Some(RenderSequence::new(sample_rate as f64)),
            programs: Vec::new(),
        }
    }

    /// Controller playing a single expression through a mono output.
    ///
    /// An expression that fails to compile still produces a controller;
    /// check [`is_valid`](Self::is_valid).
    pub fn from_expression(text: &str, sample_rate: u32) -> Result<Self, ControllerError> {
        let mut controller = Self::new(sample_rate);
        controller.set_patch(Patch::single_expression(text))?;
        Ok(controller)
    }

    // --- Patch management ---

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Replace the patch with one parsed from TOML.
    pub fn load_patch(&mut self, text: &str) -> Result<(), ControllerError> {
        let patch = bg_formats::load_patch(text)?;
        self.set_patch(patch)
    }

    /// Replace the patch, rebuild the render sequence and compile every
    /// expression. Any previously taken sequence stops receiving updates.
    pub fn set_patch(&mut self, patch: Patch) -> Result<(), ControllerError> {
        let (sequence, handles) = RenderSequence::build(&patch, self.sample_rate as f64)?;
        self.programs = handles
            .into_iter()
            .map(|handle| NodeProgram {
                handle,
                valid: true,
                error: None,
                waiting: None,
            })
            .collect();
        self.sequence = Some(sequence);
        self.patch = patch;

        let expressions: Vec<(NodeId, String)> = self
            .patch
            .expressions()
            .map(|(id, text)| (id, text.to_owned()))
            .collect();
        for (id, text) in expressions {
            self.compile_node(id, &text);
        }
        Ok(())
    }

    pub fn save_patch(&self) -> Result<String, FormatError> {
        bg_formats::save_patch(&self.patch)
    }

    // --- Expression editing ---

    /// Set the text of expression node `node` and compile it.
    ///
    /// On success the new program is published to the render sequence. On
    /// failure the previous program keeps running. Returns whether `text`
    /// compiled; false also for nodes that are not expressions.
    pub fn set_expression(&mut self, node: NodeId, text: &str) -> bool {
        if !self.patch.set_expression(node, text) {
            log::warn!("node {} is not an expression node", node);
            return false;
        }
        self.compile_node(node, text)
    }

    fn compile_node(&mut self, node: NodeId, text: &str) -> bool {
        let Some(entry) = self.programs.iter_mut().find(|p| p.handle.node == node) else {
            return false;
        };
        match compile(text) {
            Ok(program) => {
                log::debug!("node {}: compiled '{}' -> [{}]", node, text, program);
                entry.valid = true;
                entry.error = None;
                entry.waiting = None;
                entry.publish(program);
            }
            Err(e) => {
                log::warn!("node {}: '{}' rejected: {}", node, text, e);
                entry.valid = false;
                entry.error = Some(e);
            }
        }
        entry.valid
    }

    /// Whether the last text given to `node` compiled.
    pub fn is_valid(&self, node: NodeId) -> bool {
        self.node_program(node).is_some_and(|p| p.valid)
    }

    /// Why the last text given to `node` failed to compile.
    pub fn compile_error(&self, node: NodeId) -> Option<&CompileError> {
        self.node_program(node)?.error.as_ref()
    }

    fn node_program(&self, node: NodeId) -> Option<&NodeProgram> {
        self.programs.iter().find(|p| p.handle.node == node)
    }

    /// Retry programs that found the hand-off queue full.
    ///
    /// While the controller still owns the render sequence, queued programs
    /// are installed first to make room.
    pub fn flush(&mut self) {
        if let Some(sequence) = &mut self.sequence {
            sequence.refresh_programs();
        }
        for entry in &mut self.programs {
            entry.flush();
        }
    }

    // --- Transport ---

    pub fn start_note(&mut self, frequency: f64) {
        if let Some(sequence) = &mut self.sequence {
            sequence.start_note(frequency);
        }
    }

    pub fn sync(&mut self, snapshot: &TransportSnapshot) {
        if let Some(sequence) = &mut self.sequence {
            sequence.sync(snapshot);
        }
    }

    /// Move the render sequence out, e.g. onto a real-time thread.
    ///
    /// Expression edits keep reaching it. Offline rendering and transport
    /// control through the controller stop until the patch is replaced.
    pub fn take_sequence(&mut self) -> Option<RenderSequence> {
        self.flush();
        self.sequence.take()
    }

    // --- Offline rendering ---

    /// Render `count` frames with the controller's own sequence.
    pub fn render_frames(&mut self, count: usize) -> Vec<Frame> {
        self.flush();
        match &mut self.sequence {
            Some(sequence) => sequence.render_frames(count),
            None => {
                log::warn!("render sequence has been taken; nothing to render");
                Vec::new()
            }
        }
    }

    /// Render `seconds` of audio as a WAV file.
    ///
    /// Negative, non-finite and too-long durations are rejected before
    /// anything is rendered.
    pub fn render_to_wav(&mut self, seconds: f64) -> Result<Vec<u8>, ControllerError> {
        let count = self.sample_rate as f64 * seconds;
        if !(0.0..=MAX_WAV_FRAMES as f64).contains(&count) {
            return Err(ControllerError::InvalidDuration(seconds));
        }
        let frames = self.render_frames(count as usize);
        Ok(frames_to_wav(&frames, self.sample_rate)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_expression_renders() {
        let mut controller = Controller::from_expression("128", 8000).unwrap();
        assert!(controller.is_valid(0));
        let frames = controller.render_frames(4);
        assert_eq!(frames, vec![Frame::silence(); 4]);
    }

    #[test]
    fn invalid_expression_is_reported() {
        let controller = Controller::from_expression("1 +", 8000).unwrap();
        assert!(!controller.is_valid(0));
        assert!(controller.compile_error(0).is_some());
    }

    #[test]
    fn failed_edit_keeps_previous_program() {
        let mut controller = Controller::from_expression("192", 8000).unwrap();
        assert!(!controller.set_expression(0, "t +"));
        assert!(!controller.is_valid(0));
        assert_eq!(controller.render_frames(1)[0], Frame::mono(16383));

        assert!(controller.set_expression(0, "128"));
        assert!(controller.is_valid(0));
        assert_eq!(controller.render_frames(1)[0], Frame::silence());
    }

    #[test]
    fn set_expression_rejects_output_nodes() {
        let mut controller = Controller::from_expression("t", 8000).unwrap();
        assert!(!controller.set_expression(1, "t"));
        assert!(!controller.set_expression(42, "t"));
        assert!(!controller.is_valid(1));
    }

    #[test]
    fn many_edits_without_rendering_keep_newest() {
        let mut controller = Controller::from_expression("0", 8000).unwrap();
        for i in 0..20 {
            assert!(controller.set_expression(0, &format!("{}", i)));
        }
        assert!(controller.set_expression(0, "128"));
        assert_eq!(controller.render_frames(1)[0], Frame::silence());
    }

    #[test]
    fn render_to_wav_length() {
        let mut controller = Controller::from_expression("t", 8000).unwrap();
        let wav = controller.render_to_wav(0.5).unwrap();
        assert_eq!(wav.len(), 44 + 4000 * 4);
    }

    #[test]
    fn render_to_wav_rejects_bad_durations() {
        let mut controller = Controller::from_expression("t", 8000).unwrap();
        for seconds in [f64::INFINITY, f64::NAN, -1.0, 1e12] {
            assert!(
                matches!(
                    controller.render_to_wav(seconds),
                    Err(ControllerError::InvalidDuration(_))
                ),
                "{} seconds",
                seconds
            );
        }
        assert_eq!(controller.render_to_wav(0.0).unwrap().len(), 44);
    }

    #[test]
    fn taken_sequence_still_receives_edits() {
        let mut controller = Controller::from_expression("64", 8000).unwrap();
        let mut sequence = controller.take_sequence().unwrap();
        sequence.render_frame();
        assert_eq!(sequence.node_value(0), Some(64.0));

        controller.set_expression(0, "32");
        sequence.render_frame();
        assert_eq!(sequence.node_value(0), Some(32.0));
        assert!(controller.render_frames(10).is_empty());
    }

    #[test]
    fn patch_round_trips_through_controller() {
        let mut controller = Controller::from_expression("t>>4", 8000).unwrap();
        let text = controller.save_patch().unwrap();
        let mut other = Controller::new(8000);
        other.load_patch(&text).unwrap();
        assert_eq!(other.patch(), controller.patch());
        assert!(other.is_valid(0));
    }

    #[test]
    fn cyclic_patch_is_rejected() {
        let mut patch = Patch::new();
        let a = patch.add_expression("a");
        patch.connect(a, a, 0);
        let mut controller = Controller::new(8000);
        assert!(matches!(
            controller.set_patch(patch),
            Err(ControllerError::Graph(GraphError::Cycle))
        ));
    }
}
