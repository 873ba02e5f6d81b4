//! Call frames and the stack-trace list.
//!
//! A full frame opens a new lexical scope: lookups never cross it outward.
//! A sub-frame inherits visibility of its parent's bindings and shadows
//! them on re-declaration; blocks, default-argument evaluation, and catch
//! handlers use sub-frames.
//!
//! The stack carries a parallel list of formatted trace lines, pushed at
//! function entry and popped on every exit path. Its length is capped;
//! the interpreter raises a stack-overflow exception at the cap.

use rustc_hash::FxHashMap;

use mica_ir::VarId;

use crate::value::Value;

/// Whether a frame opens a new lexical scope or extends the current one.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FrameKind {
    Full,
    Sub,
}

/// One scope of variable bindings.
///
/// A `None` slot is a declared-but-uninitialized variable.
#[derive(Debug)]
pub struct Frame {
    vars: FxHashMap<VarId, Option<Value>>,
    kind: FrameKind,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Frame {
            vars: FxHashMap::default(),
            kind,
        }
    }
}

/// Outcome of a variable read.
#[derive(Debug)]
pub enum Lookup {
    Found(Value),
    Uninitialized,
    Missing,
}

/// The frame stack plus the parallel stack-trace list.
pub struct FrameStack {
    frames: Vec<Frame>,
    trace: Vec<String>,
    max_trace: usize,
}

impl FrameStack {
    pub fn new(max_trace: usize) -> Self {
        FrameStack {
            frames: Vec::new(),
            trace: Vec::new(),
            max_trace,
        }
    }

    /// Drop all frames and trace lines.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.trace.clear();
    }

    pub fn push_full(&mut self) {
        self.frames.push(Frame::new(FrameKind::Full));
    }

    pub fn push_sub(&mut self) {
        self.frames.push(Frame::new(FrameKind::Sub));
    }

    pub fn pop(&mut self) {
        debug_assert!(!self.frames.is_empty(), "pop on empty frame stack");
        self.frames.pop();
    }

    /// Declare a binding in the current frame, shadowing any outer binding.
    pub fn declare(&mut self, var: VarId, value: Option<Value>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.vars.insert(var, value);
        }
    }

    /// Read a binding, walking from the innermost frame outward. The walk
    /// stops after the first full frame: callers' locals are not visible
    /// inside a callee.
    pub fn lookup(&self, var: VarId) -> Lookup {
        for frame in self.frames.iter().rev() {
            if let Some(slot) = frame.vars.get(&var) {
                return match slot {
                    Some(value) => Lookup::Found(value.clone()),
                    None => Lookup::Uninitialized,
                };
            }
            if frame.kind == FrameKind::Full {
                break;
            }
        }
        Lookup::Missing
    }

    /// Assign to an existing visible binding, mutating it in the frame
    /// where it was found. Returns `false` when no binding is visible.
    pub fn assign(&mut self, var: VarId, value: Value) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.vars.get_mut(&var) {
                *slot = Some(value);
                return true;
            }
            if frame.kind == FrameKind::Full {
                break;
            }
        }
        false
    }

    /// All bindings visible from the current frame, innermost shadowing
    /// outermost. Used to snapshot lambda captures.
    pub fn capture_visible(&self) -> FxHashMap<VarId, Value> {
        let mut captures = FxHashMap::default();
        for frame in self.frames.iter().rev() {
            for (var, slot) in &frame.vars {
                if let Some(value) = slot {
                    captures.entry(*var).or_insert_with(|| value.clone());
                }
            }
            if frame.kind == FrameKind::Full {
                break;
            }
        }
        captures
    }

    // ── Stack trace ─────────────────────────────────────────────────────

    /// Push a formatted trace line. Returns `false` at the cap, in which
    /// case the line is not pushed and the caller raises stack overflow.
    #[must_use]
    pub fn push_trace(&mut self, line: String) -> bool {
        if self.trace.len() >= self.max_trace {
            return false;
        }
        self.trace.push(line);
        true
    }

    pub fn pop_trace(&mut self) {
        debug_assert!(!self.trace.is_empty(), "pop on empty trace list");
        self.trace.pop();
    }

    /// The live trace lines, entry order (outermost first).
    pub fn trace(&self) -> &[String] {
        &self.trace
    }
}
