//! Lock-free hand-off of compiled programs to the audio thread.
//!
//! Programs travel to the audio thread through one SPSC ring buffer and
//! come back through a second one once replaced, so they are always
//! allocated and freed on the control thread.

use bg_expr::CompiledProgram;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

type Boxed = Box<CompiledProgram>;

/// Default number of programs that may wait for the audio thread.
pub const DEFAULT_CAPACITY: usize = 4;

/// Create a connected publisher (control thread) and slot (audio thread).
///
/// The slot starts out holding the empty program.
pub fn program_channel(capacity: usize) -> (ProgramPublisher, ProgramSlot) {
    let capacity = capacity.max(1);
    let (inbound_tx, inbound_rx) = HeapRb::<Boxed>::new(capacity).split();
    // One more than inbound: the publisher drains it before each publish, so
    // at most every queued program plus the one in use can be waiting.
    let (retired_tx, retired_rx) = HeapRb::<Boxed>::new(capacity + 1).split();

    let publisher = ProgramPublisher {
        inbound: inbound_tx,
        retired: retired_rx,
    };
    let slot = ProgramSlot {
        current: Box::new(CompiledProgram::empty()),
        inbound: inbound_rx,
        retired: retired_tx,
    };
    (publisher, slot)
}

/// Control-thread end: sends new programs and frees replaced ones.
pub struct ProgramPublisher {
    inbound: HeapProd<Boxed>,
    retired: HeapCons<Boxed>,
}

impl ProgramPublisher {
    /// Queue `program` for installation.
    ///
    /// Returns the program back if the audio thread has not yet picked up
    /// earlier ones and the queue is full.
    pub fn publish(&mut self, program: CompiledProgram) -> Result<(), CompiledProgram> {
        self.reclaim();
        self.inbound
            .try_push(Box::new(program))
            .map_err(|boxed| *boxed)
    }

    /// Free programs the audio thread has retired. Returns how many.
    pub fn reclaim(&mut self) -> usize {
        let mut freed = 0;
        while let Some(old) = self.retired.try_pop() {
            drop(old);
            freed += 1;
        }
        freed
    }

    /// Programs published but not yet installed.
    pub fn pending(&self) -> usize {
        self.inbound.occupied_len()
    }
}

/// Audio-thread end: holds the program currently in use.
pub struct ProgramSlot {
    current: Boxed,
    inbound: HeapCons<Boxed>,
    retired: HeapProd<Boxed>,
}

impl ProgramSlot {
    /// Install the newest published program, if any.
    ///
    /// Never allocates or frees: replaced programs go back to the publisher.
    /// Returns true if the program changed.
    pub fn refresh(&mut self) -> bool {
        let mut changed = false;
        while let Some(next) = self.inbound.try_pop() {
            let old = core::mem::replace(&mut self.current, next);
            if let Err(old) = self.retired.try_push(old) {
                // Unreachable while the return queue outsizes the inbound one.
                debug_assert!(false, "program return queue overflow");
                drop(old);
            }
            changed = true;
        }
        changed
    }

    /// The program currently installed.
    pub fn program(&self) -> &CompiledProgram {
        &self.current
    }
}
