//! The padding channel: a capacity-1 rendezvous slot for border snapshots.
//!
//! Each channel links exactly one writing patch to exactly one reading
//! patch over a fixed sub-rectangle of the grid.  A `bounded(1)` crossbeam
//! channel is precisely the required slot: the writer blocks while an
//! unread snapshot is pending, the reader blocks while the slot is empty,
//! and a disconnected peer unblocks the other side with an error that the
//! worker surfaces as fatal.
//!
//! Snapshots carry owned person clones.  Persons hold no reference to the
//! patch that produced them, so handing a snapshot over is a plain transfer
//! of ownership; the protocol guarantees the slot is empty whenever a
//! writer arrives, making writes effectively non-blocking (see the
//! deadlock-freedom notes in the `patch` module).

use cordon_agent::Person;
use cordon_core::Rectangle;
use crossbeam_channel::{bounded, Receiver, Sender};

/// An ordered-by-id list of person clones covering a channel's area.
pub(crate) type Snapshot = Vec<Person>;

/// The peer worker disappeared; the run cannot continue.
pub(crate) struct ChannelClosed;

/// Create the two endpoints of a padding channel over `area`.
pub(crate) fn padding_channel(area: Rectangle) -> (PaddingWriter, PaddingReader) {
    let (tx, rx) = bounded(1);
    (PaddingWriter { area, tx }, PaddingReader { area, rx })
}

/// The writing end, held by the patch that owns the cells of `area`.
pub(crate) struct PaddingWriter {
    /// The sub-rectangle of the writer's patch this channel covers.
    pub area: Rectangle,
    tx: Sender<Snapshot>,
}

impl PaddingWriter {
    /// Deposit a snapshot, waiting for the slot to be free.
    pub fn write(&self, snapshot: Snapshot) -> Result<(), ChannelClosed> {
        self.tx.send(snapshot).map_err(|_| ChannelClosed)
    }
}

/// The reading end, held by the patch whose padded area covers `area`.
pub(crate) struct PaddingReader {
    pub area: Rectangle,
    rx: Receiver<Snapshot>,
}

impl PaddingReader {
    /// Take the pending snapshot, waiting for one to arrive.
    pub fn read(&self) -> Result<Snapshot, ChannelClosed> {
        self.rx.recv().map_err(|_| ChannelClosed)
    }
}
