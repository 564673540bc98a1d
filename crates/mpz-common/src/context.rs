use serio::{IoSink, IoStream};

use crate::ThreadId;

/// A thread context.
///
/// Protocols exchange their messages over the context's I/O channel, which provides
/// reliable and ordered delivery between the two parties of the thread.
pub trait Context: Send + Sync {
    /// I/O channel used by the thread.
    type Io: IoSink + IoStream + Send + Unpin + 'static;

    /// Returns the thread ID.
    fn id(&self) -> &ThreadId;

    /// Returns a mutable reference to the thread's I/O channel.
    fn io_mut(&mut self) -> &mut Self::Io;
}
