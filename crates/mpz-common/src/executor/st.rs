use serio::{IoSink, IoStream};

use crate::{context::Context, ThreadId};

/// A single-threaded executor.
#[derive(Debug)]
pub struct STExecutor<Io> {
    id: ThreadId,
    io: Io,
}

impl<Io> STExecutor<Io>
where
    Io: IoSink + IoStream + Send + Unpin + 'static,
{
    /// Creates a new single-threaded executor.
    ///
    /// # Arguments
    ///
    /// * `io` - The I/O channel used by the executor.
    #[inline]
    pub fn new(io: Io) -> Self {
        Self {
            id: ThreadId::default(),
            io,
        }
    }

    /// Creates a new single-threaded executor with the provided thread ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The thread ID, must match the peer's.
    /// * `io` - The I/O channel used by the executor.
    #[inline]
    pub fn new_with_id(id: ThreadId, io: Io) -> Self {
        Self { id, io }
    }
}

impl<Io> Context for STExecutor<Io>
where
    Io: IoSink + IoStream + Send + Sync + Unpin + 'static,
{
    type Io = Io;

    fn id(&self) -> &ThreadId {
        &self.id
    }

    fn io_mut(&mut self) -> &mut Self::Io {
        &mut self.io
    }
}
