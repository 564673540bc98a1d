//! Ideal functionality utilities.
//!
//! An ideal two-party functionality is a trusted party which receives the inputs of
//! both parties of a thread, evaluates a function over them and returns each party
//! its output. Calls are paired by [`ThreadId`](crate::ThreadId): whichever party
//! arrives first parks its input until the peer shows up.

use futures::channel::oneshot;
use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Context, ThreadId};

type BoxAny = Box<dyn Any + Send + 'static>;
type Pending = HashMap<ThreadId, (BoxAny, oneshot::Sender<BoxAny>)>;

#[derive(Debug, Default)]
struct Buffer {
    alice: Pending,
    bob: Pending,
}

#[derive(Debug)]
struct Shared<F> {
    f: Arc<Mutex<F>>,
    buffer: Arc<Mutex<Buffer>>,
}

impl<F> Clone for Shared<F> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            buffer: self.buffer.clone(),
        }
    }
}

impl<F> Shared<F> {
    fn lock(&self) -> MutexGuard<'_, F> {
        self.f.lock().expect("ideal functionality is not poisoned")
    }

    /// Parks `input` under `id` in `own`, or evaluates `eval` with the peer's input
    /// found in `peer`.
    async fn call<I, P, O, Q, E>(
        &self,
        id: &ThreadId,
        input: I,
        select: fn(&mut Buffer) -> (&mut Pending, &mut Pending),
        eval: E,
    ) -> O
    where
        I: Send + 'static,
        P: Send + 'static,
        O: Send + 'static,
        Q: Send + 'static,
        E: FnOnce(&mut F, I, P) -> (O, Q),
    {
        let receiver = {
            let mut buffer = self.buffer.lock().expect("buffer is not poisoned");
            let (own, peer) = select(&mut *buffer);

            if let Some((peer_input, ret_peer)) = peer.remove(id) {
                let peer_input = *peer_input
                    .downcast::<P>()
                    .expect("peer provided input of the expected type");

                let (output, peer_output) = eval(&mut self.lock(), input, peer_input);
                _ = ret_peer.send(Box::new(peer_output));

                return output;
            }

            let (sender, receiver) = oneshot::channel();
            own.insert(id.clone(), (Box::new(input), sender));
            receiver
        };

        let output = receiver.await.expect("peer did not drop the channel");
        *output
            .downcast::<O>()
            .expect("peer returned output of the expected type")
    }
}

fn alice_first(buffer: &mut Buffer) -> (&mut Pending, &mut Pending) {
    (&mut buffer.alice, &mut buffer.bob)
}

fn bob_first(buffer: &mut Buffer) -> (&mut Pending, &mut Pending) {
    (&mut buffer.bob, &mut buffer.alice)
}

/// The ideal functionality from the perspective of Alice.
#[derive(Debug)]
pub struct Alice<F>(Shared<F>);

impl<F> Clone for Alice<F> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<F> Alice<F> {
    /// Returns a lock to the ideal functionality.
    pub fn lock(&self) -> MutexGuard<'_, F> {
        self.0.lock()
    }

    /// Calls the ideal functionality.
    ///
    /// `call` receives Alice's input first and returns Alice's output first.
    pub async fn call<Ctx, C, IA, IB, OA, OB>(&mut self, ctx: &mut Ctx, input: IA, call: C) -> OA
    where
        Ctx: Context,
        C: FnOnce(&mut F, IA, IB) -> (OA, OB),
        IA: Send + 'static,
        IB: Send + 'static,
        OA: Send + 'static,
        OB: Send + 'static,
    {
        self.0.call(ctx.id(), input, alice_first, call).await
    }
}

/// The ideal functionality from the perspective of Bob.
#[derive(Debug)]
pub struct Bob<F>(Shared<F>);

impl<F> Clone for Bob<F> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<F> Bob<F> {
    /// Returns a lock to the ideal functionality.
    pub fn lock(&self) -> MutexGuard<'_, F> {
        self.0.lock()
    }

    /// Calls the ideal functionality.
    ///
    /// `call` receives Alice's input first and returns Alice's output first.
    pub async fn call<Ctx, C, IA, IB, OA, OB>(&mut self, ctx: &mut Ctx, input: IB, call: C) -> OB
    where
        Ctx: Context,
        C: FnOnce(&mut F, IA, IB) -> (OA, OB),
        IA: Send + 'static,
        IB: Send + 'static,
        OA: Send + 'static,
        OB: Send + 'static,
    {
        self.0
            .call(ctx.id(), input, bob_first, |f, input_b, input_a| {
                let (output_a, output_b) = call(f, input_a, input_b);
                (output_b, output_a)
            })
            .await
    }
}

/// Creates an ideal functionality, returning the perspectives of Alice and Bob.
pub fn ideal_f2p<F>(f: F) -> (Alice<F>, Bob<F>) {
    let shared = Shared {
        f: Arc::new(Mutex::new(f)),
        buffer: Arc::new(Mutex::new(Buffer::default())),
    };

    (Alice(shared.clone()), Bob(shared))
}
